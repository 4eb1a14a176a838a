#![allow(dead_code)]

use cuesubmit::{
    config::PathRule,
    models::layer::{LayerKind, LayerSpec, Renderer},
    FarmConfig, FrameRange, JobRequest,
};
use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

type Handler = dyn Fn(&Recorded) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 farm gateway on a loopback port, one thread per connection.
pub struct StubFarm {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubFarm {
    pub fn start(handler: impl Fn(&Recorded) -> (u16, String) + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let log = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let handler = handler.clone();
                let log = log.clone();
                thread::spawn(move || serve(stream, handler.as_ref(), &log));
            }
        });

        Self { addr, requests }
    }

    pub fn endpoint(&self) -> String {
        self.addr.to_string()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(stream: TcpStream, handler: &Handler, log: &Mutex<Vec<Recorded>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let Some(request) = read_request(&mut reader) else {
        return;
    };
    log.lock().unwrap().push(request.clone());

    let (status, body) = handler(&request);
    let reason = match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = stream;
    // the client may have given up already
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn read_request(reader: &mut impl BufRead) -> Option<Recorded> {
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_owned();
    let path = parts.next()?.to_owned();

    let mut content_length = 0usize;
    let mut chunked = false;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        let (name, value) = header.split_once(':')?;
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().ok()?;
        } else if name.eq_ignore_ascii_case("transfer-encoding") {
            chunked = value.eq_ignore_ascii_case("chunked");
        }
    }

    let body = if chunked {
        read_chunked(reader)?
    } else {
        let mut buf = vec![0; content_length];
        reader.read_exact(&mut buf).ok()?;
        buf
    };

    Some(Recorded {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn read_chunked(reader: &mut impl BufRead) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let mut size = String::new();
        reader.read_line(&mut size).ok()?;
        let size = usize::from_str_radix(size.trim().split(';').next()?, 16).ok()?;
        let mut chunk = vec![0; size + 2];
        reader.read_exact(&mut chunk).ok()?;
        if size == 0 {
            return Some(body);
        }
        body.extend_from_slice(&chunk[..size]);
    }
}

pub fn config(endpoint: &str) -> FarmConfig {
    FarmConfig {
        endpoint: endpoint.to_owned(),
        timeout_secs: 5,
        path_rule: PathRule {
            local_prefix: "S:".into(),
            remote_prefix: "//server/share".into(),
        },
        log_root: "/logs".into(),
        ..FarmConfig::default()
    }
}

pub fn request() -> JobRequest {
    JobRequest::new("maya-shotA-v001", "demo", "shot01", "artist").with_layer(
        LayerSpec::new(
            LayerKind::maya(Renderer::Arnold, ""),
            FrameRange::new(1001, 1010),
            "S:/show/scene.ma",
        )
        .chunk(5)
        .service("arnold"),
    )
}

pub const LAUNCHED: &str = r#"[{"name":"demo-shot01-artist_maya-shotA-v001","id":"6a1f0e52-4b1c-4e2f-9a8d-1c3b5e7f9a01"}]"#;
