use crate::error::SubmissionError;
use crate::models::{
    service::{HostRecord, ServiceDefinition, ShowRecord},
    submission::JobHandle,
};
use serde::de::DeserializeOwned;
use std::{io::ErrorKind, time::Duration};
use url::Url;

/// Calls the submitter and setup tool make against the farm.
/// Every call is a single blocking request; none of them retry.
pub trait FarmService {
    /// `host:port` this service talks to, used in diagnostics.
    fn endpoint(&self) -> &str;

    /// Launch a compiled job document and wait until the farm acknowledges it.
    fn launch_spec(&self, spec: &str) -> Result<Vec<JobHandle>, SubmissionError>;

    fn get_service(&self, name: &str) -> Result<Option<ServiceDefinition>, SubmissionError>;
    fn create_service(&self, service: &ServiceDefinition) -> Result<(), SubmissionError>;
    fn update_service(&self, service: &ServiceDefinition) -> Result<(), SubmissionError>;
    fn list_services(&self) -> Result<Vec<ServiceDefinition>, SubmissionError>;

    fn find_show(&self, name: &str) -> Result<Option<ShowRecord>, SubmissionError>;
    fn create_show(&self, name: &str) -> Result<ShowRecord, SubmissionError>;
    fn list_shows(&self) -> Result<Vec<ShowRecord>, SubmissionError>;

    fn list_hosts(&self) -> Result<Vec<HostRecord>, SubmissionError>;
}

struct Reply {
    status: u16,
    body: String,
}

impl Reply {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_not_found(&self) -> bool {
        self.status == 404
    }

    // keep the farm's own words; only fall back to the status when it said nothing
    fn into_rejection(self) -> SubmissionError {
        if self.body.trim().is_empty() {
            SubmissionError::Rejected(format!("farm service returned HTTP {}", self.status))
        } else {
            SubmissionError::Rejected(self.body)
        }
    }

    fn accepted(self) -> Result<String, SubmissionError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(self.into_rejection())
        }
    }

    fn json<T: DeserializeOwned>(self) -> Result<T, SubmissionError> {
        let body = self.accepted()?;
        serde_json::from_str(&body).map_err(|e| SubmissionError::InvalidResponse(e.to_string()))
    }
}

/// Farm service reached through its HTTP gateway.
#[derive(Clone)]
pub struct HttpFarmService {
    endpoint: String,
    base: Url,
    timeout: Duration,
    agent: ureq::Agent,
}

impl HttpFarmService {
    /// Point a client at `host:port`. No request is made until the first call.
    pub fn connect(endpoint: &str, timeout: Duration) -> Result<Self, SubmissionError> {
        let endpoint = endpoint.trim();
        let raw = if endpoint.contains("://") {
            endpoint.to_owned()
        } else {
            format!("http://{endpoint}")
        };
        let base = Url::parse(&raw)
            .ok()
            .filter(|url| url.host_str().is_some())
            .ok_or_else(|| SubmissionError::InvalidEndpoint(endpoint.to_owned()))?;

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        tracing::debug!("Farm service endpoint set to {base}");
        Ok(Self {
            endpoint: endpoint.to_owned(),
            base,
            timeout,
            agent: ureq::Agent::new_with_config(config),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SubmissionError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SubmissionError::InvalidEndpoint(self.endpoint.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn transport_error(&self, err: ureq::Error) -> SubmissionError {
        match err {
            ureq::Error::Timeout(_) => self.timeout_error(),
            ureq::Error::Io(e) if e.kind() == ErrorKind::TimedOut => self.timeout_error(),
            other => SubmissionError::Unreachable {
                endpoint: self.endpoint.clone(),
                reason: other.to_string(),
            },
        }
    }

    fn timeout_error(&self) -> SubmissionError {
        SubmissionError::Timeout {
            endpoint: self.endpoint.clone(),
            timeout: self.timeout,
        }
    }

    fn read(
        &self,
        result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<Reply, SubmissionError> {
        let mut response = result.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.transport_error(e))?;
        Ok(Reply { status, body })
    }

    fn get(&self, segments: &[&str]) -> Result<Reply, SubmissionError> {
        let url = self.url(segments)?;
        self.read(self.agent.get(url.as_str()).call())
    }

    fn post(&self, segments: &[&str], content_type: &str, body: &str) -> Result<Reply, SubmissionError> {
        let url = self.url(segments)?;
        self.read(
            self.agent
                .post(url.as_str())
                .header("Content-Type", content_type)
                .send(body),
        )
    }

    fn put(&self, segments: &[&str], content_type: &str, body: &str) -> Result<Reply, SubmissionError> {
        let url = self.url(segments)?;
        self.read(
            self.agent
                .put(url.as_str())
                .header("Content-Type", content_type)
                .send(body),
        )
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SubmissionError> {
    serde_json::to_string(value).map_err(|e| SubmissionError::InvalidResponse(e.to_string()))
}

impl FarmService for HttpFarmService {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn launch_spec(&self, spec: &str) -> Result<Vec<JobHandle>, SubmissionError> {
        self.post(&["api", "jobs", "launch"], "application/xml", spec)?
            .json()
    }

    fn get_service(&self, name: &str) -> Result<Option<ServiceDefinition>, SubmissionError> {
        let reply = self.get(&["api", "services", name])?;
        if reply.is_not_found() {
            return Ok(None);
        }
        reply.json().map(Some)
    }

    fn create_service(&self, service: &ServiceDefinition) -> Result<(), SubmissionError> {
        let body = to_json(service)?;
        self.post(&["api", "services"], "application/json", &body)?
            .accepted()
            .map(|_| ())
    }

    fn update_service(&self, service: &ServiceDefinition) -> Result<(), SubmissionError> {
        let body = to_json(service)?;
        self.put(&["api", "services", &service.name], "application/json", &body)?
            .accepted()
            .map(|_| ())
    }

    fn list_services(&self) -> Result<Vec<ServiceDefinition>, SubmissionError> {
        self.get(&["api", "services"])?.json()
    }

    fn find_show(&self, name: &str) -> Result<Option<ShowRecord>, SubmissionError> {
        let reply = self.get(&["api", "shows", name])?;
        if reply.is_not_found() {
            return Ok(None);
        }
        reply.json().map(Some)
    }

    fn create_show(&self, name: &str) -> Result<ShowRecord, SubmissionError> {
        let show = ShowRecord {
            name: name.to_owned(),
        };
        self.post(&["api", "shows"], "application/json", &to_json(&show)?)?
            .accepted()?;
        Ok(show)
    }

    fn list_shows(&self) -> Result<Vec<ShowRecord>, SubmissionError> {
        self.get(&["api", "shows"])?.json()
    }

    fn list_hosts(&self) -> Result<Vec<HostRecord>, SubmissionError> {
        self.get(&["api", "hosts"])?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_becomes_http_url() {
        let service = HttpFarmService::connect("10.0.0.5:8443", Duration::from_secs(5)).unwrap();
        assert_eq!(service.endpoint(), "10.0.0.5:8443");
        assert_eq!(
            service.url(&["api", "jobs", "launch"]).unwrap().as_str(),
            "http://10.0.0.5:8443/api/jobs/launch"
        );
    }

    #[test]
    fn names_are_path_encoded() {
        let service = HttpFarmService::connect("farm:80", Duration::from_secs(5)).unwrap();
        assert_eq!(
            service.url(&["api", "shows", "my show"]).unwrap().as_str(),
            "http://farm/api/shows/my%20show"
        );
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        assert!(matches!(
            HttpFarmService::connect("", Duration::from_secs(5)),
            Err(SubmissionError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn empty_rejection_mentions_status() {
        let reply = Reply {
            status: 500,
            body: String::new(),
        };
        assert_eq!(
            reply.into_rejection().to_string(),
            "farm service returned HTTP 500"
        );
    }

    #[test]
    fn sub_second_timeout_is_reported_exactly() {
        let service = HttpFarmService::connect("farm:8443", Duration::from_millis(300)).unwrap();
        assert_eq!(
            service.timeout_error().to_string(),
            "Timed out after 300ms waiting for farm:8443"
        );
    }
}
