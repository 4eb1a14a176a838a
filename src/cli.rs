use clap::{Args, Parser, Subcommand};
use cuesubmit::{
    models::layer::{LayerKind, LayerSpec, Renderer, ResourceTier},
    FrameRange, JobRequest,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cuesubmit")]
#[command(version)]
#[command(about = "Compile Maya batch renders into farm job specifications and submit them.")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Farm config file. Defaults to CueSubmit/FarmConfig.json in the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate, compile and submit a render of a scene file.
    Submit(SubmitArgs),
    /// Submit a job request hand-off file written by another process, then delete it.
    Worker {
        handoff: PathBuf,
        /// Farm service host:port.
        endpoint: String,
    },
    /// Print the job document compiled from a job request JSON file.
    Compile { request: PathBuf },
    /// Print the command each layer of a job request JSON file would run.
    Preview { request: PathBuf },
    /// Create or update the default resource tiers and a show on the farm.
    Setup(SetupArgs),
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Scene file, as seen from this workstation.
    #[arg(long)]
    pub scene: String,

    /// Job name. Defaults to the scene file name without extension.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = "testing")]
    pub show: String,

    #[arg(long, default_value = "shot01")]
    pub shot: String,

    /// Defaults to the logged in user.
    #[arg(long)]
    pub user: Option<String>,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub start: i32,

    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    pub end: i32,

    /// Frames per farm task.
    #[arg(long, default_value_t = 1)]
    pub chunk: u32,

    #[arg(long, default_value = "file")]
    pub renderer: String,

    /// Camera to render; empty renders the scene's renderable cameras.
    #[arg(long, default_value = "")]
    pub camera: String,

    /// Resource tiers, comma separated or repeated.
    #[arg(long = "service", value_delimiter = ',')]
    pub services: Vec<String>,

    #[arg(long, default_value = "render")]
    pub layer_name: String,

    #[arg(long)]
    pub priority: Option<u32>,

    /// Farm service host:port, overrides the config file.
    #[arg(long, env = "CUEBOT_HOSTS")]
    pub endpoint: Option<String>,

    /// Hand the request to a separate worker process instead of submitting here.
    #[arg(long)]
    pub out_of_process: bool,
}

#[derive(Args)]
pub struct SetupArgs {
    /// Farm service host:port.
    #[arg(long, short = 'c', env = "CUEBOT_HOSTS", default_value = "localhost:8443")]
    pub endpoint: String,

    /// Show to create.
    #[arg(long, short, default_value = cuesubmit::setup::DEFAULT_SHOW)]
    pub show: String,
}

/// `CUEBOT_HOSTS` may hold several hosts; the submitter talks to the first.
pub fn first_host(hosts: &str) -> &str {
    hosts.split(',').map(str::trim).find(|h| !h.is_empty()).unwrap_or("")
}

fn current_user() -> String {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "render".to_owned())
}

fn job_name_from_scene(scene: &str) -> String {
    let normalized = scene.replace('\\', "/");
    Path::new(&normalized)
        .file_stem()
        .map(|stem| stem.to_string_lossy().split_whitespace().collect::<Vec<_>>().join("_"))
        .unwrap_or_default()
}

impl SubmitArgs {
    pub fn to_request(&self) -> JobRequest {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| job_name_from_scene(&self.scene));
        let user = self.user.clone().unwrap_or_else(current_user);

        let mut layer = LayerSpec::new(
            LayerKind::maya(Renderer::from(self.renderer.clone()), self.camera.as_str()),
            FrameRange::new(self.start, self.end),
            self.scene.as_str(),
        )
        .named(self.layer_name.as_str())
        .chunk(self.chunk);
        layer.services = self
            .services
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(ResourceTier::new)
            .collect();

        let mut request = JobRequest::new(name, self.show.as_str(), self.shot.as_str(), user);
        request.priority = self.priority;
        request.with_layer(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_name_defaults_to_scene_stem() {
        assert_eq!(job_name_from_scene("S:\\shots\\shot A_v001.ma"), "shot_A_v001");
        assert_eq!(job_name_from_scene("S:/shots/lighting.mb"), "lighting");
        assert_eq!(job_name_from_scene(""), "");
    }

    #[test]
    fn first_host_of_list() {
        assert_eq!(first_host("farm1:8443, farm2:8443"), "farm1:8443");
        assert_eq!(first_host(" ,farm2:8443"), "farm2:8443");
        assert_eq!(first_host(""), "");
    }

    #[test]
    fn submit_args_build_one_maya_layer() {
        let cli = Cli::parse_from([
            "cuesubmit",
            "submit",
            "--scene",
            "S:/show/scene.ma",
            "--start",
            "1001",
            "--end",
            "1010",
            "--chunk",
            "5",
            "--renderer",
            "arnold",
            "--service",
            "arnold,maya2026",
            "--user",
            "artist",
        ]);
        let Commands::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        let request = args.to_request();
        assert_eq!(request.name, "scene");
        assert_eq!(request.show, "testing");
        assert_eq!(request.username, "artist");

        let layer = &request.layers[0];
        assert_eq!(layer.range, FrameRange::new(1001, 1010));
        assert_eq!(layer.chunk, 5);
        assert_eq!(layer.kind, LayerKind::maya(Renderer::Arnold, ""));
        assert_eq!(
            layer.services,
            vec![ResourceTier::new("arnold"), ResourceTier::new("maya2026")]
        );
    }
}
