use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

// path to config file name.
const SETTINGS_PATH: &str = "CueSubmit";
const SETTINGS_FILE_NAME: &str = "FarmConfig.json";

/// Prefix rewrite from the artist's drive to the share render nodes mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRule {
    pub local_prefix: String,
    pub remote_prefix: String,
}

impl Default for PathRule {
    fn default() -> Self {
        Self {
            local_prefix: "S:".to_owned(),
            remote_prefix: "//renderserver/p4workspace".to_owned(),
        }
    }
}

/// Operating system of the render nodes, written into the job document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeOs {
    #[default]
    Windows,
    Linux,
}

impl fmt::Display for NodeOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOs::Windows => f.write_str("Windows"),
            NodeOs::Linux => f.write_str("Linux"),
        }
    }
}

/// Settings for one run of the submitter. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Farm service `host:port`.
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Render executable as seen from the render nodes.
    pub render_executable: String,
    pub path_rule: PathRule,
    pub frame_start_token: String,
    pub frame_end_token: String,
    /// Root under which per-job log directories are expected.
    pub log_root: PathBuf,
    pub facility: String,
    pub node_os: NodeOs,
    /// Numeric identity sent with every job. There is no per-user mapping,
    /// so every submission uses this non-root value.
    pub uid: u32,
    /// Resource tier used by layers that do not name one.
    pub default_service: String,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:8443".to_owned(),
            timeout_secs: 30,
            render_executable: "C:/Program Files/Autodesk/Maya2026/bin/Render.exe".to_owned(),
            path_rule: PathRule::default(),
            frame_start_token: "#FRAME_START#".to_owned(),
            frame_end_token: "#FRAME_END#".to_owned(),
            log_root: PathBuf::from("//renderserver/RenderOutputRepo/OpenCue/Logs"),
            facility: "local".to_owned(),
            node_os: NodeOs::Windows,
            uid: 1000,
            default_service: "maya".to_owned(),
        }
    }
}

impl FarmConfig {
    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(SETTINGS_PATH).join(SETTINGS_FILE_NAME))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load user configuration, falling back to defaults when no file exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::get_config_path()?)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
