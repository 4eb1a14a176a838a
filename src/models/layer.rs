use super::job_request::FrameRange;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

pub const DEFAULT_LAYER_NAME: &str = "render";

/// Name of a resource tier (service) defined on the farm. Existence is the farm's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTier(String);

impl ResourceTier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ResourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceTier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// Value passed to Render.exe -r
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Renderer {
    #[default]
    File,
    Arnold,
    Redshift,
    MayaHardware2,
    Other(String),
}

impl From<String> for Renderer {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "file" => Renderer::File,
            "arnold" => Renderer::Arnold,
            "redshift" => Renderer::Redshift,
            "mayaHardware2" => Renderer::MayaHardware2,
            _ => Renderer::Other(value),
        }
    }
}

impl From<Renderer> for String {
    fn from(value: Renderer) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::File => f.write_str("file"),
            Renderer::Arnold => f.write_str("arnold"),
            Renderer::Redshift => f.write_str("redshift"),
            Renderer::MayaHardware2 => f.write_str("mayaHardware2"),
            Renderer::Other(name) => f.write_str(name),
        }
    }
}

/// What a layer runs. Each variant has its own command strategy in [`crate::spec`].
// JSON: {"layerType": "Maya", "renderer": "arnold", "camera": "shotCam"}
// JSON: {"layerType": "Shell", "command": "render -s <START> -e <END> scene.ma"}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layerType")]
pub enum LayerKind {
    Maya {
        #[serde(default)]
        renderer: Renderer,
        #[serde(default)]
        camera: String,
    },
    Shell {
        command: String,
    },
    #[serde(other)]
    Unsupported,
}

impl LayerKind {
    pub fn maya(renderer: Renderer, camera: impl Into<String>) -> Self {
        LayerKind::Maya {
            renderer,
            camera: camera.into(),
        }
    }

    pub fn shell(command: impl Into<String>) -> Self {
        LayerKind::Shell {
            command: command.into(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LayerKind::Maya { .. } => "Maya",
            LayerKind::Shell { .. } => "Shell",
            LayerKind::Unsupported => "Unsupported",
        }
    }
}

fn default_layer_name() -> String {
    DEFAULT_LAYER_NAME.to_owned()
}

fn default_chunk() -> u32 {
    1
}

/// One renderable unit within a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    #[serde(default = "default_layer_name")]
    pub name: String,
    #[serde(flatten)]
    pub kind: LayerKind,
    pub range: FrameRange,
    /// Frames per farm task.
    #[serde(default = "default_chunk")]
    pub chunk: u32,
    #[serde(default)]
    pub services: Vec<ResourceTier>,
    /// Scene or asset file, in the workstation's path namespace.
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_memory_mb: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl LayerSpec {
    pub fn new(kind: LayerKind, range: FrameRange, target: impl Into<String>) -> Self {
        Self {
            name: default_layer_name(),
            kind,
            range,
            chunk: default_chunk(),
            services: Vec::new(),
            target: target.into(),
            min_cores: None,
            min_memory_mb: None,
            env: BTreeMap::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn chunk(mut self, chunk: u32) -> Self {
        self.chunk = chunk;
        self
    }

    pub fn service(mut self, tier: impl Into<ResourceTier>) -> Self {
        self.services.push(tier.into());
        self
    }
}
