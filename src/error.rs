use std::{fmt, time::Duration};
use thiserror::Error;

/// Every rule a job request broke, in the order the rules were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("No render target provided, a command without a scene file cannot be submitted")]
    MissingTarget,
    #[error("No render executable configured")]
    MissingExecutable,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unsupported layer type `{layer_type}` on layer `{layer}`")]
    UnsupportedLayerType { layer: String, layer_type: String },
    #[error("Job `{0}` has no layers")]
    NoLayers(String),
    #[error("Layer `{0}` references an empty resource tier")]
    EmptyResourceTier(String),
    #[error("Layer `{0}` command still refers to a workstation path")]
    UntranslatedPath(String),
    #[error("Layer `{layer}`: {source}")]
    Command {
        layer: String,
        #[source]
        source: CommandError,
    },
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The farm refused the request. Holds the service's text untouched.
    #[error("{0}")]
    Rejected(String),
    #[error("Timed out after {timeout:?} waiting for {endpoint}")]
    Timeout { endpoint: String, timeout: Duration },
    #[error("Unable to reach farm service at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },
    #[error("Unexpected response from farm service: {0}")]
    InvalidResponse(String),
    #[error("Invalid farm endpoint `{0}`")]
    InvalidEndpoint(String),
}

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("Hand-off file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Hand-off file is not a valid job request: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to locate the user config directory")]
    NoConfigDir,
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that stops a job request from reaching the farm.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Job request is invalid:\n{0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Handoff(#[from] HandoffError),
}
