use crate::config::FarmConfig;
use crate::error::SubmissionError;
use crate::models::submission::{SubmissionResult, SubmittedJob};
use crate::service::{FarmService, HttpFarmService};
use crate::spec::JobSpec;
use std::path::{Path, PathBuf};

/// Sends compiled job documents to the farm and reports what it created.
pub struct SubmissionClient<S = HttpFarmService> {
    service: S,
    log_root: PathBuf,
}

impl SubmissionClient<HttpFarmService> {
    /// Point a client at the configured endpoint with the configured timeout.
    pub fn connect(config: &FarmConfig) -> Result<Self, SubmissionError> {
        Self::connect_to(&config.endpoint, config)
    }

    pub fn connect_to(endpoint: &str, config: &FarmConfig) -> Result<Self, SubmissionError> {
        let service = HttpFarmService::connect(endpoint, config.timeout())?;
        Ok(Self::new(service, config.log_root.clone()))
    }
}

impl<S: FarmService> SubmissionClient<S> {
    pub fn new(service: S, log_root: impl AsRef<Path>) -> Self {
        Self {
            service,
            log_root: log_root.as_ref().to_path_buf(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Where logs for a job are expected: `<log root>/<show>/<shot>/logs/<job>`.
    ///
    /// Computed here, not asked of the farm, so it is not guaranteed to match
    /// the directory the farm writes to.
    pub fn log_dir(&self, show: &str, shot: &str, job_name: &str) -> PathBuf {
        self.log_root.join(show).join(shot).join("logs").join(job_name)
    }

    /// Launch the document and block until the farm acknowledges it.
    ///
    /// A failure is returned as is and never retried: launching twice could
    /// create the job twice.
    pub fn submit(&self, spec: &JobSpec) -> Result<SubmissionResult, SubmissionError> {
        tracing::info!(
            "Submitting job {} ({} layer(s)) to {}",
            spec.job.name,
            spec.job.layers.len(),
            self.service.endpoint()
        );

        let handles = match self.service.launch_spec(&spec.to_xml()) {
            Ok(handles) => handles,
            Err(e) => {
                tracing::error!("Submission of {} failed: {e}", spec.job.name);
                return Err(e);
            }
        };

        let jobs = handles
            .into_iter()
            .map(|handle| {
                tracing::info!("Created job {} [{}]", handle.name, handle.id);
                SubmittedJob {
                    log_dir: self.log_dir(&spec.show, &spec.shot, &handle.name),
                    name: handle.name,
                    id: handle.id,
                }
            })
            .collect();

        Ok(SubmissionResult { jobs })
    }
}
