use crate::client::SubmissionClient;
use crate::config::FarmConfig;
use crate::error::{CompileError, SubmissionError, SubmitError, ValidationErrors};
use crate::handoff;
use crate::models::{job_request::JobRequest, submission::SubmissionResult};
use crate::service::{FarmService, HttpFarmService};
use crate::spec::{Compiler, JobSpec};
use crate::validation;
use std::path::Path;

/// One request at a time: validate, compile, submit.
/// Nothing is kept between runs.
pub struct Pipeline<'a, S = HttpFarmService> {
    compiler: Compiler<'a>,
    client: SubmissionClient<S>,
}

impl<'a> Pipeline<'a> {
    pub fn connect(config: &'a FarmConfig) -> Result<Self, SubmissionError> {
        Ok(Self::new(config, SubmissionClient::connect(config)?))
    }
}

impl<'a, S: FarmService> Pipeline<'a, S> {
    pub fn new(config: &'a FarmConfig, client: SubmissionClient<S>) -> Self {
        Self {
            compiler: Compiler::new(config),
            client,
        }
    }

    pub fn client(&self) -> &SubmissionClient<S> {
        &self.client
    }

    pub fn validate(&self, request: &JobRequest) -> Vec<String> {
        validation::validate(request, self.compiler.translator())
    }

    /// Validate then compile. Never touches the network.
    pub fn compile(&self, request: &JobRequest) -> Result<JobSpec, SubmitError> {
        compile_checked(&self.compiler, request)
    }

    /// `(layer name, command)` for every layer, as a render node would run it.
    pub fn preview(&self, request: &JobRequest) -> Result<Vec<(String, String)>, CompileError> {
        preview(&self.compiler, request)
    }

    pub fn run(&self, request: &JobRequest) -> Result<SubmissionResult, SubmitError> {
        let spec = self.compile(request)?;
        Ok(self.client.submit(&spec)?)
    }

    /// Consume a hand-off file written by another process and submit it.
    /// The file is gone afterwards whatever the outcome.
    pub fn run_handoff(&self, path: impl AsRef<Path>) -> Result<SubmissionResult, SubmitError> {
        let request = handoff::consume(path)?;
        self.run(&request)
    }
}

/// Validate then compile, for callers with no farm connection at all.
pub fn compile_checked(compiler: &Compiler<'_>, request: &JobRequest) -> Result<JobSpec, SubmitError> {
    let errors = validation::validate(request, compiler.translator());
    if !errors.is_empty() {
        tracing::warn!(
            "Job {} failed validation with {} error(s)",
            request.name,
            errors.len()
        );
        return Err(ValidationErrors(errors).into());
    }

    let spec = compiler.compile(request)?;
    tracing::debug!(
        "Compiled job {} with {} layer(s)",
        spec.job.name,
        spec.job.layers.len()
    );
    Ok(spec)
}

pub fn preview(
    compiler: &Compiler<'_>,
    request: &JobRequest,
) -> Result<Vec<(String, String)>, CompileError> {
    request
        .layers
        .iter()
        .map(|layer| Ok((layer.name.clone(), compiler.layer_command(layer)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathRule;
    use crate::handoff::HandoffFile;
    use crate::models::{
        job_request::FrameRange,
        layer::{LayerKind, LayerSpec, Renderer},
        service::{HostRecord, ServiceDefinition, ShowRecord},
        submission::JobHandle,
    };
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingFarm {
        launches: Cell<usize>,
    }

    impl FarmService for CountingFarm {
        fn endpoint(&self) -> &str {
            "stub:8443"
        }

        fn launch_spec(&self, _: &str) -> Result<Vec<JobHandle>, SubmissionError> {
            self.launches.set(self.launches.get() + 1);
            Ok(vec![JobHandle {
                name: "demo-shot01-artist_maya-shotA-v001".into(),
                id: "0f7c".into(),
            }])
        }

        fn get_service(&self, _: &str) -> Result<Option<ServiceDefinition>, SubmissionError> {
            Ok(None)
        }

        fn create_service(&self, _: &ServiceDefinition) -> Result<(), SubmissionError> {
            Ok(())
        }

        fn update_service(&self, _: &ServiceDefinition) -> Result<(), SubmissionError> {
            Ok(())
        }

        fn list_services(&self) -> Result<Vec<ServiceDefinition>, SubmissionError> {
            Ok(Vec::new())
        }

        fn find_show(&self, _: &str) -> Result<Option<ShowRecord>, SubmissionError> {
            Ok(None)
        }

        fn create_show(&self, name: &str) -> Result<ShowRecord, SubmissionError> {
            Ok(ShowRecord { name: name.into() })
        }

        fn list_shows(&self) -> Result<Vec<ShowRecord>, SubmissionError> {
            Ok(Vec::new())
        }

        fn list_hosts(&self) -> Result<Vec<HostRecord>, SubmissionError> {
            Ok(Vec::new())
        }
    }

    fn config() -> FarmConfig {
        FarmConfig {
            path_rule: PathRule {
                local_prefix: "S:".into(),
                remote_prefix: "//server/share".into(),
            },
            ..FarmConfig::default()
        }
    }

    fn request() -> JobRequest {
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

    fn pipeline(config: &FarmConfig) -> Pipeline<'_, CountingFarm> {
        Pipeline::new(config, SubmissionClient::new(CountingFarm::default(), "/logs"))
    }

    #[test]
    fn valid_request_is_submitted() {
        let config = config();
        let pipeline = pipeline(&config);
        let result = pipeline.run(&request()).unwrap();
        assert_eq!(result.jobs.len(), 1);
        assert_eq!(result.jobs[0].id, "0f7c");
        assert_eq!(pipeline.client().service().launches.get(), 1);
    }

    #[test]
    fn invalid_request_never_reaches_the_farm() {
        let config = config();
        let pipeline = pipeline(&config);
        let mut req = request();
        req.layers[0].range = FrameRange::new(1010, 1001);

        match pipeline.run(&req) {
            Err(SubmitError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(pipeline.client().service().launches.get(), 0);
    }

    #[test]
    fn preview_lists_translated_commands() {
        let config = config();
        let commands = pipeline(&config).preview(&request()).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].0, "render");
        assert!(commands[0].1.ends_with("\"//server/share/show/scene.ma\""));
    }

    #[test]
    fn handoff_is_consumed_and_removed() {
        let config = config();
        let pipeline = pipeline(&config);
        let file = HandoffFile::write(&request()).unwrap();
        let path = file.path().to_path_buf();

        let result = pipeline.run_handoff(&path).unwrap();
        assert_eq!(result.jobs.len(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn failed_handoff_run_still_removes_file() {
        let config = config();
        let pipeline = pipeline(&config);
        let mut req = request();
        req.show.clear();
        let file = HandoffFile::write(&req).unwrap();
        let path = file.path().to_path_buf();

        assert!(matches!(
            pipeline.run_handoff(&path),
            Err(SubmitError::Validation(_))
        ));
        assert!(!path.exists());
    }
}
