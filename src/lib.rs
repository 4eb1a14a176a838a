// job request, layer and submission result types
pub mod models;

// per-run configuration: endpoint, executables, path rewrite rule
pub mod config;

// error types shared across the pipeline
pub mod error;

// rewrite workstation paths into render node paths
pub mod path_translator;

// command line a render node invokes for each task
pub mod command;

// pre-flight checks on a job request
pub mod validation;

// farm job specification document
pub mod spec;

// transport to the farm service
pub mod service;

// submit compiled documents and report created jobs
pub mod client;

// job request file passed between processes
pub mod handoff;

// validate -> compile -> submit
pub mod pipeline;

// create or update resource tiers and shows on the farm
pub mod setup;

pub use client::SubmissionClient;
pub use config::FarmConfig;
pub use error::{SubmitError, SubmissionError};
pub use models::{
    job_request::{FrameRange, JobRequest},
    layer::{LayerKind, LayerSpec, ResourceTier},
    submission::{JobHandle, SubmissionResult, SubmittedJob},
};
pub use pipeline::Pipeline;
