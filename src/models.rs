pub mod job_request;
pub mod layer;
pub mod service;
pub mod submission;
