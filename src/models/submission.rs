use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the farm hands back for each job it created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedJob {
    pub name: String,
    pub id: String,
    /// Expected log directory. Derived locally from show/shot/job name, so it
    /// can differ from the directory the farm actually writes to.
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub jobs: Vec<SubmittedJob>,
}

impl SubmissionResult {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubmittedJob> {
        self.jobs.iter()
    }
}
