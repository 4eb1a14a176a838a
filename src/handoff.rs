/*
    Job requests can be compiled and submitted by a different process than the
    one that collected them. The only thing crossing that boundary is a JSON
    file: written once by the caller, read once by the worker, and deleted by
    whichever side gets there first, on every exit path.
*/
use crate::error::HandoffError;
use crate::models::job_request::JobRequest;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use uuid::Uuid;

/// A written hand-off file. Dropping it deletes the file if it still exists.
#[derive(Debug)]
pub struct HandoffFile {
    path: PathBuf,
}

impl HandoffFile {
    /// Write the request into the system temp directory.
    pub fn write(request: &JobRequest) -> Result<Self, HandoffError> {
        Self::write_in(std::env::temp_dir(), request)
    }

    pub fn write_in(dir: impl AsRef<Path>, request: &JobRequest) -> Result<Self, HandoffError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("cuesubmit-{}.json", Uuid::new_v4()));

        // hold the guard before writing so a failed write still cleans up
        let file = Self { path };
        let data = serde_json::to_string_pretty(request)?;
        fs::write(&file.path, data)?;
        tracing::debug!("Wrote hand-off file {}", file.path.display());
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for HandoffFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed hand-off file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Unable to remove hand-off file {}: {e}",
                self.path.display()
            ),
        }
    }
}

/// Read a hand-off file and delete it, whether or not it parses.
pub fn consume(path: impl AsRef<Path>) -> Result<JobRequest, HandoffError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path);
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Unable to remove hand-off file {}: {e}", path.display());
        }
    }
    Ok(serde_json::from_str(&data?)?)
}
