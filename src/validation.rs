use crate::error::ValidationErrors;
use crate::models::job_request::JobRequest;
use crate::path_translator::PathTranslator;

pub const MIN_JOB_NAME_LEN: usize = 4;

/// Check a request before anything is compiled or sent.
///
/// Every rule runs and every violation is reported, so the artist can fix them
/// all in one go. Uniqueness of the job name is only known to the farm and
/// shows up later as a submission failure. The request is never modified.
pub fn validate(request: &JobRequest, translator: &PathTranslator) -> Vec<String> {
    let mut errors = Vec::new();

    let name = request.name.trim();
    if name.is_empty() {
        errors.push("Job name is required".to_owned());
    } else {
        if request.name.chars().count() < MIN_JOB_NAME_LEN {
            errors.push(format!(
                "Job name `{}` must have more than 3 characters",
                request.name
            ));
        }
        if request.name.chars().any(char::is_whitespace) {
            errors.push(format!("Job name `{}` must not contain spaces", request.name));
        }
    }

    if request.show.trim().is_empty() {
        errors.push("Show is required".to_owned());
    }

    if request.layers.is_empty() {
        errors.push("Job must have at least one layer".to_owned());
    }

    for layer in request.layers.iter().filter(|l| !l.range.is_ordered()) {
        errors.push(format!(
            "Layer `{}`: start frame {} must be less than or equal to end frame {}",
            layer.name, layer.range.start, layer.range.end
        ));
    }

    for layer in &request.layers {
        if translator.translate(&layer.target).trim().is_empty() {
            errors.push(format!(
                "Layer `{}`: render file is required (save your scene first)",
                layer.name
            ));
        }
    }

    for layer in request.layers.iter().filter(|l| l.chunk < 1) {
        errors.push(format!("Layer `{}`: chunk size must be at least 1", layer.name));
    }

    errors
}

/// [`validate`] as a `Result`, for callers that stop on the first bad request.
pub fn check(request: &JobRequest, translator: &PathTranslator) -> Result<(), ValidationErrors> {
    let errors = validate(request, translator);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
