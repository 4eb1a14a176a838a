use crate::error::CommandError;
use crate::models::layer::Renderer;
use serde::{Deserialize, Serialize};

// ref: `Render -help` in the Maya bin directory
/// Arguments for one Maya batch render invocation. Frame numbers are left as
/// the farm's placeholder tokens; the farm fills them in per task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderCommand {
    executable: String,
    renderer: Renderer,
    camera: Option<String>,
    target: String,
    frame_start_token: String,
    frame_end_token: String,
}

// Render nodes take forward slashes on every OS.
fn to_node_separators(path: &str) -> String {
    path.replace('\\', "/")
}

impl RenderCommand {
    pub fn new(
        executable: impl Into<String>,
        renderer: Renderer,
        camera: impl Into<String>,
        target: impl Into<String>,
        frame_start_token: impl Into<String>,
        frame_end_token: impl Into<String>,
    ) -> Self {
        let camera = camera.into();
        Self {
            executable: executable.into(),
            renderer,
            camera: (!camera.trim().is_empty()).then_some(camera),
            target: target.into(),
            frame_start_token: frame_start_token.into(),
            frame_end_token: frame_end_token.into(),
        }
    }

    /// Argument vector without the executable.
    pub fn create_arg_list(&self) -> Result<Vec<String>, CommandError> {
        if self.target.trim().is_empty() {
            return Err(CommandError::MissingTarget);
        }

        let mut col = vec![
            "-r".to_owned(),
            self.renderer.to_string(),
            "-s".to_owned(),
            self.frame_start_token.clone(),
            "-e".to_owned(),
            self.frame_end_token.clone(),
        ];

        if let Some(camera) = &self.camera {
            col.push("-cam".to_owned());
            col.push(camera.clone());
        }

        // scene file must be the last positional argument
        col.push(to_node_separators(&self.target));
        Ok(col)
    }

    /// Full command line, executable and scene file quoted so spaces survive.
    pub fn build(&self) -> Result<String, CommandError> {
        if self.executable.trim().is_empty() {
            return Err(CommandError::MissingExecutable);
        }
        let mut args = self.create_arg_list()?;
        let target = args.pop().unwrap_or_default();

        let mut line = format!("\"{}\"", to_node_separators(&self.executable));
        for arg in args {
            line.push(' ');
            line.push_str(&arg);
        }
        line.push_str(&format!(" \"{target}\""));
        Ok(line)
    }
}

/// Build the per-task command for a render node.
pub fn build_command(
    executable: &str,
    renderer: &Renderer,
    camera: &str,
    target: &str,
    frame_start_token: &str,
    frame_end_token: &str,
) -> Result<String, CommandError> {
    RenderCommand::new(
        executable,
        renderer.clone(),
        camera,
        target,
        frame_start_token,
        frame_end_token,
    )
    .build()
}
