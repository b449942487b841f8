//! Local mermaid CLI (`mmdc`) renderer.

use std::time::Duration;

use press_exec::{ExternalCommand, ScratchDir};

use crate::consts::{CLI_TIMEOUT, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::{DiagramError, DiagramMethod};

const INPUT_FILE: &str = "diagram.mmd";
const OUTPUT_FILE: &str = "diagram.png";

/// Renders diagrams by running the mermaid CLI in a scratch directory.
///
/// Succeeds only when the process exits with status 0 within the deadline
/// and leaves a non-empty PNG behind.
#[derive(Clone, Debug)]
pub struct CliRenderer {
    command: String,
    timeout: Duration,
    width: u32,
    height: u32,
    background: String,
}

impl CliRenderer {
    /// Create a renderer for the given `mmdc` command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: CLI_TIMEOUT,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: "white".to_owned(),
        }
    }

    /// Set the process deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the canvas size in pixels.
    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the canvas background color.
    #[must_use]
    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    fn command_for(&self, scratch: &ScratchDir) -> ExternalCommand {
        ExternalCommand::new(&self.command)
            .arg("-i")
            .arg(scratch.file(INPUT_FILE))
            .arg("-o")
            .arg(scratch.file(OUTPUT_FILE))
            .arg("--width")
            .arg(self.width.to_string())
            .arg("--height")
            .arg(self.height.to_string())
            .arg("--backgroundColor")
            .arg(&self.background)
            .timeout(self.timeout)
    }
}

impl DiagramMethod for CliRenderer {
    fn name(&self) -> &'static str {
        "mmdc"
    }

    fn attempt(&self, source: &str) -> Result<Vec<u8>, DiagramError> {
        let scratch = ScratchDir::new("press-mmdc-")?;
        scratch.write(INPUT_FILE, source)?;

        self.command_for(&scratch).run_checked()?;

        match scratch.read(OUTPUT_FILE)? {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(DiagramError::EmptyOutput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_exec::ExecError;

    #[test]
    fn test_missing_command_fails() {
        let renderer = CliRenderer::new("press-missing-mmdc");
        let err = renderer.attempt("graph TD\nA-->B").unwrap_err();
        assert!(matches!(err, DiagramError::Exec(ref e) if e.is_not_found()));
    }

    #[cfg(unix)]
    #[test]
    fn test_success_without_output_is_empty() {
        // `true` accepts any arguments and writes nothing.
        let renderer = CliRenderer::new("true");
        let err = renderer.attempt("graph TD\nA-->B").unwrap_err();
        assert!(matches!(err, DiagramError::EmptyOutput));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_fails() {
        let renderer = CliRenderer::new("false");
        let err = renderer.attempt("graph TD").unwrap_err();
        assert!(matches!(err, DiagramError::Exec(ExecError::Failed { .. })));
    }

    #[test]
    fn test_builder() {
        let renderer = CliRenderer::new("mmdc")
            .timeout(Duration::from_secs(5))
            .size(1024, 768)
            .background("transparent");
        assert_eq!(renderer.timeout, Duration::from_secs(5));
        assert_eq!((renderer.width, renderer.height), (1024, 768));
        assert_eq!(renderer.background, "transparent");
    }
}
