//! Engine backed by an operator-supplied executable.
//!
//! `DEEPSEEK_CMD` may carry flags (e.g. `deepseek-infer --model /models/ds`);
//! the value is whitespace-split into argv and the image path is appended
//! behind a fixed `--image` flag.

use std::path::Path;
use std::process::Command;

use super::backend::{run_inference, EngineError, EngineKind, OcrEngine, OcrOutput};

/// External inference executable configured via `DEEPSEEK_CMD`.
pub struct CommandEngine {
    argv: Vec<String>,
}

impl CommandEngine {
    pub fn new(cmd: &str) -> Self {
        Self {
            argv: cmd.split_whitespace().map(String::from).collect(),
        }
    }

    fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }
}

/// Check if a binary is available in PATH.
pub(super) fn check_binary(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

impl OcrEngine for CommandEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Command
    }

    fn is_available(&self) -> bool {
        let program = self.program();
        if program.is_empty() {
            return false;
        }
        // PATH lookup first, then a direct path
        check_binary(program) || Path::new(program).exists()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            format!("external command '{}' is available", self.program())
        } else {
            format!(
                "external command '{}' not found on PATH or disk",
                self.program()
            )
        }
    }

    fn run(&self, image: &Path) -> Result<OcrOutput, EngineError> {
        let program = self.program();
        if program.is_empty() {
            return Err(EngineError::NotAvailable(
                "DEEPSEEK_CMD is set but empty".to_string(),
            ));
        }

        let mut cmd = Command::new(program);
        cmd.args(&self.argv[1..]).arg("--image").arg(image);

        tracing::debug!(command = %self.argv.join(" "), image = %image.display(), "running external inference command");
        run_inference(cmd, program)
    }
}
