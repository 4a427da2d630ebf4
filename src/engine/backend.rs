//! Engine trait, output, and error types.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use thiserror::Error;

/// Which kind of engine produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Operator-supplied executable (`DEEPSEEK_CMD`).
    Command,
    /// `infer.py` inside the cloned model repository.
    Script,
    /// Hosted inference via the Hugging Face Inference API.
    Remote,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Command => "command",
            EngineKind::Script => "script",
            EngineKind::Remote => "remote",
        }
    }
}

/// Errors from delegating to an inference process.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configured executable or script cannot be found.
    #[error("{0}")]
    NotAvailable(String),
    /// The process ran and exited non-zero.
    #[error("inference process failed with status {status:?}")]
    Failed {
        status: Option<i32>,
        stderr: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of one inference run.
#[derive(Debug, Clone)]
pub struct OcrOutput {
    /// Extracted text as reported by the inference process.
    pub text: String,
    /// Trimmed non-empty lines of `text`.
    pub lines: Vec<String>,
    pub elapsed_ms: u64,
}

impl OcrOutput {
    pub(crate) fn from_stdout(stdout: &str, elapsed_ms: u64) -> Self {
        let text = extract_text(stdout);
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Self {
            text,
            lines,
            elapsed_ms,
        }
    }
}

/// Some inference scripts emit JSON rather than plain text; probe the
/// common result keys before falling back to raw stdout.
fn extract_text(stdout: &str) -> String {
    let trimmed = stdout.trim();
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        for key in ["text", "ocr_text", "result", "pred", "output"] {
            if let Some(value) = map.get(key) {
                return match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
            }
        }
    }
    trimmed.to_string()
}

/// A way of running OCR inference on an image.
pub trait OcrEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Whether the underlying executable or script can be found right now.
    fn is_available(&self) -> bool;

    /// Human-readable availability status for diagnostics.
    fn availability_hint(&self) -> String;

    /// Run inference on an image, blocking until the process exits.
    fn run(&self, image: &Path) -> Result<OcrOutput, EngineError>;
}

/// Run a prepared inference command and collect its output.
pub(super) fn run_inference(mut cmd: Command, program: &str) -> Result<OcrOutput, EngineError> {
    let start = Instant::now();

    match cmd.output() {
        Ok(output) if output.status.success() => Ok(OcrOutput::from_stdout(
            &String::from_utf8_lossy(&output.stdout),
            start.elapsed().as_millis() as u64,
        )),
        Ok(output) => Err(EngineError::Failed {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(EngineError::NotAvailable(
            format!("{} not found", program),
        )),
        Err(e) => Err(EngineError::Io(e)),
    }
}
