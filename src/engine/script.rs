//! Engine backed by the cloned model repository's `infer.py`.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::backend::{run_inference, EngineError, EngineKind, OcrEngine, OcrOutput};
use super::command::check_binary;

/// Inference script inside the cloned model repository, run via python.
pub struct ScriptEngine {
    script: PathBuf,
}

impl ScriptEngine {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl OcrEngine for ScriptEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Script
    }

    fn is_available(&self) -> bool {
        self.script.exists() && check_binary("python")
    }

    fn availability_hint(&self) -> String {
        if !self.script.exists() {
            format!(
                "inference script {} not found (clone the model repository)",
                self.script.display()
            )
        } else if !check_binary("python") {
            "python not found on PATH".to_string()
        } else {
            format!("inference script {} is available", self.script.display())
        }
    }

    fn run(&self, image: &Path) -> Result<OcrOutput, EngineError> {
        if !self.script.exists() {
            return Err(EngineError::NotAvailable(format!(
                "inference script {} not found",
                self.script.display()
            )));
        }

        let mut cmd = Command::new("python");
        cmd.arg(&self.script).arg("--image").arg(image);

        tracing::debug!(script = %self.script.display(), image = %image.display(), "running repository inference script");
        run_inference(cmd, "python")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_script_is_not_available() {
        let engine = ScriptEngine::new("/nonexistent/infer.py");
        assert!(!engine.is_available());
        let err = engine.run(Path::new("somefile.jpg")).unwrap_err();
        assert!(matches!(err, EngineError::NotAvailable(_)));
    }

    #[test]
    fn hint_names_the_missing_script() {
        let engine = ScriptEngine::new("/opt/deepseek/infer.py");
        assert!(engine.availability_hint().contains("/opt/deepseek/infer.py"));
    }
}
