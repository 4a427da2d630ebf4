//! Engine backed by the Hugging Face Inference API.
//!
//! Last-resort fallback when neither an external command nor the cloned
//! repository script is configured: POST the raw image bytes to the hosted
//! inference endpoint for the configured model, authorized with the hub
//! token. Network and HTTP failures surface as `Failed`, carrying the
//! HTTP status where one was received.

use std::path::Path;
use std::time::{Duration, Instant};

use super::backend::{EngineError, EngineKind, OcrEngine, OcrOutput};

const INFERENCE_API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Hosted inference via the model hub's API.
pub struct RemoteEngine {
    model_id: String,
    token: String,
    timeout: Duration,
}

impl RemoteEngine {
    pub fn new(model_id: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model_id: model_id.into(),
            token: token.into(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{INFERENCE_API_BASE}/{}", self.model_id)
    }
}

/// The hosted API answers with a JSON list of `{"text": ...}` parts, a
/// keyed object, or plain text. Join the list form here; keyed objects
/// go through the same stdout probing the subprocess engines use.
fn extract_response_text(body: &str) -> String {
    if let Ok(serde_json::Value::Array(parts)) = serde_json::from_str(body.trim()) {
        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();
        if !texts.is_empty() {
            return texts.join("\n");
        }
    }
    body.trim().to_string()
}

impl OcrEngine for RemoteEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Remote
    }

    fn is_available(&self) -> bool {
        // Reachability is only known once a request is made
        true
    }

    fn availability_hint(&self) -> String {
        format!(
            "remote inference for '{}' via the Hugging Face Inference API",
            self.model_id
        )
    }

    fn run(&self, image: &Path) -> Result<OcrOutput, EngineError> {
        let start = Instant::now();
        let bytes = std::fs::read(image)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| EngineError::Failed {
                status: None,
                stderr: e.to_string(),
            })?;

        tracing::debug!(model = %self.model_id, image = %image.display(), "calling hosted inference");
        let response = client
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .body(bytes)
            .send()
            .map_err(|e| EngineError::Failed {
                status: None,
                stderr: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| EngineError::Failed {
            status: Some(status.as_u16() as i32),
            stderr: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(EngineError::Failed {
                status: Some(status.as_u16() as i32),
                stderr: body,
            });
        }

        let text = extract_response_text(&body);
        Ok(OcrOutput::from_stdout(
            &text,
            start.elapsed().as_millis() as u64,
        ))
    }
}
