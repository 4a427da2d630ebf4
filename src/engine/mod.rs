//! Inference engines.
//!
//! The actual OCR computation happens outside this crate. Each way of
//! reaching it is an `OcrEngine`:
//!
//! - `CommandEngine`: an operator-supplied executable (`DEEPSEEK_CMD`)
//! - `ScriptEngine`: `infer.py` inside the cloned model repository
//! - `RemoteEngine`: the Hugging Face Inference API, given credentials
//!
//! `resolve` picks one per the deployment contract: an explicit command
//! wins over the repository script, which wins over the hosted API; if
//! none is configured there is no engine, and callers surface that as
//! exit 3 or HTTP 503.

mod backend;
mod command;
pub mod fields;
mod remote;
mod script;

pub use backend::{EngineError, EngineKind, OcrEngine, OcrOutput};
pub use command::CommandEngine;
pub use remote::RemoteEngine;
pub use script::ScriptEngine;

use std::time::Duration;

use crate::config::Settings;

/// Pick the inference engine for the current settings.
pub fn resolve(settings: &Settings) -> Option<Box<dyn OcrEngine>> {
    if let Some(cmd) = &settings.infer_cmd {
        return Some(Box::new(CommandEngine::new(cmd)));
    }

    let script = settings.infer_script();
    if script.exists() {
        return Some(Box::new(ScriptEngine::new(script)));
    }

    // Last resort: hosted inference, when credentials are configured
    if let (Some(model_id), Some(token)) = (&settings.model_id, &settings.hf_token) {
        return Some(Box::new(RemoteEngine::new(
            model_id,
            token,
            Duration::from_secs(settings.infer_timeout),
        )));
    }

    None
}
