//! Configuration for the gateway.
//!
//! The external interface of this system is environment variables only,
//! so settings are read from the environment once and turned into an
//! explicit `Settings` value with defaults applied at construction time.
//! Nothing downstream reads the environment directly.

use std::path::PathBuf;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default location of the cloned model repository.
pub const DEFAULT_MODEL_DIR: &str = "/opt/deepseek";

/// Default per-request inference timeout in seconds.
pub const DEFAULT_INFER_TIMEOUT_SECS: u64 = 120;

/// Default directory for uploaded images.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// The single weights file `prepare` fetches from the model hub.
pub const WEIGHTS_FILENAME: &str = "model.safetensors";

/// Name of the inference entry point inside the model repository.
pub const INFER_SCRIPT_NAME: &str = "infer.py";

/// Runtime settings, sourced from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Port the HTTP server binds.
    pub port: u16,
    /// Location of the cloned model repository.
    pub model_dir: PathBuf,
    /// Credential for model-weight downloads.
    pub hf_token: Option<String>,
    /// Model hub identifier of the weights to download.
    pub model_id: Option<String>,
    /// External inference executable; takes priority over `infer.py`.
    pub infer_cmd: Option<String>,
    /// Per-request inference timeout in seconds.
    pub infer_timeout: u64,
    /// Directory uploaded images are written to.
    pub upload_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            hf_token: None,
            model_id: None,
            infer_cmd: None,
            infer_timeout: DEFAULT_INFER_TIMEOUT_SECS,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

impl Settings {
    /// Build settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary lookup function.
    ///
    /// Empty and whitespace-only values count as unset, matching how the
    /// deployment treats blank environment variables. Unparseable numbers
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            port: get("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            model_dir: get("DEEPSEEK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR)),
            hf_token: get("HF_TOKEN"),
            model_id: get("DEEPSEEK_MODEL"),
            infer_cmd: get("DEEPSEEK_CMD"),
            infer_timeout: get("DEEPSEEK_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INFER_TIMEOUT_SECS),
            upload_dir: get("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
        }
    }

    /// Path of the inference script inside the model repository.
    pub fn infer_script(&self) -> PathBuf {
        self.model_dir.join(INFER_SCRIPT_NAME)
    }

    /// Path the weights file is downloaded to.
    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join(WEIGHTS_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_with_empty_environment() {
        let settings = settings_from(&[]);
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.model_dir, PathBuf::from("/opt/deepseek"));
        assert_eq!(settings.hf_token, None);
        assert_eq!(settings.model_id, None);
        assert_eq!(settings.infer_cmd, None);
        assert_eq!(settings.infer_timeout, 120);
        assert_eq!(settings.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let settings = settings_from(&[("HF_TOKEN", "  "), ("DEEPSEEK_CMD", "")]);
        assert_eq!(settings.hf_token, None);
        assert_eq!(settings.infer_cmd, None);
    }

    #[test]
    fn values_are_trimmed() {
        let settings = settings_from(&[("DEEPSEEK_MODEL", " deepseek-ai/DeepSeek-OCR ")]);
        assert_eq!(settings.model_id.as_deref(), Some("deepseek-ai/DeepSeek-OCR"));
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let settings = settings_from(&[("PORT", "not-a-port"), ("DEEPSEEK_TIMEOUT", "soon")]);
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.infer_timeout, 120);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let settings = settings_from(&[
            ("PORT", "8080"),
            ("DEEPSEEK_DIR", "/srv/models/deepseek"),
            ("DEEPSEEK_TIMEOUT", "30"),
        ]);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.infer_script(), PathBuf::from("/srv/models/deepseek/infer.py"));
        assert_eq!(
            settings.weights_path(),
            PathBuf::from("/srv/models/deepseek/model.safetensors")
        );
        assert_eq!(settings.infer_timeout, 30);
    }
}
