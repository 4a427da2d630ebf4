//! Model weight preparation.
//!
//! `prepare` runs once at container start. It fetches a single weights
//! file from the Hugging Face hub when a token and model id are both
//! configured, and deliberately never fails the process: a failed or
//! skipped download leaves the container to run with whatever inference
//! backend is otherwise available. The outcome is explicit in the return
//! type so callers and logs can still tell the cases apart.

use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::{Settings, WEIGHTS_FILENAME};

/// What a `prepare` invocation actually did.
#[derive(Debug)]
pub enum PrepareOutcome {
    /// Weights are on disk, downloaded now or already present.
    Completed,
    /// Preconditions unmet; nothing was attempted.
    Skipped(String),
    /// A download was attempted and failed.
    Failed(anyhow::Error),
}

/// Ensure model weights are present if the deployment is configured for it.
pub async fn prepare(settings: &Settings) -> PrepareOutcome {
    if !settings.model_dir.exists() {
        return PrepareOutcome::Skipped(format!(
            "model directory {} does not exist",
            settings.model_dir.display()
        ));
    }

    let (token, model_id) = match (&settings.hf_token, &settings.model_id) {
        (Some(token), Some(model_id)) => (token, model_id),
        _ => {
            return PrepareOutcome::Skipped(
                "HF_TOKEN and DEEPSEEK_MODEL are not both set".to_string(),
            )
        }
    };

    let dest = settings.weights_path();
    if dest.exists() {
        return PrepareOutcome::Completed;
    }

    match download_weights(model_id, token, &dest).await {
        Ok(()) => PrepareOutcome::Completed,
        Err(e) => {
            // Don't leave a truncated weights file behind
            let _ = std::fs::remove_file(&dest);
            PrepareOutcome::Failed(e)
        }
    }
}

/// Stream the weights file from the model hub to disk.
async fn download_weights(model_id: &str, token: &str, dest: &Path) -> anyhow::Result<()> {
    let url = format!("https://huggingface.co/{model_id}/resolve/main/{WEIGHTS_FILENAME}");
    tracing::info!(%url, dest = %dest.display(), "downloading model weights");

    let client = reqwest::Client::builder().build()?;
    let response = client
        .get(&url)
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?;

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    tracing::info!(dest = %dest.display(), "model weights downloaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(model_dir: PathBuf, token: Option<&str>, model: Option<&str>) -> Settings {
        Settings {
            model_dir,
            hf_token: token.map(String::from),
            model_id: model.map(String::from),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn skips_when_model_dir_is_absent() {
        // Token and model are set, but the directory check comes first:
        // no download is attempted
        let s = settings(
            PathBuf::from("/nonexistent/deepseek"),
            Some("hf_token"),
            Some("deepseek-ai/DeepSeek-OCR"),
        );
        match prepare(&s).await {
            PrepareOutcome::Skipped(reason) => assert!(reason.contains("/nonexistent/deepseek")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn skips_when_credentials_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path().to_path_buf(), None, Some("deepseek-ai/DeepSeek-OCR"));
        assert!(matches!(prepare(&s).await, PrepareOutcome::Skipped(_)));

        let s = settings(dir.path().to_path_buf(), Some("hf_token"), None);
        assert!(matches!(prepare(&s).await, PrepareOutcome::Skipped(_)));
    }

    #[tokio::test]
    async fn completes_without_network_when_weights_exist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WEIGHTS_FILENAME), b"weights").unwrap();

        let s = settings(
            dir.path().to_path_buf(),
            Some("hf_token"),
            Some("deepseek-ai/DeepSeek-OCR"),
        );
        assert!(matches!(prepare(&s).await, PrepareOutcome::Completed));
    }
}
