//! HTTP request handlers for the web server.

use std::path::PathBuf;
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::engine::{fields, EngineError};

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Report which inference backend is configured and whether it can run.
pub async fn api_status(State(state): State<AppState>) -> impl IntoResponse {
    let (engine, available, hint) = match &state.engine {
        Some(engine) => (
            engine.kind().as_str(),
            engine.is_available(),
            engine.availability_hint(),
        ),
        None => (
            "none",
            false,
            "set DEEPSEEK_CMD, clone the model repository, or set HF_TOKEN and DEEPSEEK_MODEL"
                .to_string(),
        ),
    };

    Json(json!({
        "engine": engine,
        "available": available,
        "hint": hint,
        "model_dir": state.settings.model_dir.display().to_string(),
    }))
}

/// Accept an image upload, run inference, return text and label fields.
pub async fn ocr_image(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let Some(engine) = state.engine.clone() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "no inference backend configured",
        );
    };

    let image_path = match save_upload(&state, &mut multipart).await {
        Ok(path) => path,
        Err(response) => return response,
    };

    // The child is not killed when this timeout fires; the serving layer
    // only abandons the request
    let timeout = Duration::from_secs(state.settings.infer_timeout);
    let task = tokio::task::spawn_blocking(move || engine.run(&image_path));
    let result = match tokio::time::timeout(timeout, task).await {
        Err(_) => {
            return error_response(StatusCode::GATEWAY_TIMEOUT, "inference timed out");
        }
        Ok(Err(join_error)) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &join_error.to_string());
        }
        Ok(Ok(result)) => result,
    };

    match result {
        Ok(output) => {
            let fields = fields::classify_lines(&output.lines);
            Json(json!({
                "text": output.text,
                "lines": output.lines,
                "fields": fields,
                "elapsed_ms": output.elapsed_ms,
            }))
            .into_response()
        }
        Err(EngineError::NotAvailable(hint)) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, &hint)
        }
        Err(e @ EngineError::Failed { .. }) => {
            tracing::warn!(error = %e, "inference process failed");
            error_response(StatusCode::BAD_GATEWAY, &e.to_string())
        }
        Err(EngineError::Io(e)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Pull the `image` part out of the multipart body and persist it under
/// the upload directory.
async fn save_upload(state: &AppState, multipart: &mut Multipart) -> Result<PathBuf, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "missing 'image' field in multipart body",
                ));
            }
            Err(e) => {
                return Err(error_response(StatusCode::BAD_REQUEST, &e.to_string()));
            }
        };

        if field.name() != Some("image") {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or("upload.bin"));
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(error_response(StatusCode::BAD_REQUEST, &e.to_string())),
        };
        if bytes.is_empty() {
            return Err(error_response(StatusCode::BAD_REQUEST, "empty upload"));
        }

        let path = state.settings.upload_dir.join(filename);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("failed to store upload: {e}"),
            ));
        }

        tracing::info!(path = %path.display(), size = bytes.len(), "stored uploaded image");
        return Ok(path);
    }
}

/// Reduce a client-supplied filename to a safe relative name.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(&['.', '_'][..]).to_string();

    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("label.png"), "label.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_filename(""), "upload.bin");
        assert_eq!(sanitize_filename("..."), "upload.bin");
    }
}
