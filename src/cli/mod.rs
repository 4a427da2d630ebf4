//! CLI commands implementation.
//!
//! Exit codes are part of the deployment contract:
//! - `1`: no or unknown subcommand (usage printed)
//! - `2`: `infer` called without an image path
//! - `3`: no inference backend configured
//! - otherwise the delegated child's exit status is propagated

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use crate::config::Settings;
use crate::engine::{self, EngineError};
use crate::prepare::{self, PrepareOutcome};
use crate::server;

const EXIT_USAGE: u8 = 1;
const EXIT_MISSING_ARG: u8 = 2;
const EXIT_NO_ENGINE: u8 = 3;

#[derive(Parser)]
#[command(name = "ocrgate")]
#[command(about = "Gateway around an external DeepSeek OCR model")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch model weights from the model hub if credentials are configured
    Prepare,

    /// Run OCR on an image via the configured inference backend
    Infer {
        /// Image file to run inference on
        image: Option<PathBuf>,
    },

    /// Start the HTTP server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 0.0.0.0:$PORT)
        #[arg(long)]
        bind: Option<String>,
    },
}

/// Parse args and dispatch; the returned code is the process exit status.
pub async fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let settings = Settings::from_env();
    ExitCode::from(dispatch(cli.command, &settings).await)
}

async fn dispatch(command: Option<Commands>, settings: &Settings) -> u8 {
    match command {
        None => {
            let _ = Cli::command().print_help();
            EXIT_USAGE
        }
        Some(Commands::Prepare) => cmd_prepare(settings).await,
        Some(Commands::Infer { image }) => {
            // The remote engine does blocking I/O; keep it off the
            // async worker thread
            let settings = settings.clone();
            tokio::task::spawn_blocking(move || cmd_infer(&settings, image.as_deref()))
                .await
                .unwrap_or(1)
        }
        Some(Commands::Serve { bind }) => cmd_serve(settings, bind.as_deref()).await,
    }
}

/// Fetch model weights. Never fails the container start: every outcome
/// maps to exit 0, the distinction lives in the output.
async fn cmd_prepare(settings: &Settings) -> u8 {
    match prepare::prepare(settings).await {
        PrepareOutcome::Completed => {
            println!("model weights ready at {}", settings.weights_path().display());
        }
        PrepareOutcome::Skipped(reason) => {
            println!("prepare skipped: {reason}");
        }
        PrepareOutcome::Failed(e) => {
            println!("prepare failed (continuing anyway): {e:#}");
            tracing::warn!(error = %e, "model weight download failed");
        }
    }
    0
}

fn cmd_infer(settings: &Settings, image: Option<&Path>) -> u8 {
    let Some(image) = image else {
        eprintln!("usage: ocrgate infer <image>");
        return EXIT_MISSING_ARG;
    };

    let Some(engine) = engine::resolve(settings) else {
        eprintln!(
            "no inference backend found: set DEEPSEEK_CMD, clone the model repository into {}, \
             or set HF_TOKEN and DEEPSEEK_MODEL",
            settings.model_dir.display()
        );
        return EXIT_NO_ENGINE;
    };

    match engine.run(image) {
        Ok(output) => {
            tracing::info!(
                backend = engine.kind().as_str(),
                elapsed_ms = output.elapsed_ms,
                "inference complete"
            );
            println!("{}", output.text);
            0
        }
        Err(EngineError::NotAvailable(hint)) => {
            eprintln!("{hint}");
            EXIT_NO_ENGINE
        }
        Err(EngineError::Failed { status, stderr }) => {
            if !stderr.is_empty() {
                eprint!("{stderr}");
            }
            // Propagate the child's exit status
            status
                .and_then(|s| u8::try_from(s).ok())
                .unwrap_or(1)
        }
        Err(EngineError::Io(e)) => {
            eprintln!("inference failed: {e}");
            1
        }
    }
}

async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> u8 {
    let addr = match bind {
        Some(bind) => parse_bind(bind, settings.port),
        None => format!("0.0.0.0:{}", settings.port),
    };

    match server::serve(settings, &addr).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("server error: {e:#}");
            1
        }
    }
}

/// Interpret a bind argument as PORT, HOST, or HOST:PORT.
fn parse_bind(bind: &str, default_port: u16) -> String {
    if bind.contains(':') {
        bind.to_string()
    } else if bind.chars().all(|c| c.is_ascii_digit()) {
        format!("0.0.0.0:{bind}")
    } else {
        format!("{bind}:{default_port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_settings(dir: &Path) -> Settings {
        Settings {
            model_dir: dir.to_path_buf(),
            ..Settings::default()
        }
    }

    #[test]
    fn infer_without_image_exits_2() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cmd_infer(&bare_settings(dir.path()), None), EXIT_MISSING_ARG);
    }

    #[test]
    fn infer_without_any_backend_exits_3() {
        let dir = tempfile::tempdir().unwrap();
        let code = cmd_infer(&bare_settings(dir.path()), Some(Path::new("somefile.jpg")));
        assert_eq!(code, EXIT_NO_ENGINE);
    }

    #[test]
    fn infer_delegates_blindly_to_configured_command() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            infer_cmd: Some("true".to_string()),
            ..bare_settings(dir.path())
        };
        // The image does not exist; the child decides what that means
        assert_eq!(cmd_infer(&settings, Some(Path::new("somefile.jpg"))), 0);
    }

    #[test]
    fn infer_propagates_child_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            infer_cmd: Some("false".to_string()),
            ..bare_settings(dir.path())
        };
        assert_eq!(cmd_infer(&settings, Some(Path::new("somefile.jpg"))), 1);
    }

    #[tokio::test]
    async fn prepare_always_exits_0() {
        let settings = Settings {
            model_dir: PathBuf::from("/nonexistent/deepseek"),
            hf_token: Some("hf_token".to_string()),
            model_id: Some("deepseek-ai/DeepSeek-OCR".to_string()),
            ..Settings::default()
        };
        assert_eq!(cmd_prepare(&settings).await, 0);
    }

    #[test]
    fn bind_argument_forms() {
        assert_eq!(parse_bind("8080", 5000), "0.0.0.0:8080");
        assert_eq!(parse_bind("0.0.0.0:9000", 5000), "0.0.0.0:9000");
        assert_eq!(parse_bind("localhost", 5000), "localhost:5000");
    }

    #[tokio::test]
    async fn no_subcommand_exits_1() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["ocrgate"]).unwrap();
        assert_eq!(dispatch(cli.command, &bare_settings(dir.path())).await, EXIT_USAGE);
    }

    #[tokio::test]
    async fn infer_dispatch_propagates_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            infer_cmd: Some("false".to_string()),
            ..bare_settings(dir.path())
        };
        let cli = Cli::try_parse_from(["ocrgate", "infer", "somefile.jpg"]).unwrap();
        assert_eq!(dispatch(cli.command, &settings).await, 1);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["ocrgate", "infer", "label.png"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Infer { image: Some(_) })
        ));

        let cli = Cli::try_parse_from(["ocrgate", "prepare"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Prepare)));

        let cli = Cli::try_parse_from(["ocrgate"]).unwrap();
        assert!(cli.command.is_none());
    }
}
