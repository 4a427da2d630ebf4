//! ocrgate - HTTP and CLI gateway around an external DeepSeek OCR model.
//!
//! The model itself lives outside this crate: either an operator-supplied
//! executable (`DEEPSEEK_CMD`) or the `infer.py` entry point of a cloned
//! model repository (`DEEPSEEK_DIR`). This crate owns configuration,
//! dispatch, subprocess delegation, and the HTTP surface.

pub mod cli;
pub mod config;
pub mod engine;
pub mod prepare;
pub mod server;
