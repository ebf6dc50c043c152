//! Batch driver: a directory of prescription photos in, one report per
//! image out. OCR and structuring run on blocking worker threads.

pub mod types;
pub mod runner;
pub mod render;

pub use types::*;
pub use runner::*;
pub use render::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker pool closed: {0}")]
    PoolClosed(#[from] tokio::sync::AcquireError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}
