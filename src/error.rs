use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("row tolerance must be a positive, finite number (got {0})")]
    InvalidTolerance(f64),
    #[error("at least one keyword is required")]
    NoKeywords,
    #[error("keyword at position {0} is blank")]
    BlankKeyword(usize),
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),
    #[error("image error")]
    Image(#[from] image::ImageError),
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

pub type Result<T> = std::result::Result<T, Error>;
