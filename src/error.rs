use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FoldError {
    #[error("failed to parse SVG: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("document has no <svg> root element")]
    MissingRoot,
    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = FoldError> = std::result::Result<T, E>;
