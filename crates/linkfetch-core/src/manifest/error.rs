//! Manifest read/format errors.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("{}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("line {line}: expected `<link> <file name>`, got {content:?}")]
    Format { line: usize, content: String },
}

pub type Result<T> = std::result::Result<T, ManifestError>;
