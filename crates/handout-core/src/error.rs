use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("unknown share id")]
    UnknownId,

    #[error("shared file no longer exists: {}", .0.display())]
    FileVanished(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
