use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Destination {} already exists (while copying {}); refusing to overwrite",
        destination.display(),
        origin.display()
    )]
    Collision { origin: PathBuf, destination: PathBuf },

    #[error("Invalid sidecar {}: {reason}", path.display())]
    Sidecar { path: PathBuf, reason: String },
}

impl CombineError {
    /// Adapter for `map_err` that attaches the path an IO error happened at.
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io { path, source }
    }
}
