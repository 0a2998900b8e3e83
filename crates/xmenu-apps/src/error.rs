//! Error types for xmenu-apps

use std::path::PathBuf;

/// Errors raised while reading descriptors or maintaining the icon cache.
#[derive(Debug, thiserror::Error)]
pub enum AppsError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to convert {source_path}: {reason}")]
    Conversion { source_path: PathBuf, reason: String },
}

impl AppsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppsError>;
