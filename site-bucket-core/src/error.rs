//! Error types shared by the provisioning and synchronisation pipelines.

use std::path::PathBuf;

/// A failure reported by the remote storage service.
///
/// `code` carries the provider's raw error code (e.g. `AccessDenied`) when the
/// service returned one; transport failures and the like leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed ({}): {message}", .code.as_deref().unwrap_or("no error code"))]
pub struct RemoteServiceError {
    /// Storage operation that failed, e.g. `put_object`.
    pub operation: &'static str,
    pub code: Option<String>,
    pub message: String,
}

impl RemoteServiceError {
    pub fn new(
        operation: &'static str,
        code: Option<impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            code: code.map(Into::into),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("path does not exist: {}", .path.display())]
    PathNotFound { path: PathBuf },

    #[error("sync root is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("path is not valid UTF-8 and cannot be used as an object key: {}", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("{} is not under sync root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Remote(#[from] RemoteServiceError),
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SiteError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = SiteError> = std::result::Result<T, E>;
