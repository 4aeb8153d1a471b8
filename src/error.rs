use thiserror::Error;

/// Errors raised by a static-asset storage backend
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Path does not exist in the storage
    #[error("Static path not found: {0}")]
    NotFound(String),

    /// Path escapes the storage root or is otherwise unusable
    #[error("Invalid static path: {0}")]
    InvalidPath(String),

    /// Filesystem error while reading the storage
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Manifest file is missing or malformed
    #[error("Manifest error: {0}")]
    Manifest(String),
}

impl StorageError {
    /// Map a `std::io::Error` for `path`, keeping "not found" distinguishable.
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path)
        } else {
            StorageError::Io {
                path,
                message: err.to_string(),
            }
        }
    }
}

/// Errors detected while resolving the deployment settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Production profile without a secret key
    #[error("SECRET_KEY must be set when running in production")]
    MissingSecretKey,

    /// DATABASE_URL could not be parsed
    #[error("Invalid DATABASE_URL: {0}")]
    InvalidDatabaseUrl(String),

    /// DATABASE_URL uses a scheme we cannot serve
    #[error("Unsupported database scheme '{0}' (expected postgres or postgresql)")]
    UnsupportedDatabase(String),

    /// Production profile with nothing to accept in the Host header
    #[error("ALLOWED_HOSTS is empty; set ALLOWED_HOSTS or RENDER_EXTERNAL_HOSTNAME")]
    NoAllowedHosts,

    /// Static URL must be an absolute, non-root path prefix
    #[error("STATIC_URL must start and end with '/' and not be '/', got '{0}'")]
    InvalidStaticUrl(String),

    /// Unknown static storage backend name
    #[error("Unknown static backend '{0}' (expected plain, compressed or manifest)")]
    UnknownStaticBackend(String),
}

/// Errors produced by the collectstatic command
#[derive(Debug, Error)]
pub enum CollectError {
    /// Source directory listed in the settings does not exist
    #[error("Static source directory not found: {0}")]
    MissingSource(String),

    /// Filesystem error while copying
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be serialized
    #[error("Failed to write manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
