//! Error types surfaced by the registrar and its collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the registrar entry points.
pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Invalid or incomplete configuration detected while registering the application.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  /// `app` was empty when `start()` ran.
  #[error("bootstrap filename required: `app` should name a file in {app_directory_alias}")]
  MissingAppFile {
    /// Alias of the directory the file is expected in.
    app_directory_alias: String,
  },

  /// The application directory alias did not resolve to a local path.
  #[error("unknown path alias `{alias}`")]
  UnknownAlias {
    /// Alias that failed to resolve.
    alias: String,
  },

  /// The application directory has no published URL yet.
  #[error("application directory {} has not been published", path.display())]
  Unpublished {
    /// Local directory that was expected to be published.
    path: PathBuf,
  },

  /// A configuration value could not be encoded as JSON.
  #[error("failed to encode {what} as JSON")]
  Encode {
    /// Which value failed to encode.
    what: &'static str,
    /// Underlying encoder error.
    #[source]
    source: serde_json::Error,
  },
}

/// Failures reported by a [`crate::DirectoryPublisher`].
#[derive(Debug, Error)]
pub enum PublishError {
  /// The directory or file to publish does not exist.
  #[error("asset source {} does not exist", path.display())]
  NotFound {
    /// Missing path.
    path: PathBuf,
  },

  /// Filesystem failure while copying or linking.
  #[error("failed to publish {}", path.display())]
  Io {
    /// Path being processed when the failure happened.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
}

/// Top-level error returned by [`crate::BootstrapRegistrar`].
#[derive(Debug, Error)]
pub enum BootstrapError {
  /// The configuration was rejected.
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  /// The publisher failed; passed through unchanged.
  #[error(transparent)]
  Publishing(#[from] PublishError),
}

impl BootstrapError {
  /// Returns `true` for configuration failures.
  pub fn is_configuration(&self) -> bool {
    matches!(self, Self::Configuration(_))
  }
}
