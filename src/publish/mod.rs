//! Publishing local directories to a web-servable location.

mod asset_manager;
mod mirror;

use std::path::Path;

use crate::error::PublishError;

pub use asset_manager::{AssetManager, DEFAULT_EXCLUDE_FILES};

/// Makes local files reachable under a public URL.
pub trait DirectoryPublisher {
  /// Publish `path` and return its public base URL.
  ///
  /// Publishing the same path again must return the same URL without duplicating files.
  fn publish(&self, path: &Path) -> Result<String, PublishError>;

  /// Public URL of a previously published `path`, or `None` if it has not been published.
  fn published_url(&self, path: &Path) -> Option<String>;
}

impl<T: DirectoryPublisher + ?Sized> DirectoryPublisher for &T {
  fn publish(&self, path: &Path) -> Result<String, PublishError> {
    (**self).publish(path)
  }

  fn published_url(&self, path: &Path) -> Option<String> {
    (**self).published_url(path)
  }
}
