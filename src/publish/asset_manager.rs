//! Filesystem-backed publisher that mirrors sources into hashed directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{debug, info};

use super::DirectoryPublisher;
use super::mirror::{Mirror, install_file};
use crate::asset_paths::join_url;
use crate::error::PublishError;

/// File and directory names skipped when copying a directory.
pub const DEFAULT_EXCLUDE_FILES: [&str; 2] = [".svn", ".gitignore"];

/// Publishes local files under `base_path`, served at `base_url`.
///
/// A directory is published to `base_path/<hash>`, where `<hash>` is the hex CRC-32 of its
/// canonical path, so the same source always maps to the same URL. A single file is published
/// into the hashed directory of its parent.
///
/// The hash ignores content by default: once a directory is published, later edits to the
/// source are not picked up unless [`AssetManager::with_force_copy`] is set, or
/// [`AssetManager::with_hash_by_mtime`] is enabled so a newer source lands under a new URL.
#[derive(Debug, Clone)]
pub struct AssetManager {
  base_path: PathBuf,
  base_url: String,
  force_copy: bool,
  link_assets: bool,
  hash_by_mtime: bool,
  exclude_files: Vec<String>,
}

impl AssetManager {
  /// Create a publisher writing into `base_path`, which is served at `base_url`.
  pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
    Self {
      base_path: base_path.into(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      force_copy: false,
      link_assets: false,
      hash_by_mtime: false,
      exclude_files: DEFAULT_EXCLUDE_FILES.iter().map(|s| s.to_string()).collect(),
    }
  }

  /// Re-mirror directories on every publish instead of only the first time.
  pub fn with_force_copy(mut self, force_copy: bool) -> Self {
    self.force_copy = force_copy;
    self
  }

  /// Publish directories as symbolic links instead of copies (unix only).
  pub fn with_link_assets(mut self, link_assets: bool) -> Self {
    self.link_assets = link_assets;
    self
  }

  /// Include the newest modification time of the source in the hashed directory name.
  ///
  /// For a directory this is the newest time across the directory and its publishable files.
  pub fn with_hash_by_mtime(mut self, hash_by_mtime: bool) -> Self {
    self.hash_by_mtime = hash_by_mtime;
    self
  }

  /// Replace the list of names skipped while copying.
  pub fn with_exclude_files(mut self, names: impl IntoIterator<Item = String>) -> Self {
    self.exclude_files = names.into_iter().collect();
    self
  }

  /// Directory published assets are written to.
  pub fn base_path(&self) -> &Path {
    &self.base_path
  }

  /// Public URL of [`AssetManager::base_path`].
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Local directory a published `path` lives in, if `path` exists.
  pub fn published_path(&self, path: &Path) -> Option<PathBuf> {
    let source = fs::canonicalize(path).ok()?;
    let (hashed, file_name) = self.target_for(&source);
    let target = self.base_path.join(hashed);
    Some(match file_name {
      Some(name) => target.join(name),
      None => target,
    })
  }

  fn target_for(&self, source: &Path) -> (String, Option<PathBuf>) {
    if source.is_file() {
      let parent = source.parent().unwrap_or(source);
      (self.hash_source(parent, source), source.file_name().map(PathBuf::from))
    } else {
      (self.hash_source(source, source), None)
    }
  }

  // `stamped` is the path whose modification time joins the hash; for a file it is the file
  // itself while the name is derived from its parent.
  fn hash_source(&self, path: &Path, stamped: &Path) -> String {
    let mut key = path.to_string_lossy().into_owned();
    let stamp = self.hash_by_mtime.then(|| self.newest_mtime(stamped)).flatten();
    if let Some(nanos) = stamp {
      key.push_str(&format!("@{nanos}"));
    }
    format!("{:x}", crc32fast::hash(key.as_bytes()))
  }

  fn newest_mtime(&self, path: &Path) -> Option<u128> {
    let mut newest = modified_nanos(path)?;
    if path.is_dir() {
      let files = Mirror::new(path, path, &self.exclude_files).source_files().ok()?;
      for relative in files {
        if let Some(nanos) = modified_nanos(&path.join(relative)) {
          newest = newest.max(nanos);
        }
      }
    }
    Some(newest)
  }

  fn url_for(&self, hashed: &str, file_name: Option<&Path>) -> String {
    let url = join_url(&self.base_url, hashed);
    match file_name {
      Some(name) => join_url(&url, &name.to_string_lossy()),
      None => url,
    }
  }

  fn publish_directory(&self, source: &Path, destination: &Path) -> Result<(), PublishError> {
    let exists = destination.exists() || destination.is_symlink();
    if exists && !self.force_copy {
      debug!(destination = %destination.display(), "directory already published");
      return Ok(());
    }

    if self.link_assets && link_directory(source, destination, exists)? {
      return Ok(());
    }

    if destination.is_symlink() {
      fs::remove_file(destination).map_err(io_error(destination))?;
    }
    let installed = Mirror::new(source, destination, &self.exclude_files)
      .sync()
      .map_err(io_error(destination))?;
    debug!(destination = %destination.display(), files = installed, "mirrored directory");
    Ok(())
  }

  fn publish_file(&self, source: &Path, destination: &Path) -> Result<(), PublishError> {
    if destination.exists() && !self.force_copy {
      return Ok(());
    }
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    install_file(source, destination).map_err(io_error(destination))
  }
}

impl DirectoryPublisher for AssetManager {
  fn publish(&self, path: &Path) -> Result<String, PublishError> {
    let source = fs::canonicalize(path).map_err(|err| match err.kind() {
      std::io::ErrorKind::NotFound => PublishError::NotFound {
        path: path.to_path_buf(),
      },
      _ => PublishError::Io {
        path: path.to_path_buf(),
        source: err,
      },
    })?;

    let (hashed, file_name) = self.target_for(&source);
    let destination = self.base_path.join(&hashed);
    match &file_name {
      Some(name) => self.publish_file(&source, &destination.join(name))?,
      None => self.publish_directory(&source, &destination)?,
    }

    let url = self.url_for(&hashed, file_name.as_deref());
    info!(source = %source.display(), %url, "published assets");
    Ok(url)
  }

  fn published_url(&self, path: &Path) -> Option<String> {
    let source = fs::canonicalize(path).ok()?;
    let (hashed, file_name) = self.target_for(&source);
    let mut destination = self.base_path.join(&hashed);
    if let Some(name) = &file_name {
      destination.push(name);
    }
    (destination.exists() || destination.is_symlink())
      .then(|| self.url_for(&hashed, file_name.as_deref()))
  }
}

fn modified_nanos(path: &Path) -> Option<u128> {
  let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
  modified
    .duration_since(UNIX_EPOCH)
    .ok()
    .map(|elapsed| elapsed.as_nanos())
}

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> PublishError + '_ {
  move |source| PublishError::Io {
    path: path.to_path_buf(),
    source,
  }
}

#[cfg(unix)]
fn link_directory(source: &Path, destination: &Path, exists: bool) -> Result<bool, PublishError> {
  if exists {
    if destination.is_symlink() {
      return Ok(true);
    }
    fs::remove_dir_all(destination).map_err(io_error(destination))?;
  }
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).map_err(io_error(parent))?;
  }
  std::os::unix::fs::symlink(source, destination).map_err(io_error(destination))?;
  Ok(true)
}

#[cfg(not(unix))]
fn link_directory(_source: &Path, _destination: &Path, _exists: bool) -> Result<bool, PublishError> {
  Ok(false)
}
