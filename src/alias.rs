//! Dotted path aliases such as `application.scripts.backbone`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default root alias, pointing at the project directory.
pub const APPLICATION_ALIAS: &str = "application";

/// Trait describing how path aliases map onto local directories.
pub trait AliasResolver {
  /// Resolve an alias to a local path, or `None` when its root is unknown.
  fn resolve(&self, alias: &str) -> Option<PathBuf>;
}

/// Alias table keyed by root name.
///
/// `root.a.b` resolves to `<root>/a/b`. A bare root name resolves to the root itself.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
  roots: BTreeMap<String, PathBuf>,
}

impl AliasMap {
  /// Create an empty alias table.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a table whose `application` root points at `dir`.
  pub fn with_application_root(dir: impl Into<PathBuf>) -> Self {
    let mut map = Self::new();
    map.set_root(APPLICATION_ALIAS, dir);
    map
  }

  /// Register or replace a root alias.
  pub fn set_root(&mut self, name: impl Into<String>, dir: impl Into<PathBuf>) {
    let name = name.into().trim_matches('.').to_string();
    if name.is_empty() {
      return;
    }
    self.roots.insert(name, dir.into());
  }

  /// Look up a root directory by name.
  pub fn root(&self, name: &str) -> Option<&Path> {
    self.roots.get(name).map(PathBuf::as_path)
  }

  /// Resolve `alias` to a local path.
  pub fn resolve(&self, alias: &str) -> Option<PathBuf> {
    let alias = alias.trim();
    if let Some(root) = self.roots.get(alias) {
      return Some(root.clone());
    }

    let (root_name, rest) = alias.split_once('.')?;
    let mut path = self.roots.get(root_name)?.clone();
    for segment in rest.split('.').filter(|segment| !segment.is_empty()) {
      path.push(segment);
    }
    Some(path)
  }
}

impl AliasResolver for AliasMap {
  fn resolve(&self, alias: &str) -> Option<PathBuf> {
    AliasMap::resolve(self, alias)
  }
}

impl<K, V> FromIterator<(K, V)> for AliasMap
where
  K: Into<String>,
  V: Into<PathBuf>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut map = Self::new();
    for (name, dir) in iter {
      map.set_root(name, dir);
    }
    map
  }
}
