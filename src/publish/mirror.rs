//! Mirrors a source tree into its publish directory.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use same_file::is_same_file;

/// A source directory, its publish destination and the names skipped on both sides.
pub(super) struct Mirror<'a> {
  source: &'a Path,
  destination: &'a Path,
  excluded: &'a [String],
}

/// Files and directories found under a root, relative to it.
#[derive(Debug, Default)]
struct TreeListing {
  files: BTreeSet<PathBuf>,
  dirs: BTreeSet<PathBuf>,
}

impl<'a> Mirror<'a> {
  pub(super) fn new(source: &'a Path, destination: &'a Path, excluded: &'a [String]) -> Self {
    Self {
      source,
      destination,
      excluded,
    }
  }

  /// Publishable files under the source, relative to it.
  pub(super) fn source_files(&self) -> std::io::Result<BTreeSet<PathBuf>> {
    Ok(self.list(self.source, true)?.files)
  }

  /// Bring the destination in line with the source and return the number of files installed.
  ///
  /// Destination files with no publishable counterpart are removed, excluded names included,
  /// followed by any directory left empty.
  pub(super) fn sync(&self) -> std::io::Result<usize> {
    let wanted = self.source_files()?;
    fs::create_dir_all(self.destination)?;
    self.prune(&wanted)?;

    for relative in &wanted {
      let target = self.destination.join(relative);
      if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
      }
      install_file(&self.source.join(relative), &target)?;
    }
    Ok(wanted.len())
  }

  fn prune(&self, wanted: &BTreeSet<PathBuf>) -> std::io::Result<()> {
    let existing = self.list(self.destination, false)?;
    for stale in existing.files.difference(wanted) {
      remove_if_present(&self.destination.join(stale), false)?;
    }

    // Deepest first, so a parent is only checked after its children are gone.
    for dir in existing.dirs.iter().rev() {
      let path = self.destination.join(dir);
      if fs::read_dir(&path)?.next().is_none() {
        remove_if_present(&path, true)?;
      }
    }
    Ok(())
  }

  fn list(&self, root: &Path, skip_excluded: bool) -> std::io::Result<TreeListing> {
    let mut listing = TreeListing::default();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative) = pending.pop() {
      for entry in fs::read_dir(root.join(&relative))? {
        let entry = entry?;
        let name = entry.file_name();
        if skip_excluded && self.is_excluded(name.to_str()) {
          continue;
        }

        let child = relative.join(&name);
        let metadata = fs::metadata(entry.path())?;
        if metadata.is_dir() {
          listing.dirs.insert(child.clone());
          pending.push(child);
        } else if metadata.is_file() {
          listing.files.insert(child);
        }
      }
    }
    Ok(listing)
  }

  fn is_excluded(&self, name: Option<&str>) -> bool {
    name.is_some_and(|name| self.excluded.iter().any(|excluded| excluded == name))
  }
}

fn remove_if_present(path: &Path, dir: bool) -> std::io::Result<()> {
  let result = if dir {
    fs::remove_dir(path)
  } else {
    fs::remove_file(path)
  };
  match result {
    Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
    other => other,
  }
}

/// Place `source` at `destination`, reusing an existing link to the same file.
///
/// A hard link is tried first, falling back to a copy across filesystems.
pub(super) fn install_file(source: &Path, destination: &Path) -> std::io::Result<()> {
  if destination.exists() {
    if is_same_file(source, destination)? {
      return Ok(());
    }
    fs::remove_file(destination)?;
  }

  match fs::hard_link(source, destination) {
    Ok(()) => Ok(()),
    Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
    Err(_) => fs::copy(source, destination).map(|_| ()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn excluded() -> Vec<String> {
    vec![".svn".to_string(), ".gitignore".to_string()]
  }

  #[test]
  fn source_files_skip_excluded_names() -> std::io::Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    fs::create_dir_all(root.join("lib/.svn"))?;
    fs::write(root.join("lib/.svn/entries"), b"x")?;
    fs::write(root.join("lib/jquery.js"), b"x")?;
    fs::write(root.join(".gitignore"), b"x")?;
    fs::write(root.join("App.js"), b"x")?;

    let names = excluded();
    let files: Vec<PathBuf> = Mirror::new(root, root, &names)
      .source_files()?
      .into_iter()
      .collect();
    assert_eq!(files, vec![PathBuf::from("App.js"), PathBuf::from("lib/jquery.js")]);
    Ok(())
  }

  #[test]
  fn sync_removes_stale_and_excluded_destination_entries() -> std::io::Result<()> {
    let temp = tempdir()?;
    let source = temp.path().join("app");
    let destination = temp.path().join("published");

    fs::create_dir_all(source.join("js/lib"))?;
    fs::write(source.join("js/lib/keep.js"), b"keep")?;
    fs::write(source.join(".gitignore"), b"*.tmp")?;

    fs::create_dir_all(destination.join("js/tmp"))?;
    fs::write(destination.join("js/tmp/unused.js"), b"unused")?;
    fs::create_dir_all(destination.join(".svn"))?;
    fs::write(destination.join(".svn/entries"), b"old")?;
    fs::write(destination.join(".gitignore"), b"old")?;

    let names = excluded();
    let installed = Mirror::new(&source, &destination, &names).sync()?;

    assert_eq!(installed, 1);
    assert!(destination.join("js/lib/keep.js").exists());
    assert!(!destination.join("js/tmp").exists());
    assert!(!destination.join(".svn").exists());
    assert!(!destination.join(".gitignore").exists());
    assert!(destination.exists());
    Ok(())
  }

  #[test]
  fn install_file_reuses_existing_links() -> std::io::Result<()> {
    let temp = tempdir()?;
    let source = temp.path().join("App.js");
    fs::write(&source, b"require([]);")?;
    let destination = temp.path().join("App.copy.js");

    install_file(&source, &destination)?;
    assert!(is_same_file(&source, &destination)?);

    install_file(&source, &destination)?;
    assert!(is_same_file(&source, &destination)?);
    Ok(())
  }

  #[test]
  fn install_file_replaces_stale_destination() -> std::io::Result<()> {
    let temp = tempdir()?;
    let source = temp.path().join("App.js");
    fs::write(&source, b"new")?;
    let destination = temp.path().join("published.js");
    fs::write(&destination, b"old")?;

    install_file(&source, &destination)?;
    assert_eq!(fs::read(&destination)?, b"new");
    Ok(())
  }
}
