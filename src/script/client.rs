//! In-memory script registry that renders registered scripts into HTML.

use tracing::debug;

use super::render::{render_file, render_inline, render_listener};
use super::{ScriptAttributes, ScriptPosition, ScriptRegistry};

/// One registered script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEntry {
  /// Inline code identified by a logical key.
  Inline {
    /// Logical key used for deduplication.
    key: String,
    /// JavaScript source.
    code: String,
    /// Document position.
    position: ScriptPosition,
  },
  /// Reference to an external script identified by its URL.
  File {
    /// Script URL, also the deduplication key.
    url: String,
    /// Extra attributes rendered on the element.
    attributes: ScriptAttributes,
    /// Document position.
    position: ScriptPosition,
  },
}

impl ScriptEntry {
  /// Document position of the entry.
  pub fn position(&self) -> ScriptPosition {
    match self {
      Self::Inline { position, .. } | Self::File { position, .. } => *position,
    }
  }
}

/// Ordered script registry for a single page render.
///
/// Entries keep registration order, except that a new inline script is placed before the file
/// references already registered at its position. Registering an existing key again replaces
/// the entry in place, so repeated registrations with identical content are no-ops.
#[derive(Debug, Clone, Default)]
pub struct ClientScript {
  entries: Vec<ScriptEntry>,
}

impl ClientScript {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// All entries in registration order.
  pub fn entries(&self) -> &[ScriptEntry] {
    &self.entries
  }

  /// Number of distinct entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when nothing has been registered.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Entries registered at `position`, in registration order.
  pub fn entries_at(&self, position: ScriptPosition) -> impl Iterator<Item = &ScriptEntry> {
    self
      .entries
      .iter()
      .filter(move |entry| entry.position() == position)
  }

  /// Inline code registered under `key`.
  pub fn inline(&self, key: &str) -> Option<&str> {
    self.entries.iter().find_map(|entry| match entry {
      ScriptEntry::Inline { key: k, code, .. } if k == key => Some(code.as_str()),
      _ => None,
    })
  }

  /// Attributes of the file registered at `url`.
  pub fn file(&self, url: &str) -> Option<&ScriptAttributes> {
    self.entries.iter().find_map(|entry| match entry {
      ScriptEntry::File { url: u, attributes, .. } if u == url => Some(attributes),
      _ => None,
    })
  }

  /// Drop every registered entry.
  pub fn reset(&mut self) {
    self.entries.clear();
  }

  /// Render the entries at `position` as HTML, one element per line.
  pub fn render(&self, position: ScriptPosition) -> String {
    let mut elements = Vec::new();
    let mut deferred = Vec::new();

    for entry in self.entries_at(position) {
      match entry {
        ScriptEntry::File { url, attributes, .. } => elements.push(render_file(url, attributes)),
        ScriptEntry::Inline { code, .. } => match position {
          ScriptPosition::Load | ScriptPosition::Ready => deferred.push(code.as_str()),
          _ => elements.push(render_inline(code)),
        },
      }
    }

    if !deferred.is_empty() {
      let (target, event) = match position {
        ScriptPosition::Load => ("window", "load"),
        _ => ("document", "DOMContentLoaded"),
      };
      elements.push(render_listener(target, event, &deferred));
    }

    elements.join("\n")
  }

  /// Render the body-end block: `End` scripts followed by the load and ready listeners.
  pub fn render_body_end(&self) -> String {
    [ScriptPosition::End, ScriptPosition::Load, ScriptPosition::Ready]
      .into_iter()
      .map(|position| self.render(position))
      .filter(|html| !html.is_empty())
      .collect::<Vec<_>>()
      .join("\n")
  }

  fn upsert(&mut self, entry: ScriptEntry) {
    let existing = self.entries.iter().position(|current| match (current, &entry) {
      (ScriptEntry::Inline { key: a, .. }, ScriptEntry::Inline { key: b, .. }) => a == b,
      (ScriptEntry::File { url: a, .. }, ScriptEntry::File { url: b, .. }) => a == b,
      _ => false,
    });

    match existing {
      Some(index) => self.entries[index] = entry,
      None => {
        let index = self.insertion_index(&entry);
        self.entries.insert(index, entry);
      }
    }
  }

  // New inline code goes ahead of the file references at its position, so configuration
  // registered late still runs before the scripts that read it.
  fn insertion_index(&self, entry: &ScriptEntry) -> usize {
    let ScriptEntry::Inline { position, .. } = entry else {
      return self.entries.len();
    };
    self
      .entries
      .iter()
      .position(|current| {
        matches!(current, ScriptEntry::File { position: p, .. } if p == position)
      })
      .unwrap_or(self.entries.len())
  }
}

impl ScriptRegistry for ClientScript {
  fn register_inline(&mut self, key: &str, code: &str, position: ScriptPosition) {
    debug!(key, %position, "registering inline script");
    self.upsert(ScriptEntry::Inline {
      key: key.to_string(),
      code: code.to_string(),
      position,
    });
  }

  fn register_file(&mut self, url: &str, position: ScriptPosition, attributes: &ScriptAttributes) {
    debug!(url, %position, "registering script file");
    self.upsert(ScriptEntry::File {
      url: url.to_string(),
      attributes: attributes.clone(),
      position,
    });
  }

  fn remove_inline(&mut self, key: &str) -> bool {
    let before = self.entries.len();
    self
      .entries
      .retain(|entry| !matches!(entry, ScriptEntry::Inline { key: k, .. } if k == key));
    self.entries.len() != before
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn attrs(pairs: &[(&str, &str)]) -> ScriptAttributes {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn inline_scripts_precede_file_references() {
    let mut scripts = ClientScript::new();
    scripts.register_inline("a", "one();", ScriptPosition::Head);
    scripts.register_file("/lib.js", ScriptPosition::Head, &ScriptAttributes::new());
    scripts.register_inline("b", "two();", ScriptPosition::Head);

    let html = scripts.render(ScriptPosition::Head);
    let one = html.find("one();").unwrap();
    let two = html.find("two();").unwrap();
    let lib = html.find("/lib.js").unwrap();
    assert!(one < two && two < lib);
  }

  #[test]
  fn late_inline_scripts_ignore_files_at_other_positions() {
    let mut scripts = ClientScript::new();
    scripts.register_file("/end.js", ScriptPosition::End, &ScriptAttributes::new());
    scripts.register_inline("a", "a();", ScriptPosition::Head);
    scripts.register_file("/head.js", ScriptPosition::Head, &ScriptAttributes::new());
    scripts.register_inline("b", "b();", ScriptPosition::Head);

    let order: Vec<&str> = scripts
      .entries()
      .iter()
      .map(|entry| match entry {
        ScriptEntry::Inline { key, .. } => key.as_str(),
        ScriptEntry::File { url, .. } => url.as_str(),
      })
      .collect();
    assert_eq!(order, vec!["/end.js", "a", "b", "/head.js"]);
  }

  #[test]
  fn replaces_existing_keys_in_place() {
    let mut scripts = ClientScript::new();
    scripts.register_inline("a", "old();", ScriptPosition::Head);
    scripts.register_inline("b", "b();", ScriptPosition::Head);
    scripts.register_inline("a", "new();", ScriptPosition::Head);

    assert_eq!(scripts.len(), 2);
    assert_eq!(scripts.inline("a"), Some("new();"));
    assert!(matches!(&scripts.entries()[0], ScriptEntry::Inline { key, .. } if key == "a"));
  }

  #[test]
  fn deduplicates_files_by_url() {
    let mut scripts = ClientScript::new();
    scripts.register_file("/r.js", ScriptPosition::Head, &attrs(&[("data-main", "/a.js")]));
    scripts.register_file("/r.js", ScriptPosition::Head, &attrs(&[("data-main", "/b.js")]));

    assert_eq!(scripts.len(), 1);
    assert_eq!(
      scripts.file("/r.js").and_then(|a| a.get("data-main")).map(String::as_str),
      Some("/b.js")
    );
  }

  #[test]
  fn inline_keys_and_file_urls_do_not_collide() {
    let mut scripts = ClientScript::new();
    scripts.register_inline("/r.js", "x();", ScriptPosition::Head);
    scripts.register_file("/r.js", ScriptPosition::Head, &ScriptAttributes::new());
    assert_eq!(scripts.len(), 2);
  }

  #[test]
  fn batches_ready_scripts_into_one_listener() {
    let mut scripts = ClientScript::new();
    scripts.register_inline("a", "a();", ScriptPosition::Ready);
    scripts.register_inline("b", "b();", ScriptPosition::Ready);
    scripts.register_inline("c", "c();", ScriptPosition::Load);

    let ready = scripts.render(ScriptPosition::Ready);
    assert_eq!(ready.matches("<script").count(), 1);
    assert!(ready.contains("document.addEventListener('DOMContentLoaded'"));
    assert!(ready.contains("a();\nb();"));

    let end = scripts.render_body_end();
    let load = end.find("window.addEventListener('load'").unwrap();
    let dom = end.find("DOMContentLoaded").unwrap();
    assert!(load < dom);
  }

  #[test]
  fn renders_nothing_for_empty_positions() {
    let scripts = ClientScript::new();
    assert!(scripts.render(ScriptPosition::Head).is_empty());
    assert!(scripts.render_body_end().is_empty());
  }

  #[test]
  fn remove_inline_only_drops_the_named_key() {
    let mut scripts = ClientScript::new();
    scripts.register_inline("a", "a();", ScriptPosition::Head);
    scripts.register_file("a", ScriptPosition::Head, &ScriptAttributes::new());

    assert!(scripts.remove_inline("a"));
    assert!(!scripts.remove_inline("a"));
    assert_eq!(scripts.len(), 1);
    assert!(scripts.file("a").is_some());
  }

  #[test]
  fn reset_clears_entries() {
    let mut scripts = ClientScript::new();
    scripts.register_inline("a", "a();", ScriptPosition::Head);
    scripts.reset();
    assert!(scripts.is_empty());
  }
}
