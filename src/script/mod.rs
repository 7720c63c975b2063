//! Script registration: the [`ScriptRegistry`] seam and the in-process [`ClientScript`].

mod client;
mod document;
mod render;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use client::{ClientScript, ScriptEntry};
pub use document::{inject_scripts, inject_scripts_into_file};
pub use render::{render_file, render_inline};

/// Extra HTML attributes attached to a script file reference, rendered in name order.
pub type ScriptAttributes = BTreeMap<String, String>;

/// Where in the document a script is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptPosition {
  /// Inside `<head>`, before `</head>`.
  Head,
  /// At the start of `<body>`.
  Begin,
  /// At the end of `<body>`.
  End,
  /// Wrapped in a `window` load listener.
  Load,
  /// Wrapped in a `DOMContentLoaded` listener.
  Ready,
}

impl ScriptPosition {
  /// Every position, in rendering order.
  pub const ALL: [ScriptPosition; 5] = [
    ScriptPosition::Head,
    ScriptPosition::Begin,
    ScriptPosition::End,
    ScriptPosition::Load,
    ScriptPosition::Ready,
  ];

  /// Lowercase name used on the command line.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Head => "head",
      Self::Begin => "begin",
      Self::End => "end",
      Self::Load => "load",
      Self::Ready => "ready",
    }
  }
}

impl fmt::Display for ScriptPosition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ScriptPosition {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|position| position.as_str().eq_ignore_ascii_case(value.trim()))
      .ok_or_else(|| format!("unknown script position `{value}`"))
  }
}

/// Sink for the scripts a page render wants emitted.
///
/// Implementations deduplicate by logical key: inline scripts by `key`, files by `url`.
pub trait ScriptRegistry {
  /// Register an inline script under `key`.
  fn register_inline(&mut self, key: &str, code: &str, position: ScriptPosition);

  /// Register a reference to an external script file.
  fn register_file(&mut self, url: &str, position: ScriptPosition, attributes: &ScriptAttributes);

  /// Drop the inline script registered under `key`, returning whether one existed.
  fn remove_inline(&mut self, key: &str) -> bool;
}
