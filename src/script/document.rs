//! Splice registered scripts into a rendered HTML document.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result, anyhow};
use regex::Regex;

use super::{ClientScript, ScriptPosition};

struct DocumentPatterns {
  head_close: Regex,
  body_open: Regex,
  body_close: Regex,
}

fn patterns() -> &'static DocumentPatterns {
  static PATTERNS: OnceLock<DocumentPatterns> = OnceLock::new();
  PATTERNS.get_or_init(|| DocumentPatterns {
    head_close: Regex::new(r"(?i)</head\s*>").expect("invalid head regex"),
    body_open: Regex::new(r"(?i)<body\b[^>]*>").expect("invalid body open regex"),
    body_close: Regex::new(r"(?i)</body\s*>").expect("invalid body close regex"),
  })
}

/// Insert the registry's scripts into `html`.
///
/// Head scripts go before `</head>`, begin scripts right after the opening `<body>` tag and
/// the body-end block before `</body>` (or at the end of the document when it has no
/// closing body tag). Positions with nothing registered leave the document untouched.
pub fn inject_scripts(html: &str, scripts: &ClientScript) -> Result<String> {
  let patterns = patterns();
  let mut text = html.to_string();

  let head = scripts.render(ScriptPosition::Head);
  if !head.is_empty() {
    let at = patterns
      .head_close
      .find(&text)
      .map(|m| m.start())
      .ok_or_else(|| anyhow!("failed to locate </head> for head scripts"))?;
    text.insert_str(at, &format!("{head}\n"));
  }

  let begin = scripts.render(ScriptPosition::Begin);
  if !begin.is_empty() {
    let at = patterns
      .body_open
      .find(&text)
      .map(|m| m.end())
      .ok_or_else(|| anyhow!("failed to locate <body> for body-begin scripts"))?;
    text.insert_str(at, &format!("\n{begin}"));
  }

  let end = scripts.render_body_end();
  if !end.is_empty() {
    match patterns.body_close.find(&text).map(|m| m.start()) {
      Some(at) => text.insert_str(at, &format!("{end}\n")),
      None => {
        text.push('\n');
        text.push_str(&end);
      }
    }
  }

  Ok(text)
}

/// Inject scripts into the HTML file at `source`, writing to `destination` (or back to
/// `source` when `None`).
pub fn inject_scripts_into_file(
  source: &Path,
  destination: Option<&Path>,
  scripts: &ClientScript,
) -> Result<()> {
  let html = fs::read_to_string(source)
    .with_context(|| format!("failed to read {}", source.display()))?;
  let patched = inject_scripts(&html, scripts)
    .with_context(|| format!("failed to inject scripts into {}", source.display()))?;

  let target = destination.unwrap_or(source);
  if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::write(target, patched).with_context(|| format!("failed to write {}", target.display()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::script::{ScriptAttributes, ScriptRegistry};
  use tempfile::tempdir;

  const PAGE: &str = "<html>\n<HEAD><title>t</title></HEAD>\n<body class=\"app\">\n<p>hi</p>\n</body>\n</html>";

  fn scripts() -> ClientScript {
    let mut scripts = ClientScript::new();
    scripts.register_inline("cfg", "require.config({\"a\":\"$1\"});", ScriptPosition::Head);
    scripts.register_file("/r.js", ScriptPosition::Head, &ScriptAttributes::new());
    scripts.register_inline("begin", "begin();", ScriptPosition::Begin);
    scripts.register_inline("end", "end();", ScriptPosition::End);
    scripts
  }

  #[test]
  fn places_each_position_in_its_slot() {
    let html = inject_scripts(PAGE, &scripts()).unwrap();

    let config = html.find("require.config").unwrap();
    let loader = html.find("src=\"/r.js\"").unwrap();
    let head_close = html.find("</HEAD>").unwrap();
    let body_open = html.find("<body class=\"app\">").unwrap();
    let begin = html.find("begin();").unwrap();
    let paragraph = html.find("<p>hi</p>").unwrap();
    let end = html.find("end();").unwrap();
    let body_close = html.find("</body>").unwrap();

    assert!(config < loader && loader < head_close);
    assert!(body_open < begin && begin < paragraph);
    assert!(paragraph < end && end < body_close);
    assert!(html.contains("\"$1\""));
  }

  #[test]
  fn empty_registry_leaves_document_unchanged() {
    let html = inject_scripts(PAGE, &ClientScript::new()).unwrap();
    assert_eq!(html, PAGE);
  }

  #[test]
  fn missing_head_is_an_error_when_head_scripts_exist() {
    let err = inject_scripts("<body></body>", &scripts()).unwrap_err();
    assert!(err.to_string().contains("</head>"));
  }

  #[test]
  fn appends_end_scripts_without_closing_body() {
    let mut scripts = ClientScript::new();
    scripts.register_inline("end", "end();", ScriptPosition::End);
    let html = inject_scripts("<p>fragment</p>", &scripts).unwrap();
    assert!(html.starts_with("<p>fragment</p>\n<script"));
    assert!(html.ends_with("</script>"));
  }

  #[test]
  fn patches_file_in_place_or_to_destination() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("index.html");
    fs::write(&source, PAGE).unwrap();

    let out = dir.path().join("out/index.html");
    inject_scripts_into_file(&source, Some(&out), &scripts()).unwrap();
    assert_eq!(fs::read_to_string(&source).unwrap(), PAGE);
    assert!(fs::read_to_string(&out).unwrap().contains("require.config"));

    inject_scripts_into_file(&source, None, &scripts()).unwrap();
    assert!(fs::read_to_string(&source).unwrap().contains("begin();"));
  }
}
