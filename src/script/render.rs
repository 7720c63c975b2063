//! HTML rendering for registered scripts.

use super::ScriptAttributes;

/// Render an inline script element.
pub fn render_inline(code: &str) -> String {
  format!("<script type=\"text/javascript\">\n{code}\n</script>")
}

/// Render a script element referencing `url`, with `attributes` in name order.
pub fn render_file(url: &str, attributes: &ScriptAttributes) -> String {
  let mut html = format!(
    "<script type=\"text/javascript\" src=\"{}\"",
    escape_attribute(url)
  );
  for (name, value) in attributes {
    html.push(' ');
    html.push_str(name);
    html.push_str("=\"");
    html.push_str(&escape_attribute(value));
    html.push('"');
  }
  html.push_str("></script>");
  html
}

/// Wrap inline code in a listener so it runs on `event` (`load` or `DOMContentLoaded`).
pub(super) fn render_listener(target: &str, event: &str, codes: &[&str]) -> String {
  render_inline(&format!(
    "{target}.addEventListener('{event}', function () {{\n{}\n}});",
    codes.join("\n")
  ))
}

pub(super) fn escape_attribute(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for ch in value.chars() {
    match ch {
      '&' => escaped.push_str("&amp;"),
      '"' => escaped.push_str("&quot;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      _ => escaped.push(ch),
    }
  }
  escaped
}
