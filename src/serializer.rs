//! JSON encoding for values embedded in inline `<script>` elements.

use serde::Serialize;

use crate::error::ConfigurationError;

/// Encode `value` as compact JSON that can be placed verbatim inside a `<script>` element.
///
/// `</` is written as `<\/` so a string such as `"</script>"` cannot close the element early,
/// and the line separators U+2028/U+2029 are escaped because older script engines treat them
/// as line terminators inside string literals.
pub fn encode_json<T>(value: &T) -> Result<String, serde_json::Error>
where
  T: Serialize + ?Sized,
{
  let json = serde_json::to_string(value)?;
  Ok(escape_for_script(&json))
}

/// Encode a configuration value, labelling failures with the value's role.
pub(crate) fn encode_config<T>(what: &'static str, value: &T) -> Result<String, ConfigurationError>
where
  T: Serialize + ?Sized,
{
  encode_json(value).map_err(|source| ConfigurationError::Encode { what, source })
}

fn escape_for_script(json: &str) -> String {
  json
    .replace("</", "<\\/")
    .replace('\u{2028}', "\\u2028")
    .replace('\u{2029}', "\\u2029")
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn encodes_compact_json() {
    let value = json!({"paths": {"jquery": "lib/jquery"}});
    assert_eq!(encode_json(&value).unwrap(), r#"{"paths":{"jquery":"lib/jquery"}}"#);
  }

  #[test]
  fn escapes_closing_script_tags() {
    let encoded = encode_json(&json!({"title": "</script><b>"})).unwrap();
    assert_eq!(encoded, r#"{"title":"<\/script><b>"}"#);
    assert!(!encoded.contains("</"));
  }

  #[test]
  fn escaped_output_still_parses_to_the_same_value() {
    let value = json!({"note": "a\u{2028}b</c>"});
    let encoded = encode_json(&value).unwrap();
    assert!(encoded.contains("\\u2028"));
    let decoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, value);
  }

  #[test]
  fn encodes_module_name_as_string_literal() {
    assert_eq!(encode_json("options").unwrap(), "\"options\"");
  }

  #[test]
  fn non_string_map_keys_surface_as_configuration_errors() {
    let mut map = std::collections::BTreeMap::new();
    map.insert(vec![1u8], 1);
    let err = encode_config("options", &map).unwrap_err();
    assert!(matches!(err, ConfigurationError::Encode { what: "options", .. }));
  }
}
