//! Raw embedded sub-documents
//!
//! An attribute keyed `raw;<format>;<name>` carries literal text in `format`.
//! At encode time the key is shown as `<name>` and the text is replaced by the
//! parsed mapping when it parses. Text that does not parse is kept as-is under
//! [`RawFallback::LiteralString`]; a bad document never fails the record.

use serde_json::{Map, Value as JsonValue};

const RAW_TAG: &str = "raw";
const SEPARATOR: char = ';';

/// Sub-format of a raw field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    Json,
    Yaml,
}

/// What to emit when a raw field does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum RawFallback {
    /// Emit the original text as a plain string
    #[default]
    LiteralString,
}

impl RawFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            RawFormat::Json => "json",
            RawFormat::Yaml => "yaml",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(RawFormat::Json),
            "yaml" => Some(RawFormat::Yaml),
            _ => None,
        }
    }

    /// Attribute key that marks `name` as a raw field of this format
    pub fn key(self, name: &str) -> String {
        format!("{RAW_TAG}{SEPARATOR}{}{SEPARATOR}{name}", self.as_str())
    }

    /// Parse `text` into a mapping; anything but a top-level mapping is a miss.
    pub fn parse_mapping(self, text: &str) -> Option<Map<String, JsonValue>> {
        match self {
            RawFormat::Json => serde_json::from_str(text).ok(),
            RawFormat::Yaml => parse_yaml_mapping(text),
        }
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml_mapping(text: &str) -> Option<Map<String, JsonValue>> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text).ok()?;
    if !doc.is_mapping() {
        return None;
    }
    match serde_json::to_value(doc).ok()? {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml_mapping(_text: &str) -> Option<Map<String, JsonValue>> {
    None
}

/// Split a `raw;<format>;<name>` key. Keys with an unknown format are not raw.
pub fn split_key(key: &str) -> Option<(RawFormat, &str)> {
    let rest = key.strip_prefix(RAW_TAG)?.strip_prefix(SEPARATOR)?;
    let (tag, name) = rest.split_once(SEPARATOR)?;
    Some((RawFormat::from_tag(tag)?, name))
}

/// Resolve the emitted value of a raw field.
pub fn expand(format: RawFormat, value: JsonValue, fallback: RawFallback) -> JsonValue {
    let text = match value {
        JsonValue::String(text) => text,
        other => return other,
    };

    match format.parse_mapping(&text) {
        Some(map) => JsonValue::Object(map),
        None => match fallback {
            RawFallback::LiteralString => JsonValue::String(text),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("raw;json;doc"), Some((RawFormat::Json, "doc")));
        assert_eq!(split_key("raw;yaml;cfg;v2"), Some((RawFormat::Yaml, "cfg;v2")));
        assert_eq!(split_key("raw;xml;doc"), None);
        assert_eq!(split_key("raw;json"), None);
        assert_eq!(split_key("rawjson;doc"), None);
        assert_eq!(split_key("doc"), None);
    }

    #[test]
    fn test_key_builder_roundtrips_through_split() {
        let key = RawFormat::Yaml.key("settings");
        assert_eq!(key, "raw;yaml;settings");
        assert_eq!(split_key(&key), Some((RawFormat::Yaml, "settings")));
    }

    #[test]
    fn test_json_mapping_expands() {
        let out = expand(RawFormat::Json, json!(r#"{"x":1}"#), RawFallback::LiteralString);
        assert_eq!(out, json!({"x": 1}));
    }

    #[test]
    fn test_invalid_json_falls_back_to_text() {
        let out = expand(RawFormat::Json, json!("{x:"), RawFallback::LiteralString);
        assert_eq!(out, json!("{x:"));
    }

    #[test]
    fn test_non_mapping_json_falls_back_to_text() {
        let out = expand(RawFormat::Json, json!("[1,2]"), RawFallback::LiteralString);
        assert_eq!(out, json!("[1,2]"));
    }

    #[test]
    fn test_non_string_value_passes_through() {
        let out = expand(RawFormat::Json, json!(5), RawFallback::LiteralString);
        assert_eq!(out, json!(5));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_mapping_expands() {
        let out = expand(
            RawFormat::Yaml,
            json!("name: api\nports:\n  - 80\n  - 443\n"),
            RawFallback::LiteralString,
        );
        assert_eq!(out, json!({"name": "api", "ports": [80, 443]}));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_scalar_falls_back_to_text() {
        let out = expand(RawFormat::Yaml, json!("just text"), RawFallback::LiteralString);
        assert_eq!(out, json!("just text"));
    }
}
