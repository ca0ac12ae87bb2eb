//! `KEY=VALUE` argument parsing

use anyhow::{bail, Result};
use sample_core::params::TEXT_FIELDS;
use serde_json::{Map, Value};

/// Parse `KEY=VALUE` pairs into a JSON object.
///
/// Text fields keep the raw value. Other values that parse as JSON keep
/// their type (`21`, `9.99`, `true`, `["a","b"]`); anything else becomes a
/// string. Later keys win.
pub fn parse_pairs(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got '{}'", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("empty key in '{}'", pair);
        }
        let value = if TEXT_FIELDS.contains(&key) {
            Value::String(raw.to_string())
        } else {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        };
        map.insert(key.to_string(), value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_typed_values() {
        let map = parse_pairs(&pairs(&[
            "parameter1=Black Stab",
            "parameter2=21",
            "pur_gross=9.99",
            "content_ids=[\"a\",\"b\"]",
            "locale=en-US",
        ]))
        .unwrap();

        assert_eq!(map["parameter1"], json!("Black Stab"));
        assert_eq!(map["parameter2"], json!(21));
        assert_eq!(map["pur_gross"], json!(9.99));
        assert_eq!(map["content_ids"], json!(["a", "b"]));
        assert_eq!(map["locale"], json!("en-US"));
    }

    #[test]
    fn test_text_fields_keep_raw_value() {
        let map = parse_pairs(&pairs(&[
            "client_version=1.10",
            "content_id=42",
            "page_id=007",
        ]))
        .unwrap();

        assert_eq!(map["client_version"], json!("1.10"));
        assert_eq!(map["content_id"], json!("42"));
        assert_eq!(map["page_id"], json!("007"));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let map = parse_pairs(&pairs(&["ad_referer=https://x.example/?a=b"])).unwrap();
        assert_eq!(map["ad_referer"], json!("https://x.example/?a=b"));
    }

    #[test]
    fn test_invalid_pairs() {
        assert!(parse_pairs(&pairs(&["no_equals"])).is_err());
        assert!(parse_pairs(&pairs(&["=value"])).is_err());
    }

    #[test]
    fn test_later_keys_win() {
        let map = parse_pairs(&pairs(&["platform=ios", "platform=web"])).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["platform"], json!("web"));
    }
}
