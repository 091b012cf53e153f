//! Lenient field decoders for records the backend fills inconsistently
//!
//! Text fields may arrive as `null`, a string or a number; numeric fields as
//! a number or a numeric string; lists may hold entries of the wrong type.
//! None of that should cost the rest of the record.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde_json::Value;

/// Text that may be `null`, a number or a boolean
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Like [`optional_text`], with `null` read as `""`
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_text(deserializer).map(Option::unwrap_or_default)
}

/// A number that may be sent as a numeric string; anything else is `None`
pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A record identity: an integer or an integer string
pub(crate) fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("id {n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("id '{s}' is not an integer"))),
        other => Err(D::Error::custom(format!("expected an id, got {other}"))),
    }
}

/// A list whose entries of the wrong type are dropped; `null` is `None`
pub(crate) fn optional_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "text")]
        name: String,
        #[serde(default, deserialize_with = "optional_number")]
        rating: Option<f64>,
        #[serde(deserialize_with = "id")]
        id: i64,
        #[serde(default, deserialize_with = "optional_list")]
        tags: Option<Vec<String>>,
    }

    #[test]
    fn test_lenient_fields() {
        let sample: Sample = serde_json::from_value(json!({
            "name": null,
            "rating": "4.5",
            "id": "12",
            "tags": ["a", 3, null, "b"]
        }))
        .unwrap();
        assert_eq!(sample.name, "");
        assert_eq!(sample.rating, Some(4.5));
        assert_eq!(sample.id, 12);
        assert_eq!(sample.tags, Some(vec!["a".to_string(), "b".to_string()]));

        let sample: Sample = serde_json::from_value(json!({"name": 771_234_567, "id": 3})).unwrap();
        assert_eq!(sample.name, "771234567");
        assert_eq!(sample.rating, None);
        assert_eq!(sample.tags, None);
    }

    #[test]
    fn test_id_must_be_an_integer() {
        for id in [json!(null), json!("abc"), json!(1.5), json!({})] {
            assert!(serde_json::from_value::<Sample>(json!({ "id": id })).is_err());
        }
    }
}
