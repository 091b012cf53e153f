//! Typed decoders for response bodies
//!
//! The backend returns either a collection or a lone object from its list
//! endpoints, a bare number or one of several wrapper objects from the count
//! endpoint, and JSON, plain text or nothing at all from action endpoints.
//! Each decoder accepts exactly the documented shapes and reports anything
//! else as [`Error::UnexpectedShape`]; deciding whether that degrades to an
//! empty view is up to the caller. A list keeps its decodable records when
//! some of its elements are not records at all.

use crate::error::{Error, Result};
use crate::types::{CarouselImage, DistrictEntry, HotelAdmin, RawHotel};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Records that can arrive as a lone object instead of a one-element array
pub trait Identified: DeserializeOwned {
    /// Fields whose presence marks an object as a record of this type
    ///
    /// These are the fields decoding cannot do without, so a lone object that
    /// passes the check also deserializes.
    const IDENTIFYING_FIELDS: &'static [&'static str];
}

impl Identified for HotelAdmin {
    const IDENTIFYING_FIELDS: &'static [&'static str] = &["adminId"];
}

impl Identified for RawHotel {
    const IDENTIFYING_FIELDS: &'static [&'static str] = &["hotelId", "id", "hotelName"];
}

impl Identified for CarouselImage {
    const IDENTIFYING_FIELDS: &'static [&'static str] = &["carouselImageId"];
}

/// Field names the count endpoint may wrap its number in, in lookup order
pub const COUNT_FIELDS: &[&str] = &["count", "total", "totalCount"];

/// Decode a list endpoint body
///
/// An array is decoded element by element; an element that is not a record
/// of `T` is logged and skipped. An object carrying at least one of `T`'s
/// identifying fields with a non-empty value becomes a one-element list.
/// Anything else is an unexpected shape.
///
/// # Errors
///
/// Returns [`Error::UnexpectedShape`] when the body is neither form, or when
/// a non-empty array holds no decodable element.
pub fn decode_list<T: Identified>(endpoint: &str, body: &Value) -> Result<Vec<T>> {
    match body {
        Value::Array(items) => {
            let records: Vec<T> = items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match T::deserialize(item) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(endpoint, index, error = %e, "Skipping undecodable list element");
                        None
                    }
                })
                .collect();
            if records.is_empty() && !items.is_empty() {
                return Err(Error::unexpected_shape(
                    endpoint,
                    format!("none of {} elements decoded", items.len()),
                ));
            }
            Ok(records)
        }
        Value::Object(map) => {
            let identified = T::IDENTIFYING_FIELDS
                .iter()
                .any(|field| map.get(*field).is_some_and(is_present));
            if !identified {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                return Err(Error::unexpected_shape(
                    endpoint,
                    format!("object without identifying fields (keys: {keys:?})"),
                ));
            }
            T::deserialize(body)
                .map(|record| vec![record])
                .map_err(|e| Error::unexpected_shape(endpoint, e.to_string()))
        }
        other => Err(Error::unexpected_shape(
            endpoint,
            format!("expected array or object, got {}", kind(other)),
        )),
    }
}

/// Decode the district list into names
///
/// # Errors
///
/// Returns [`Error::UnexpectedShape`] unless the body is an array of names or
/// `{name}` objects.
pub fn decode_districts(endpoint: &str, body: &Value) -> Result<Vec<String>> {
    let Value::Array(items) = body else {
        return Err(Error::unexpected_shape(
            endpoint,
            format!("expected array, got {}", kind(body)),
        ));
    };

    items
        .iter()
        .map(|item| {
            DistrictEntry::deserialize(item)
                .map(DistrictEntry::into_name)
                .map_err(|e| Error::unexpected_shape(endpoint, e.to_string()))
        })
        .collect()
}

/// Decode the total hotel count
///
/// Accepts a bare non-negative number or an object holding one under
/// `count`, `total` or `totalCount` (numeric strings are tolerated).
///
/// # Errors
///
/// Returns [`Error::UnexpectedShape`] for any other body, including `{}`.
pub fn decode_count(endpoint: &str, body: &Value) -> Result<u64> {
    if let Some(count) = as_count(body) {
        return Ok(count);
    }
    if let Value::Object(map) = body
        && let Some(count) = COUNT_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(as_count))
    {
        return Ok(count);
    }
    Err(Error::unexpected_shape(
        endpoint,
        format!("no count in {}", kind(body)),
    ))
}

/// What an action endpoint sent back on success
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A JSON document
    Json(Value),
    /// Plain text, or a JSON content type whose body did not parse
    Text(String),
    /// No body
    Empty,
}

impl ActionOutcome {
    /// Interpret a successful action response body
    ///
    /// Every variant is a success marker; nothing here can fail.
    pub fn from_body(content_type: Option<&str>, text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
        if is_json && let Ok(value) = serde_json::from_str(trimmed) {
            return Self::Json(value);
        }
        Self::Text(trimmed.to_string())
    }

    /// A short message suitable for display, if the server sent one
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Json(Value::String(text)) | Self::Text(text) => Some(text.clone()),
            Self::Json(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            _ => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Truthiness used to recognise a lone record: `null`, `false`, `0` and `""`
/// do not identify anything.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
