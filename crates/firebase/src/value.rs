//! Firestore typed-value codec.
//!
//! Firestore's REST surface wraps every field in a single-key type envelope
//! (`{"stringValue": "x"}`, `{"integerValue": "5"}`, ...). This module maps
//! between those envelopes and plain [`serde_json::Value`]s so the
//! conversion layer can use ordinary serde structs.
//!
//! Decoding collapses whole `doubleValue`s to JSON integers: the JavaScript
//! clients that wrote the historical documents do not distinguish the two,
//! so a stored price may arrive as either `integerValue: "35"` or
//! `doubleValue: 35.0` and must deserialize into the same integer field.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

// =============================================================================
// Encoding helpers
// =============================================================================

/// `{"stringValue": s}`
#[must_use]
pub fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

/// `{"integerValue": "i"}` - Firestore carries 64-bit integers as strings.
#[must_use]
pub fn integer_value(i: i64) -> Value {
    json!({ "integerValue": i.to_string() })
}

/// `{"booleanValue": b}`
#[must_use]
pub fn boolean_value(b: bool) -> Value {
    json!({ "booleanValue": b })
}

/// `{"timestampValue": rfc3339}`
#[must_use]
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    json!({ "timestampValue": at.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

/// `{"mapValue": {"fields": {...}}}`
#[must_use]
pub fn map_value(fields: Map<String, Value>) -> Value {
    json!({ "mapValue": { "fields": fields } })
}

/// `{"arrayValue": {"values": [...]}}`
#[must_use]
pub fn array_value(values: Vec<Value>) -> Value {
    json!({ "arrayValue": { "values": values } })
}

/// Array of strings, the only array shape the product stores.
#[must_use]
pub fn string_array_value(items: &[String]) -> Value {
    array_value(items.iter().map(|s| string_value(s)).collect())
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a document's `fields` map into a plain JSON object.
#[must_use]
pub fn decode_fields(fields: &Map<String, Value>) -> Value {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        out.insert(key.clone(), decode_value(value));
    }
    Value::Object(out)
}

/// Decode a single typed value envelope.
///
/// Unknown envelopes (bytes, references, geo points) decode to null; the
/// product never stores them.
#[must_use]
pub fn decode_value(value: &Value) -> Value {
    let Some(envelope) = value.as_object() else {
        return Value::Null;
    };

    if let Some(s) = envelope.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_owned());
    }
    if let Some(s) = envelope.get("timestampValue").and_then(Value::as_str) {
        return Value::String(s.to_owned());
    }
    if let Some(b) = envelope.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if let Some(raw) = envelope.get("integerValue") {
        // Arrives as a string per the wire format, but tolerate a bare number.
        if let Some(s) = raw.as_str()
            && let Ok(i) = s.parse::<i64>()
        {
            return Value::from(i);
        }
        if let Some(i) = raw.as_i64() {
            return Value::from(i);
        }
        return Value::Null;
    }
    if let Some(f) = envelope.get("doubleValue").and_then(Value::as_f64) {
        // Whole doubles become integers; see module docs.
        #[allow(clippy::cast_possible_truncation)]
        if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
            return Value::from(f as i64);
        }
        return Value::from(f);
    }
    if let Some(map) = envelope.get("mapValue") {
        let fields = map
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        return decode_fields(&fields);
    }
    if let Some(array) = envelope.get("arrayValue") {
        let values = array
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    // nullValue or an envelope we do not store
    Value::Null
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trip() {
        assert_eq!(decode_value(&string_value("hi")), json!("hi"));
        assert_eq!(decode_value(&integer_value(42)), json!(42));
        assert_eq!(decode_value(&boolean_value(true)), json!(true));
        assert_eq!(decode_value(&json!({ "nullValue": null })), Value::Null);
    }

    #[test]
    fn test_timestamp_decodes_to_rfc3339_string() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let decoded = decode_value(&timestamp_value(at));
        let back: DateTime<Utc> = decoded.as_str().unwrap().parse().unwrap();
        assert_eq!(back, at);
    }

    #[test]
    fn test_whole_double_collapses_to_integer() {
        assert_eq!(decode_value(&json!({ "doubleValue": 35.0 })), json!(35));
        assert_eq!(decode_value(&json!({ "doubleValue": 35.5 })), json!(35.5));
    }

    #[test]
    fn test_nested_map_and_array() {
        let mut pricing = Map::new();
        pricing.insert("basePrice".to_owned(), integer_value(35));
        pricing.insert("total".to_owned(), integer_value(40));

        let mut fields = Map::new();
        fields.insert("pricing".to_owned(), map_value(pricing));
        fields.insert(
            "inspirationPicUrls".to_owned(),
            string_array_value(&["https://example.com/a.jpg".to_owned()]),
        );

        let decoded = decode_fields(&fields);
        assert_eq!(
            decoded,
            json!({
                "pricing": { "basePrice": 35, "total": 40 },
                "inspirationPicUrls": ["https://example.com/a.jpg"],
            })
        );
    }

    #[test]
    fn test_unknown_envelope_decodes_to_null() {
        assert_eq!(
            decode_value(&json!({ "bytesValue": "deadbeef" })),
            Value::Null
        );
        assert_eq!(decode_value(&json!("not an envelope")), Value::Null);
    }
}
