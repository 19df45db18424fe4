//! Decoding of Firestore's typed value encoding into plain JSON.
//!
//! The REST API wraps every value in a single-key object naming its type,
//! e.g. `{"stringValue": "Acme"}` or `{"integerValue": "42"}`.

use serde_json::{Map, Number, Value};

use super::FirestoreError;

/// Decode a `fields` map into a plain JSON record.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, FirestoreError> {
    fields.iter().map(|(name, value)| Ok((name.clone(), decode_value(value)?))).collect()
}

/// Decode one typed value.
pub fn decode_value(value: &Value) -> Result<Value, FirestoreError> {
    let typed = value
        .as_object()
        .ok_or_else(|| FirestoreError::Parse(format!("typed value must be an object, found {value}")))?;
    let (kind, inner) = typed
        .iter()
        .next()
        .ok_or_else(|| FirestoreError::Parse("typed value has no type key".into()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or(false))),
        "integerValue" => {
            let text = inner.as_str().map(str::to_owned).unwrap_or_else(|| inner.to_string());
            text.parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .map_err(|_| FirestoreError::Parse(format!("bad integerValue: {text}")))
        }
        // non-finite doubles ("NaN", "Infinity") have no JSON form
        "doubleValue" => Ok(inner.as_f64().and_then(Number::from_f64).map(Value::Number).unwrap_or(Value::Null)),
        "stringValue" | "timestampValue" | "bytesValue" | "referenceValue" => Ok(inner.clone()),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values.iter().map(decode_value).collect::<Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => Ok(Value::Object(decode_fields(fields)?)),
            _ => Ok(Value::Object(Map::new())),
        },
        other => Err(FirestoreError::Parse(format!("unknown value type: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode_value(&json!({"stringValue": "Acme"})).unwrap(), json!("Acme"));
        assert_eq!(decode_value(&json!({"integerValue": "42"})).unwrap(), json!(42));
        assert_eq!(decode_value(&json!({"doubleValue": -23.5})).unwrap(), json!(-23.5));
        assert_eq!(decode_value(&json!({"booleanValue": true})).unwrap(), json!(true));
        assert_eq!(decode_value(&json!({"nullValue": null})).unwrap(), Value::Null);
        assert_eq!(
            decode_value(&json!({"timestampValue": "2024-01-01T00:00:00Z"})).unwrap(),
            json!("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_decode_non_finite_double() {
        assert_eq!(decode_value(&json!({"doubleValue": "NaN"})).unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_nested() {
        let fields = json!({
            "empresaNome": {"stringValue": "Acme"},
            "banner": {"mapValue": {"fields": {"titulo": {"stringValue": "Oi"}}}},
            "socialLinks": {"arrayValue": {"values": [
                {"mapValue": {"fields": {"nome": {"stringValue": "ig"}, "url": {"stringValue": "https://i"}}}}
            ]}},
            "vazio": {"arrayValue": {}},
            "local": {"geoPointValue": {"latitude": 1.5, "longitude": 2.5}}
        });

        let record = decode_fields(fields.as_object().unwrap()).unwrap();
        assert_eq!(
            Value::Object(record),
            json!({
                "empresaNome": "Acme",
                "banner": {"titulo": "Oi"},
                "socialLinks": [{"nome": "ig", "url": "https://i"}],
                "vazio": [],
                "local": {"latitude": 1.5, "longitude": 2.5}
            })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(decode_value(&json!({"weirdValue": 1})).is_err());
        assert!(decode_value(&json!("bare")).is_err());
        assert!(decode_value(&json!({"integerValue": "x"})).is_err());
    }
}
