//! Backend records and the field-casing boundary.
//!
//! The CRM backend answers with a mix of `PascalCase` and `camelCase` keys
//! depending on the endpoint. A [`Record`] normalizes top-level keys to
//! camelCase exactly once, when it is constructed, so every consumer reads
//! `leadStatus` and never has to fall back to `LeadStatus`. The reverse
//! mapping is applied when building update payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque Lead or Opportunity as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Normalize a wire value into a record. Only JSON objects are records.
    pub fn from_wire(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Raw value of a field. `null` reads as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// Field rendered as display text. Empty strings read as absent.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) if s.trim().is_empty() => None,
            other => scalar_to_string(other),
        }
    }

    /// Field rendered as a comparison key (`1`, `1.0` and `"1"` all give `"1"`).
    pub fn key(&self, field: &str) -> Option<String> {
        self.get(field).and_then(scalar_to_string)
    }

    /// Numeric field, accepting numeric strings. Non-finite values read as
    /// absent.
    pub fn number(&self, field: &str) -> Option<f64> {
        let n = match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        n.is_finite().then_some(n)
    }

    /// Stringified `id`, or an empty string for records without one.
    pub fn id(&self) -> String {
        self.key("id").unwrap_or_default()
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(camel_case_key(field), value);
    }

    /// The full record with every top-level key re-cased to PascalCase, as the
    /// update endpoints expect.
    pub fn to_update_payload(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (pascal_case_key(k), v.clone()))
            .collect();
        Value::Object(map)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(raw: Map<String, Value>) -> Self {
        let mut fields = Map::with_capacity(raw.len());
        for (key, value) in raw {
            let normalized = camel_case_key(&key);
            if normalized == key {
                fields.insert(normalized, value);
            } else {
                // An explicit camelCase key wins over its PascalCase twin.
                fields.entry(normalized).or_insert(value);
            }
        }
        Self { fields }
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

/// `LeadStatus` → `leadStatus`, `CRMLeadId` → `crmLeadId`, `ID` → `id`.
pub fn camel_case_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let leading_upper = chars.iter().take_while(|c| c.is_uppercase()).count();
    match leading_upper {
        0 => key.to_string(),
        n if n == chars.len() => key.to_lowercase(),
        1 => lower_prefix(&chars, 1),
        // Keep the last capital of an acronym run: it starts the next word.
        n => lower_prefix(&chars, n - 1),
    }
}

fn lower_prefix(chars: &[char], n: usize) -> String {
    chars[..n]
        .iter()
        .flat_map(|c| c.to_lowercase())
        .chain(chars[n..].iter().copied())
        .collect()
}

/// `leadStatus` → `LeadStatus`.
pub fn pascal_case_key(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_wire(value).unwrap()
    }

    #[test]
    fn test_camel_case_key() {
        assert_eq!(camel_case_key("LeadStatus"), "leadStatus");
        assert_eq!(camel_case_key("leadStatus"), "leadStatus");
        assert_eq!(camel_case_key("Id"), "id");
        assert_eq!(camel_case_key("ID"), "id");
        assert_eq!(camel_case_key("CRMLeadId"), "crmLeadId");
        assert_eq!(camel_case_key(""), "");
    }

    #[test]
    fn test_pascal_case_key() {
        assert_eq!(pascal_case_key("leadStatus"), "LeadStatus");
        assert_eq!(pascal_case_key("id"), "Id");
        assert_eq!(pascal_case_key(""), "");
    }

    #[test]
    fn test_from_wire_normalizes_pascal_case() {
        let r = record(json!({"Id": 7, "LeadName": "Acme", "LeadStatus": 1}));
        assert_eq!(r.id(), "7");
        assert_eq!(r.text("leadName").as_deref(), Some("Acme"));
        assert_eq!(r.key("leadStatus").as_deref(), Some("1"));
        assert!(r.get("LeadName").is_none());
    }

    #[test]
    fn test_camel_case_key_wins_over_pascal_twin() {
        let r = record(json!({"leadName": "camel", "LeadName": "pascal"}));
        assert_eq!(r.text("leadName").as_deref(), Some("camel"));

        let r = record(json!({"LeadName": "pascal", "leadName": "camel"}));
        assert_eq!(r.text("leadName").as_deref(), Some("camel"));
    }

    #[test]
    fn test_from_wire_rejects_non_objects() {
        assert!(Record::from_wire(json!([1, 2])).is_none());
        assert!(Record::from_wire(json!("lead")).is_none());
        assert!(Record::from_wire(Value::Null).is_none());
    }

    #[test]
    fn test_text_treats_null_and_blank_as_absent() {
        let r = record(json!({"company": "", "leadName": null, "phone": "  "}));
        assert!(r.text("company").is_none());
        assert!(r.text("leadName").is_none());
        assert!(r.text("phone").is_none());
        assert!(r.text("missing").is_none());
    }

    #[test]
    fn test_key_stringifies_numbers_consistently() {
        let r = record(json!({"a": 1, "b": "1", "c": 1.0, "d": 2.5, "e": true}));
        assert_eq!(r.key("a").as_deref(), Some("1"));
        assert_eq!(r.key("b").as_deref(), Some("1"));
        assert_eq!(r.key("c").as_deref(), Some("1"));
        assert_eq!(r.key("d").as_deref(), Some("2.5"));
        assert_eq!(r.key("e").as_deref(), Some("true"));
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let r = record(json!({"amount": "1250.5", "score": 80, "bad": "n/a"}));
        assert_eq!(r.number("amount"), Some(1250.5));
        assert_eq!(r.number("score"), Some(80.0));
        assert_eq!(r.number("bad"), None);
    }

    #[test]
    fn test_number_rejects_non_finite_strings() {
        let r = record(json!({"a": "NaN", "b": "inf", "c": "-Infinity"}));
        assert_eq!(r.number("a"), None);
        assert_eq!(r.number("b"), None);
        assert_eq!(r.number("c"), None);
    }

    #[test]
    fn test_update_payload_is_pascal_case_and_complete() {
        let mut r = record(json!({"id": 5, "leadName": "Acme", "leadStatus": 1, "notes": "x"}));
        r.set("leadStatus", json!(2));
        let payload = r.to_update_payload();
        assert_eq!(
            payload,
            json!({"Id": 5, "LeadName": "Acme", "LeadStatus": 2, "Notes": "x"})
        );
    }

    #[test]
    fn test_deserialize_goes_through_normalization() {
        let r: Record = serde_json::from_value(json!({"StageName": "Won"})).unwrap();
        assert_eq!(r.text("stageName").as_deref(), Some("Won"));
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"stageName": "Won"}));
    }
}
