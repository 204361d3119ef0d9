//! Response envelope normalization.
//!
//! Backend endpoints answer either `{ "result": <payload>, ... }` or the bare
//! payload. [`Envelope`] names the two shapes and every endpoint goes through
//! [`Envelope::from`] before its payload is interpreted.

use serde_json::{Map, Value};

use crm_common::{OwnerOption, Record, Stage};

use crate::errors::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{ "result": payload }`, possibly with sibling status fields.
    Wrapped(Value),
    Bare(Value),
}

impl From<Value> for Envelope {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match take_result(&mut map) {
                Some(inner) => Self::Wrapped(inner),
                None => Self::Bare(Value::Object(map)),
            },
            other => Self::Bare(other),
        }
    }
}

fn take_result(map: &mut Map<String, Value>) -> Option<Value> {
    map.remove("result").or_else(|| map.remove("Result"))
}

impl Envelope {
    pub fn payload(self) -> Value {
        match self {
            Self::Wrapped(v) | Self::Bare(v) => v,
        }
    }

    /// Payload as a list. `null` is an empty list.
    pub fn into_list(self, url: &str) -> Result<Vec<Value>, ClientError> {
        match self.payload() {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(malformed(url, format!("expected an array, got {}", kind(&other)))),
        }
    }

    /// Payload as an object. `null` is an empty object.
    pub fn into_map(self, url: &str) -> Result<Map<String, Value>, ClientError> {
        match self.payload() {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(malformed(url, format!("expected an object, got {}", kind(&other)))),
        }
    }
}

/// `{ "<enumValue>": "<label>" }` → stages, in key order.
pub fn stages_from_lookup(envelope: Envelope, url: &str) -> Result<Vec<Stage>, ClientError> {
    envelope
        .into_map(url)?
        .into_iter()
        .map(|(value, label)| match label {
            Value::String(title) => Ok(Stage::new(value, title)),
            Value::Number(n) => Ok(Stage::new(value, n.to_string())),
            other => Err(malformed(
                url,
                format!("stage '{}' has a {} label", value, kind(&other)),
            )),
        })
        .collect()
}

pub fn records_from_list(envelope: Envelope, url: &str) -> Result<Vec<Record>, ClientError> {
    envelope
        .into_list(url)?
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let item_kind = kind(&item);
            Record::from_wire(item)
                .ok_or_else(|| malformed(url, format!("record {} is {}, not an object", i, item_kind)))
        })
        .collect()
}

/// Users → owner filter options. Users without an id are skipped.
pub fn owners_from_list(envelope: Envelope, url: &str) -> Result<Vec<OwnerOption>, ClientError> {
    let users = records_from_list(envelope, url)?;
    Ok(users
        .iter()
        .filter_map(|user| {
            let id = user.key("id").or_else(|| user.key("userId"))?;
            let label = owner_label(user).unwrap_or_else(|| format!("User #{}", id));
            Some(OwnerOption { id, label })
        })
        .collect())
}

fn owner_label(user: &Record) -> Option<String> {
    if let Some(full) = user.text("fullName") {
        return Some(full);
    }
    let parts: Vec<String> = ["firstName", "lastName"]
        .iter()
        .filter_map(|f| user.text(f))
        .collect();
    if !parts.is_empty() {
        return Some(parts.join(" "));
    }
    user.text("userName").or_else(|| user.text("email"))
}

fn malformed(url: &str, message: String) -> ClientError {
    ClientError::Malformed {
        url: url.to_string(),
        message,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
