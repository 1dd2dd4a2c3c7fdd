// Copyright (C) 2024-2025 Meshline Systems Inc.
// This file is part of the meshline library.

// The meshline library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The meshline library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the meshline library. If not, see <https://www.gnu.org/licenses/>.

//! The validator pipeline. The base validator runs before dispatch and checks
//! the envelope; the typed param accessors enforce the per-action shape of
//! `params` and fail with the stable `params <field> attribute must be <kind>`
//! messages. Validators are context-aware by construction: a handler only
//! requires the fields its context does not supply implicitly.

use serde_json::{Map, Value};
use uuid::Uuid;

/// A single validation failure: the offending top-level field and the human
/// description of the violation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }

    /// Converts the violation into the single-entry data bag of a failed ack.
    pub fn into_bag(self) -> Value {
        let mut bag = Map::new();
        bag.insert(self.field.into(), Value::String(self.message));
        Value::Object(bag)
    }
}

/// Returns `true` if the given text is a well-formed UUID, in either the
/// canonical 8-4-4-4-12 form or the 32-hex-no-dashes form.
pub fn is_uuid(text: &str) -> bool {
    Uuid::parse_str(text).is_ok()
}

/// The base validator, run by the kernel before dispatch: `transaction_id`
/// must be a string-typed well-formed UUID and `action` a string.
///
/// On failure the error carries the transaction id to echo, if one was
/// already established.
pub fn base(data: &Value) -> Result<Uuid, (Option<Uuid>, Violation)> {
    let transaction_id = match data.get("transaction_id") {
        None => {
            return Err((None, Violation::new("transaction_id", "transaction_id attribute must be present")));
        }
        Some(value) => match value.as_str() {
            None => return Err((None, Violation::new("transaction_id", "transaction_id attribute must be string"))),
            Some(text) => match Uuid::parse_str(text) {
                Err(_) => return Err((None, Violation::new("transaction_id", "transaction_id attribute must be uuid"))),
                Ok(id) => id,
            },
        },
    };

    match data.get("action") {
        None => Err((Some(transaction_id), Violation::new("action", "action attribute must be present"))),
        Some(value) if !value.is_string() => {
            Err((Some(transaction_id), Violation::new("action", "action attribute must be string")))
        }
        Some(_) => Ok(transaction_id),
    }
}

/// Returns the `params` object of a request.
pub fn params(data: &Value) -> Result<&Map<String, Value>, Violation> {
    match data.get("params") {
        None => Err(Violation::new("params", "params attribute must be present")),
        Some(value) => value
            .as_object()
            .ok_or_else(|| Violation::new("params", "params attribute must be object")),
    }
}

fn missing(field: &str) -> Violation {
    Violation::new("params", format!("params {field} attribute must be present"))
}

fn mistyped(field: &str, kind: &str) -> Violation {
    Violation::new("params", format!("params {field} attribute must be {kind}"))
}

/// Returns a required string param.
pub fn string_param<'a>(params: &'a Map<String, Value>, field: &str) -> Result<&'a str, Violation> {
    match params.get(field) {
        None => Err(missing(field)),
        Some(value) => value.as_str().ok_or_else(|| mistyped(field, "string")),
    }
}

/// Returns a required UUID param.
pub fn uuid_param(params: &Map<String, Value>, field: &str) -> Result<Uuid, Violation> {
    let text = string_param(params, field)?;
    Uuid::parse_str(text).map_err(|_| mistyped(field, "uuid"))
}

/// Returns a required numeric param, narrowed to a port.
pub fn port_param(params: &Map<String, Value>, field: &str) -> Result<u16, Violation> {
    match params.get(field) {
        None => Err(missing(field)),
        Some(value) => match value.as_u64() {
            Some(number) => Ok(number as u16),
            None => Err(mistyped(field, "number")),
        },
    }
}

/// Returns a required boolean param.
pub fn bool_param(params: &Map<String, Value>, field: &str) -> Result<bool, Violation> {
    match params.get(field) {
        None => Err(missing(field)),
        Some(value) => value.as_bool().ok_or_else(|| mistyped(field, "boolean")),
    }
}

/// Returns a required object param.
pub fn object_param<'a>(params: &'a Map<String, Value>, field: &str) -> Result<&'a Value, Violation> {
    match params.get(field) {
        None => Err(missing(field)),
        Some(value) if value.is_object() => Ok(value),
        Some(_) => Err(mistyped(field, "object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_accepts_both_uuid_forms() {
        let id = Uuid::new_v4();
        let hyphenated = json!({ "transaction_id": id.to_string(), "action": "ping" });
        let simple = json!({ "transaction_id": id.simple().to_string(), "action": "ping" });

        assert_eq!(base(&hyphenated).unwrap(), id);
        assert_eq!(base(&simple).unwrap(), id);
    }

    #[test]
    fn base_rejects_the_envelope_step_by_step() {
        let cases = [
            (json!({}), "transaction_id", "transaction_id attribute must be present"),
            (json!({ "transaction_id": 7 }), "transaction_id", "transaction_id attribute must be string"),
            (json!({ "transaction_id": "not-a-uuid" }), "transaction_id", "transaction_id attribute must be uuid"),
            (
                json!({ "transaction_id": Uuid::new_v4().to_string() }),
                "action",
                "action attribute must be present",
            ),
            (
                json!({ "transaction_id": Uuid::new_v4().to_string(), "action": 1 }),
                "action",
                "action attribute must be string",
            ),
        ];

        for (data, field, message) in cases {
            let (_, violation) = base(&data).unwrap_err();
            assert_eq!(violation.field, field);
            assert_eq!(violation.message, message);
        }
    }

    #[test]
    fn param_accessors_report_the_stable_messages() {
        let data = json!({ "params": { "channel": 1, "client_id": "nope", "payload": [] } });
        let params = params(&data).unwrap();

        assert_eq!(
            string_param(params, "channel").unwrap_err().message,
            "params channel attribute must be string"
        );
        assert_eq!(
            uuid_param(params, "client_id").unwrap_err().message,
            "params client_id attribute must be uuid"
        );
        assert_eq!(
            object_param(params, "payload").unwrap_err().message,
            "params payload attribute must be object"
        );
        assert_eq!(
            port_param(params, "sessions_port").unwrap_err().message,
            "params sessions_port attribute must be present"
        );

        assert_eq!(
            super::params(&json!({})).unwrap_err().message,
            "params attribute must be present"
        );
        assert_eq!(
            super::params(&json!({ "params": 3 })).unwrap_err().message,
            "params attribute must be object"
        );
    }
}
