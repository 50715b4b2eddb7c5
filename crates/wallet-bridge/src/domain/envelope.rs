//! Wire envelopes exchanged with the signing context.
//!
//! Request:  `{ "id": string, "capability": string, "payload": any }`
//! Response: `{ "id": string, "outcome": { "ok": true, "value": any } }`
//!        or `{ "id": string, "outcome": { "ok": false, "error": string } }`

use crate::domain::correlation::RequestId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Outbound request. Immutable once handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestEnvelope {
    /// Correlation id, echoed by the response
    pub id: RequestId,
    /// Registered capability name
    pub capability: String,
    /// Capability-specific payload, validated by the signing context
    pub payload: Value,
}

/// Result reported by the signing context
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure(String),
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Outcome::Success(value) => {
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("value", value)?;
            }
            Outcome::Failure(reason) => {
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("error", reason)?;
            }
        }
        map.end()
    }
}

/// Inbound response, produced only by parsing a validated message body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub id: RequestId,
    pub outcome: Outcome,
}

/// Reasons a message body is not a Response Envelope
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEnvelope {
    #[error("body is not an object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("unexpected field '{0}'")]
    UnexpectedField(String),
    #[error("field '{0}' has the wrong type")]
    WrongType(&'static str),
    #[error("id is not a valid request id")]
    InvalidId,
}

impl ResponseEnvelope {
    /// Successful response
    pub fn success(id: RequestId, value: Value) -> Self {
        Self {
            id,
            outcome: Outcome::Success(value),
        }
    }

    /// Failed response
    pub fn failure(id: RequestId, reason: impl Into<String>) -> Self {
        Self {
            id,
            outcome: Outcome::Failure(reason.into()),
        }
    }

    /// Wire form of this envelope.
    pub fn to_json(&self) -> Value {
        serde_json::json!({ "id": self.id, "outcome": self.outcome })
    }

    /// Strictly parse a message body.
    ///
    /// Exactly `id` and `outcome` at the top level; exactly `ok` plus one of
    /// `value`/`error` inside the outcome.
    pub fn parse(body: &Value) -> Result<Self, MalformedEnvelope> {
        let fields = body.as_object().ok_or(MalformedEnvelope::NotAnObject)?;
        only_fields(fields, &["id", "outcome"])?;

        let id = fields
            .get("id")
            .ok_or(MalformedEnvelope::MissingField("id"))?
            .as_str()
            .ok_or(MalformedEnvelope::WrongType("id"))?;
        let id = RequestId::parse(id).map_err(|_| MalformedEnvelope::InvalidId)?;

        let outcome = fields
            .get("outcome")
            .ok_or(MalformedEnvelope::MissingField("outcome"))?
            .as_object()
            .ok_or(MalformedEnvelope::WrongType("outcome"))?;

        let ok = outcome
            .get("ok")
            .ok_or(MalformedEnvelope::MissingField("ok"))?
            .as_bool()
            .ok_or(MalformedEnvelope::WrongType("ok"))?;

        let outcome = if ok {
            only_fields(outcome, &["ok", "value"])?;
            let value = outcome
                .get("value")
                .ok_or(MalformedEnvelope::MissingField("value"))?;
            Outcome::Success(value.clone())
        } else {
            only_fields(outcome, &["ok", "error"])?;
            let reason = outcome
                .get("error")
                .ok_or(MalformedEnvelope::MissingField("error"))?
                .as_str()
                .ok_or(MalformedEnvelope::WrongType("error"))?;
            Outcome::Failure(reason.to_string())
        };

        Ok(Self { id, outcome })
    }
}

fn only_fields(fields: &Map<String, Value>, allowed: &[&str]) -> Result<(), MalformedEnvelope> {
    match fields.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(extra) => Err(MalformedEnvelope::UnexpectedField(extra.clone())),
        None => Ok(()),
    }
}
