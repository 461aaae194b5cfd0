//! NDJSON event classification
//!
//! Wire shapes:
//!
//! ```text
//! {"type":"status","message":"Analyzing 10 candidates..."}
//! {"type":"result","data":{"company":{"cin":"..."},"fitScore":82,"rationale":"..."}}
//! ```
//!
//! Only identity and score are extracted from `data`; the object itself is
//! kept verbatim as the result payload. Every other shape becomes
//! [`StreamEvent::Malformed`], never an error.

use crate::config::DecoderConfig;
use rankstream_domain::{
    MalformedReason, RankedItem, StreamEvent,
    value_objects::{ItemId, Score},
};
use serde_json::{Map, Value as JsonValue};

const TYPE_FIELD: &str = "type";
const STATUS_TYPE: &str = "status";
const RESULT_TYPE: &str = "result";

/// Line-to-event classifier
#[derive(Debug, Clone)]
pub struct EventDecoder {
    score_pointer: String,
    identity_pointers: Vec<String>,
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

impl EventDecoder {
    /// Create a decoder using the configured field locations
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            score_pointer: config.score_pointer.clone(),
            identity_pointers: config.identity_pointers.clone(),
        }
    }

    /// Classify one complete line
    pub fn decode(&self, line: &str) -> StreamEvent {
        match self.classify(line) {
            Ok(event) => event,
            Err(reason) => StreamEvent::Malformed {
                raw_text: line.to_owned(),
                reason,
            },
        }
    }

    fn classify(&self, line: &str) -> Result<StreamEvent, MalformedReason> {
        let value: JsonValue = serde_json::from_str(line)
            .map_err(|e| MalformedReason::InvalidJson(e.to_string()))?;
        let JsonValue::Object(mut object) = value else {
            return Err(MalformedReason::NotAnObject);
        };

        let kind = match object.get(TYPE_FIELD) {
            Some(JsonValue::String(kind)) => kind.clone(),
            _ => return Err(MalformedReason::MissingDiscriminant),
        };

        match kind.as_str() {
            STATUS_TYPE => decode_status(&mut object),
            RESULT_TYPE => self.decode_result(&mut object),
            _ => Err(MalformedReason::UnknownType(kind)),
        }
    }

    fn decode_result(
        &self,
        object: &mut Map<String, JsonValue>,
    ) -> Result<StreamEvent, MalformedReason> {
        let data = match object.remove("data") {
            Some(data @ JsonValue::Object(_)) => data,
            Some(_) => {
                return Err(MalformedReason::InvalidField {
                    field: "data".to_string(),
                    message: "expected an object".to_string(),
                });
            }
            None => return Err(MalformedReason::MissingField("data".to_string())),
        };

        let score = self.extract_score(&data)?;
        let id = self.extract_identity(&data)?;
        Ok(StreamEvent::Result(RankedItem::new(id, score, data)))
    }

    fn extract_score(&self, data: &JsonValue) -> Result<Score, MalformedReason> {
        let field = &self.score_pointer;
        let raw = data
            .pointer(field)
            .ok_or_else(|| MalformedReason::MissingField(field.clone()))?;
        let number = raw.as_f64().ok_or_else(|| MalformedReason::InvalidField {
            field: field.clone(),
            message: format!("expected a number, got {raw}"),
        })?;
        Score::new(number).map_err(|e| MalformedReason::InvalidField {
            field: field.clone(),
            message: e.to_string(),
        })
    }

    fn extract_identity(&self, data: &JsonValue) -> Result<ItemId, MalformedReason> {
        for pointer in &self.identity_pointers {
            let candidate = match data.pointer(pointer) {
                Some(JsonValue::String(text)) if !text.trim().is_empty() => text.clone(),
                Some(JsonValue::Number(number)) => number.to_string(),
                _ => continue,
            };
            return ItemId::new(candidate).map_err(|e| MalformedReason::InvalidField {
                field: pointer.clone(),
                message: e.to_string(),
            });
        }
        Err(MalformedReason::MissingField(self.identity_pointers.join(" | ")))
    }
}

fn decode_status(object: &mut Map<String, JsonValue>) -> Result<StreamEvent, MalformedReason> {
    match object.remove("message") {
        Some(JsonValue::String(message)) => Ok(StreamEvent::Status { message }),
        Some(_) => Err(MalformedReason::InvalidField {
            field: "message".to_string(),
            message: "expected a string".to_string(),
        }),
        None => Err(MalformedReason::MissingField("message".to_string())),
    }
}
