use super::handler::FunctionEntry;
use serde_json::Value;

/// Unwraps message-like output elements before they reach the caller.
///
/// Called once per output element, only for functions whose signature
/// declares `message_output`.
pub trait MessageUnpacker: Send + Sync {
    fn unpack(&self, function: &FunctionEntry, element: Value) -> Value;
}

/// Unpacks `{"headers": {...}, "payload": ...}` envelopes.
///
/// An object carrying a `payload` key yields that payload and drops the
/// metadata; any other element passes through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeUnpacker;

impl MessageUnpacker for EnvelopeUnpacker {
    fn unpack(&self, _function: &FunctionEntry, element: Value) -> Value {
        match element {
            Value::Object(mut map) if map.contains_key("payload") => {
                map.remove("payload").unwrap_or(Value::Null)
            }
            other => other,
        }
    }
}
