//! Response encoding for invocation results.
//!
//! Encoding is split from writing so it can be exercised without a socket:
//! [`encode_invocation`] drains the element stream into an
//! [`EncodedResponse`], and [`write_response`] copies it onto the
//! `may_minihttp` response.

use crate::error::InvocationError;
use crate::invoker::Invocation;
use crate::stream::ElementStream;
use may_minihttp::Response;
use serde_json::{json, Value};
use tracing::warn;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_TYPE_EVENT_STREAM: &str = "text/event-stream";
pub const CONTENT_TYPE_PROMETHEUS: &str = "text/plain; version=0.0.4";

/// Fully buffered response ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl EncodedResponse {
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body: body.to_string().into_bytes(),
        }
    }

    #[must_use]
    pub fn text(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body: body.into_bytes(),
        }
    }

    /// Body decoded as JSON, for tests and logging.
    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.body)
    }
}

pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// JSON error body for a failed invocation, with any elements delivered
/// before the failure under `"partial"`.
#[must_use]
pub fn encode_error(err: &InvocationError, partial: Option<Vec<Value>>) -> EncodedResponse {
    let mut body = json!({ "error": err.to_string() });
    if let Some(delivered) = partial {
        body["partial"] = Value::Array(delivered);
    }
    EncodedResponse::json(err.status_code(), &body)
}

/// Drain `invocation` and encode it.
///
/// `output_single` is the shaping decision recorded on the context; `None`
/// (sink acknowledgements) encodes as a sequence.
pub fn encode_invocation(
    invocation: Invocation,
    output_single: Option<bool>,
    event_stream: bool,
) -> EncodedResponse {
    let status = invocation.status.code();
    if event_stream {
        return encode_event_stream(status, invocation.body);
    }
    if output_single.unwrap_or(false) {
        encode_single(status, invocation.body)
    } else {
        encode_sequence(status, invocation.body)
    }
}

fn encode_single(status: u16, mut body: ElementStream) -> EncodedResponse {
    match body.next() {
        None => EncodedResponse::text(status, CONTENT_TYPE_TEXT, String::new()),
        Some(Ok(Value::String(text))) => EncodedResponse::text(status, CONTENT_TYPE_TEXT, text),
        Some(Ok(value)) => EncodedResponse::json(status, &value),
        Some(Err(e)) => encode_error(&e, None),
    }
}

fn encode_sequence(status: u16, body: ElementStream) -> EncodedResponse {
    let mut delivered = Vec::new();
    for element in body {
        match element {
            Ok(value) => delivered.push(value),
            Err(e) => {
                warn!(error = %e, delivered = delivered.len(), "Sequence failed mid-stream");
                return encode_error(&e, Some(delivered));
            }
        }
    }
    EncodedResponse::json(status, &Value::Array(delivered))
}

/// One `data:` frame per element; a failure appends an `event: error`
/// frame and ends the stream.
fn encode_event_stream(status: u16, body: ElementStream) -> EncodedResponse {
    let mut out = String::new();
    for element in body {
        match element {
            Ok(value) => push_frame(&mut out, None, &value),
            Err(e) => {
                push_frame(&mut out, Some("error"), &json!({ "error": e.to_string() }));
                break;
            }
        }
    }
    EncodedResponse::text(status, CONTENT_TYPE_EVENT_STREAM, out)
}

fn push_frame(out: &mut String, event: Option<&str>, value: &Value) {
    if let Some(event) = event {
        out.push_str("event: ");
        out.push_str(event);
        out.push('\n');
    }
    out.push_str("data: ");
    out.push_str(&value.to_string());
    out.push_str("\n\n");
}

/// Copy an encoded response onto the wire.
pub fn write_response(res: &mut Response, encoded: EncodedResponse) {
    res.status_code(encoded.status as usize, status_reason(encoded.status));
    res.header(content_type_header(encoded.content_type));
    if encoded.content_type == CONTENT_TYPE_EVENT_STREAM {
        res.header("Cache-Control: no-cache");
    }
    res.body_vec(encoded.body);
}

fn content_type_header(content_type: &'static str) -> &'static str {
    match content_type {
        CONTENT_TYPE_JSON => "Content-Type: application/json",
        CONTENT_TYPE_EVENT_STREAM => "Content-Type: text/event-stream",
        CONTENT_TYPE_PROMETHEUS => "Content-Type: text/plain; version=0.0.4",
        _ => "Content-Type: text/plain; charset=utf-8",
    }
}
