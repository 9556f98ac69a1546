use crate::invoker::{ParamVec, RequestPayload};
use http::Method;
use may_minihttp::Request;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parsed HTTP request data used by `FunctionService`.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method; `None` when the request line carried an invalid token
    pub method: Option<Method>,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Body and form/query parameters
    pub payload: RequestPayload,
}

impl ParsedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// True when the caller asked for Server-Sent Events.
    #[must_use]
    pub fn wants_event_stream(&self) -> bool {
        self.header("accept")
            .is_some_and(|accept| accept.contains("text/event-stream"))
    }
}

/// Parse query string parameters from a URL path, keeping order and repeats.
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.split_once('?') {
        Some((_, query)) => parse_form(query.as_bytes()),
        None => ParamVec::new(),
    }
}

fn parse_form(raw: &[u8]) -> ParamVec {
    url::form_urlencoded::parse(raw)
        .map(|(k, v)| (Arc::<str>::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// Build the payload from the raw path, content type and body bytes.
///
/// A url-encoded form body is appended to the query parameters. Any other
/// non-empty body is decoded as JSON; text that is not JSON becomes a single
/// string value.
pub fn build_payload(raw_path: &str, content_type: Option<&str>, body: &[u8]) -> RequestPayload {
    let mut form = parse_query_params(raw_path);
    let is_form = content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false);

    if body.iter().all(u8::is_ascii_whitespace) {
        return RequestPayload::new(None, form);
    }
    if is_form {
        form.extend(parse_form(body));
        return RequestPayload::new(None, form);
    }

    let parse_start = std::time::Instant::now();
    let decoded = match serde_json::from_slice::<Value>(body) {
        Ok(json) => {
            debug!(
                parse_duration_us = parse_start.elapsed().as_micros() as u64,
                is_array = json.is_array(),
                "JSON body parsed"
            );
            json
        }
        Err(e) => {
            debug!(error = %e, "Body is not JSON, passing it as text");
            Value::String(String::from_utf8_lossy(body).into_owned())
        }
    };
    RequestPayload::new(Some(decoded), form)
}

/// Parse an incoming HTTP request into a [`ParsedRequest`].
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = Method::from_bytes(req.method().as_bytes()).ok();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        debug!(error = %e, "Failed to read request body");
        body.clear();
    }

    let content_type = headers.get("content-type").map(String::as_str);
    if !body.is_empty() {
        info!(
            content_type = content_type.unwrap_or(""),
            body_size_bytes = body.len(),
            "Request body read"
        );
    }
    let payload = build_payload(&raw_path, content_type, &body);

    debug!(
        method = ?method,
        path = %path,
        headers_count = headers.len(),
        form_params = payload.form.len(),
        has_body = payload.body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        payload,
    }
}
