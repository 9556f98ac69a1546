use super::request::{parse_request, ParsedRequest};
use super::response::{
    encode_error, encode_invocation, write_response, EncodedResponse, CONTENT_TYPE_PROMETHEUS,
};
use crate::error::{panic_message, InvocationError};
use crate::function::FunctionCatalog;
use crate::invoker::{InvocationContext, Invoker, RequestId};
use crate::metrics::InvocationMetrics;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// HTTP front end: resolves the function, invokes it and encodes the result.
#[derive(Clone)]
pub struct FunctionService {
    catalog: Arc<dyn FunctionCatalog>,
    invoker: Invoker,
    metrics: Arc<InvocationMetrics>,
    debug: bool,
}

impl FunctionService {
    pub fn new(catalog: Arc<dyn FunctionCatalog>, invoker: Invoker) -> Self {
        Self {
            catalog,
            invoker,
            metrics: Arc::new(InvocationMetrics::new()),
            debug: false,
        }
    }

    /// Share a metrics collector with the caller.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<InvocationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Tap every element stream into debug logs.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn metrics(&self) -> &Arc<InvocationMetrics> {
        &self.metrics
    }

    /// Route one parsed request to an encoded response.
    pub fn handle(&self, request: ParsedRequest) -> EncodedResponse {
        let start = Instant::now();

        let method = match request.method {
            Some(ref m) if *m == Method::GET || *m == Method::POST => m.clone(),
            _ => {
                let out = method_not_allowed(&request);
                self.metrics.record_unresolved(out.status, start.elapsed());
                return out;
            }
        };

        if method == Method::GET && request.path == "/health" {
            self.metrics.inc_top_level_request();
            return health_endpoint();
        }
        if method == Method::GET && request.path == "/metrics" {
            self.metrics.inc_top_level_request();
            return metrics_endpoint(&self.metrics);
        }

        let event_stream = request.wants_event_stream();
        let request_id = RequestId::from_header_or_new(request.header("x-request-id"));
        let ParsedRequest { path, payload, .. } = request;

        let single_hint = method == Method::GET || payload.is_single();
        let mut ctx = InvocationContext::new(request_id)
            .with_resolution(self.catalog.resolve(&method, &path))
            .with_path(path)
            .with_single_requested(single_hint)
            .with_debug(self.debug);

        // handlers run lazily while the body is encoded, so both steps are guarded
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let result = if method == Method::POST {
                self.invoker.post(&mut ctx, payload)
            } else {
                self.invoker.get(&mut ctx)
            };
            match result {
                Ok(invocation) => encode_invocation(invocation, ctx.output_single(), event_stream),
                Err(e) => {
                    warn!(
                        request_id = %ctx.request_id(),
                        method = %method,
                        path = %ctx.path(),
                        error = %e,
                        "Invocation failed"
                    );
                    encode_error(&e, None)
                }
            }
        }));

        let out = match outcome {
            Ok(out) => out,
            Err(panic) => {
                let err = InvocationError::from_panic(panic.as_ref());
                error!(
                    request_id = %ctx.request_id(),
                    method = %method,
                    path = %ctx.path(),
                    panic_message = %panic_message(panic.as_ref()),
                    backtrace = %std::backtrace::Backtrace::capture(),
                    "Handler panicked"
                );
                encode_error(&err, None)
            }
        };

        let latency = start.elapsed();
        match ctx.function() {
            Some(entry) => self
                .metrics
                .record_invocation(&entry.name, out.status, latency),
            None => self.metrics.record_unresolved(out.status, latency),
        }
        info!(
            request_id = %ctx.request_id(),
            method = %method,
            path = %ctx.path(),
            status = out.status,
            output_single = ?ctx.output_single(),
            latency_ms = latency.as_millis() as u64,
            "Request complete"
        );
        out
    }
}

/// `{"status":"ok"}`
pub fn health_endpoint() -> EncodedResponse {
    EncodedResponse::json(200, &json!({ "status": "ok" }))
}

/// Prometheus text exposition of the service counters.
pub fn metrics_endpoint(metrics: &InvocationMetrics) -> EncodedResponse {
    EncodedResponse::text(200, CONTENT_TYPE_PROMETHEUS, metrics.render())
}

fn method_not_allowed(request: &ParsedRequest) -> EncodedResponse {
    let method = request
        .method
        .as_ref()
        .map(Method::as_str)
        .unwrap_or("<invalid>");
    EncodedResponse::json(
        405,
        &json!({ "error": "Method Not Allowed", "method": method, "path": request.path }),
    )
}

impl HttpService for FunctionService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let encoded = self.handle(parse_request(req));
        write_response(res, encoded);
        Ok(())
    }
}
