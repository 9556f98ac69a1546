//! Invocation metrics in Prometheus text format.
//!
//! Global counters are plain atomics; per-function counters live in a
//! `DashMap` keyed by function name so concurrent requests for different
//! functions never contend on one lock.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters for one function
#[derive(Debug, Default)]
pub struct FunctionStats {
    invocations: AtomicU64,
    errors: AtomicU64,
    total_latency_ns: AtomicU64,
}

impl FunctionStats {
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn average_latency(&self) -> Duration {
        let count = self.invocations();
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

/// Request and invocation counters shared by every connection.
///
/// Latency is measured from request arrival until the encoded response is
/// handed to the server, so it includes draining the element stream.
#[derive(Debug, Default)]
pub struct InvocationMetrics {
    request_count: AtomicUsize,
    top_level_requests: AtomicUsize,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,
    sinks_started: AtomicUsize,
    total_latency_ns: AtomicU64,
    functions: DashMap<Arc<str>, FunctionStats>,
}

impl InvocationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispatched invocation and its outcome status code.
    pub fn record_invocation(&self, function: &str, status: u16, latency: Duration) {
        let nanos = latency.as_nanos() as u64;
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
        match status {
            400..=499 => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            500..=599 => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
            202 => {
                self.sinks_started.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }

        let stats = self.functions.entry(Arc::from(function)).or_default();
        stats.invocations.fetch_add(1, Ordering::Relaxed);
        stats.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
        if status >= 400 {
            stats.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a request that never reached a function (unknown path, bad method).
    pub fn record_unresolved(&self, status: u16, latency: Duration) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if (400..500).contains(&status) {
            self.client_errors.fetch_add(1, Ordering::Relaxed);
        } else if status >= 500 {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// `/health` and `/metrics` hits
    pub fn inc_top_level_request(&self) {
        self.top_level_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn top_level_request_count(&self) -> usize {
        self.top_level_requests.load(Ordering::Relaxed)
    }

    pub fn client_errors(&self) -> usize {
        self.client_errors.load(Ordering::Relaxed)
    }

    pub fn server_errors(&self) -> usize {
        self.server_errors.load(Ordering::Relaxed)
    }

    pub fn sinks_started(&self) -> usize {
        self.sinks_started.load(Ordering::Relaxed)
    }

    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Snapshot of `(invocations, errors)` for one function.
    pub fn function_counts(&self, function: &str) -> Option<(u64, u64)> {
        self.functions
            .get(function)
            .map(|s| (s.invocations(), s.errors()))
    }

    /// Render every counter in Prometheus exposition format.
    pub fn render(&self) -> String {
        let mut out = format!(
            "# HELP brrtfn_requests_total Total number of dispatched requests\n\
             # TYPE brrtfn_requests_total counter\n\
             brrtfn_requests_total {}\n\
             # HELP brrtfn_top_level_requests_total Health and metrics requests\n\
             # TYPE brrtfn_top_level_requests_total counter\n\
             brrtfn_top_level_requests_total {}\n\
             # HELP brrtfn_client_errors_total Requests answered with a 4xx status\n\
             # TYPE brrtfn_client_errors_total counter\n\
             brrtfn_client_errors_total {}\n\
             # HELP brrtfn_server_errors_total Requests answered with a 5xx status\n\
             # TYPE brrtfn_server_errors_total counter\n\
             brrtfn_server_errors_total {}\n\
             # HELP brrtfn_sinks_started_total Consumers started in the background\n\
             # TYPE brrtfn_sinks_started_total counter\n\
             brrtfn_sinks_started_total {}\n\
             # HELP brrtfn_request_latency_seconds Average request latency in seconds\n\
             # TYPE brrtfn_request_latency_seconds gauge\n\
             brrtfn_request_latency_seconds {}\n",
            self.request_count(),
            self.top_level_request_count(),
            self.client_errors(),
            self.server_errors(),
            self.sinks_started(),
            self.average_latency().as_secs_f64(),
        );

        let mut names: Vec<Arc<str>> = self
            .functions
            .iter()
            .map(|e| Arc::clone(e.key()))
            .collect();
        names.sort();
        if names.is_empty() {
            return out;
        }

        out.push_str(
            "# HELP brrtfn_function_invocations_total Invocations per function\n\
             # TYPE brrtfn_function_invocations_total counter\n",
        );
        for name in &names {
            if let Some(stats) = self.functions.get(name) {
                out.push_str(&format!(
                    "brrtfn_function_invocations_total{{function=\"{name}\"}} {}\n",
                    stats.invocations()
                ));
            }
        }
        out.push_str(
            "# HELP brrtfn_function_errors_total Failed invocations per function\n\
             # TYPE brrtfn_function_errors_total counter\n",
        );
        for name in &names {
            if let Some(stats) = self.functions.get(name) {
                out.push_str(&format!(
                    "brrtfn_function_errors_total{{function=\"{name}\"}} {}\n",
                    stats.errors()
                ));
            }
        }
        out.push_str(
            "# HELP brrtfn_function_latency_seconds Average latency per function\n\
             # TYPE brrtfn_function_latency_seconds gauge\n",
        );
        for name in &names {
            if let Some(stats) = self.functions.get(name) {
                out.push_str(&format!(
                    "brrtfn_function_latency_seconds{{function=\"{name}\"}} {}\n",
                    stats.average_latency().as_secs_f64()
                ));
            }
        }
        out
    }
}
