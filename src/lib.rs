//! # brrtfn
//!
//! **brrtfn** is a coroutine-powered HTTP dispatcher that exposes plain Rust
//! functions as streaming endpoints, built on the `may` runtime and
//! `may_minihttp`.
//!
//! ## Overview
//!
//! Three kinds of handler can be registered under a name:
//!
//! - a **transform** (`Function`): element stream in, element stream out
//! - a **sink** (`Consumer`): element stream in, nothing out
//! - a **source** (`Supplier`): nothing in, element stream out
//!
//! Each handler carries a declared [`function::FunctionSignature`]. The
//! invoker reads it to decide whether the caller gets back one value or a
//! sequence, without ever inspecting the data itself.
//!
//! ## Architecture
//!
//! - **[`function`]** - signatures, handler traits, the catalog and conversion seams
//! - **[`stream`]** - lazy element streams, replay caching and debug taps
//! - **[`invoker`]** - cardinality rules, payload adaptation, shaping and execution
//! - **[`server`]** - HTTP parsing, response encoding and the `may_minihttp` service
//! - **[`metrics`]** - Prometheus counters served at `/metrics`
//! - **[`builtins`]** - demo functions used by `brrtfn serve`
//! - **[`cli`]**, **[`config`]**, **[`logging`]**, **[`runtime_config`]** - binary plumbing
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as FunctionService<br/>(may_minihttp)
//!     participant Catalog as FunctionRegistry
//!     participant Invoker
//!     participant Sink as Consumer<br/>(coroutine)
//!
//!     Client->>Server: POST /sum [1,2,3]
//!     Server->>Server: parse body / form into RequestPayload
//!     Server->>Catalog: resolve(POST, "/sum")
//!     Catalog-->>Server: Resolution { sum, argument: None }
//!     Server->>Invoker: post(ctx, payload)
//!     Invoker->>Invoker: apply, unpack, tap, shape
//!     Invoker-->>Server: Invocation { 200, lazy stream }
//!     Server->>Server: encode (single / array / SSE)
//!     Server-->>Client: 200 6
//!
//!     Client->>Server: POST /log ["a","b"]
//!     Server->>Invoker: post(ctx, payload)
//!     Invoker->>Sink: spawn accept(cached stream)
//!     Invoker-->>Server: Invocation { 202, replay of input }
//!     Server-->>Client: 202 ["a","b"]
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtfn::function::{ElementKind, FunctionEntry, FunctionRegistry, FunctionSignature, TypeShape};
//! use brrtfn::invoker::{InvocationContext, Invoker, RequestId, RequestPayload};
//! use brrtfn::function::FunctionCatalog;
//! use brrtfn::stream::{self, ElementStream};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = FunctionRegistry::new();
//! registry.register(FunctionEntry::transform(
//!     "double",
//!     FunctionSignature::new(
//!         TypeShape::bare(ElementKind::Integer),
//!         TypeShape::bare(ElementKind::Integer),
//!     ),
//!     |input: ElementStream| stream::map_ok(input, |v| json!(v.as_i64().unwrap_or(0) * 2)),
//! ));
//!
//! let mut ctx = InvocationContext::new(RequestId::new())
//!     .with_path("/double")
//!     .with_resolution(registry.resolve(&http::Method::POST, "/double"))
//!     .with_single_requested(true);
//! let invocation = Invoker::default()
//!     .post(&mut ctx, RequestPayload::from_body(json!(21)))
//!     .unwrap();
//! let out: Vec<_> = invocation.body.collect();
//! assert_eq!(out, vec![Ok(json!(42))]);
//! assert_eq!(ctx.output_single(), Some(true));
//! ```

pub mod builtins;
pub mod cli;
pub mod config;
pub mod error;
pub mod function;
pub mod invoker;
pub mod logging;
pub mod metrics;
pub mod runtime_config;
pub mod server;
pub mod stream;

pub use error::InvocationError;
pub use function::{FunctionCatalog, FunctionEntry, FunctionRegistry, FunctionSignature};
pub use invoker::{InvocationContext, Invoker};
pub use server::{FunctionService, HttpServer, ServerHandle};
