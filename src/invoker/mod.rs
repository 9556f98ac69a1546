//! # Invoker Module
//!
//! Turns a resolved function plus an inbound payload into a lazy output
//! stream and a shaping decision.
//!
//! ## Pipeline
//!
//! ```text
//! RequestPayload ──► ElementStream ──► Function / Consumer / Supplier
//!                                          │
//!                         (message unpack, debug tap)
//!                                          │
//!                                          ▼
//!                           shape() ──► InvocationContext::output_single
//! ```
//!
//! - [`cardinality`] reads declared signatures (input multiple, output single)
//! - [`payload`] adapts the request body or form parameters into elements
//! - [`shaper`] collapses output to one element when the rules say so
//! - [`engine`] executes transforms inline and sinks on their own coroutine
//!
//! Nothing here encodes bytes; the transport reads the recorded decision and
//! serializes the stream.

pub mod cardinality;
pub mod context;
pub mod engine;
pub mod payload;
pub mod shaper;

pub use cardinality::{is_input_multiple, is_output_single};
pub use context::{InvocationContext, RequestId};
pub use engine::{Invocation, InvocationStatus, Invoker};
pub use payload::{ParamVec, RequestPayload, MAX_INLINE_PARAMS};
pub use shaper::{shape, ShapeDecision};
