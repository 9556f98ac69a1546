//! # Function Module
//!
//! Types describing the functions a dispatcher can expose, and the
//! collaborator traits the invocation engine consumes:
//!
//! - [`FunctionEntry`] / [`Handler`] - a named transform, sink or source
//! - [`FunctionSignature`] - declared element and container kinds, from which
//!   cardinality is derived
//! - [`FunctionCatalog`] - resolves a request path to a function
//!   ([`FunctionRegistry`] is the in-memory implementation)
//! - [`Converter`] - literal argument to typed value
//! - [`MessageUnpacker`] - envelope unwrap for message-like outputs
//!
//! ## Registering functions
//!
//! ```rust
//! use brrtfn::function::{
//!     ElementKind, FunctionEntry, FunctionRegistry, FunctionSignature, TypeShape,
//! };
//! use brrtfn::stream::{self, ElementStream};
//! use serde_json::json;
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
//! assert_eq!(registry.names(), vec!["double"]);
//! ```

mod catalog;
mod convert;
mod handler;
mod message;
mod signature;

pub use catalog::{FunctionCatalog, FunctionRegistry, Resolution};
pub use convert::{Converter, LiteralConverter};
pub use handler::{Consumer, Function, FunctionEntry, Handler, HandlerKind, Supplier};
pub use message::{EnvelopeUnpacker, MessageUnpacker};
pub use signature::{ContainerKind, ElementKind, FunctionSignature, TypeShape};
