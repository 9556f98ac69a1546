use super::signature::FunctionSignature;
use crate::stream::ElementStream;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Sequence-to-sequence function.
pub trait Function: Send + Sync + 'static {
    fn apply(&self, input: ElementStream) -> ElementStream;
}

/// Sequence consumer with no return value.
///
/// `accept` runs on its own coroutine and governs its own pace: it may pull
/// the whole input, part of it, or nothing at all.
pub trait Consumer: Send + Sync + 'static {
    fn accept(&self, input: ElementStream);
}

/// Zero-input producer of a sequence.
pub trait Supplier: Send + Sync + 'static {
    fn get(&self) -> ElementStream;
}

impl<F> Function for F
where
    F: Fn(ElementStream) -> ElementStream + Send + Sync + 'static,
{
    fn apply(&self, input: ElementStream) -> ElementStream {
        self(input)
    }
}

impl<F> Consumer for F
where
    F: Fn(ElementStream) + Send + Sync + 'static,
{
    fn accept(&self, input: ElementStream) {
        self(input)
    }
}

impl<F> Supplier for F
where
    F: Fn() -> ElementStream + Send + Sync + 'static,
{
    fn get(&self) -> ElementStream {
        self()
    }
}

/// The one active role a function plays for a request.
#[derive(Clone)]
pub enum Handler {
    Transform(Arc<dyn Function>),
    Sink(Arc<dyn Consumer>),
    Source(Arc<dyn Supplier>),
}

impl Handler {
    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        match self {
            Handler::Transform(_) => HandlerKind::Transform,
            Handler::Sink(_) => HandlerKind::Sink,
            Handler::Source(_) => HandlerKind::Source,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler::{}", self.kind())
    }
}

/// Discriminant of [`Handler`], used for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Transform,
    Sink,
    Source,
}

impl HandlerKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Transform => "transform",
            HandlerKind::Sink => "sink",
            HandlerKind::Source => "source",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named function together with its declared cardinality metadata.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub name: Arc<str>,
    pub signature: FunctionSignature,
    pub handler: Handler,
}

impl FunctionEntry {
    pub fn transform<F>(name: &str, signature: FunctionSignature, function: F) -> Self
    where
        F: Function,
    {
        Self {
            name: Arc::from(name),
            signature,
            handler: Handler::Transform(Arc::new(function)),
        }
    }

    pub fn sink<C>(name: &str, signature: FunctionSignature, consumer: C) -> Self
    where
        C: Consumer,
    {
        Self {
            name: Arc::from(name),
            signature,
            handler: Handler::Sink(Arc::new(consumer)),
        }
    }

    pub fn source<S>(name: &str, signature: FunctionSignature, supplier: S) -> Self
    where
        S: Supplier,
    {
        Self {
            name: Arc::from(name),
            signature,
            handler: Handler::Source(Arc::new(supplier)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        self.handler.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::signature::{ElementKind, TypeShape};
    use crate::stream;
    use serde_json::json;

    #[test]
    fn test_closures_become_handlers() {
        let f = FunctionEntry::transform("id", FunctionSignature::default(), |s: ElementStream| s);
        let c = FunctionEntry::sink("drop", FunctionSignature::default(), |s: ElementStream| {
            drop(s)
        });
        let s = FunctionEntry::source(
            "one",
            FunctionSignature::supplier(TypeShape::bare(ElementKind::Integer)),
            || stream::just(json!(1)),
        );
        assert_eq!(f.kind(), HandlerKind::Transform);
        assert_eq!(c.kind(), HandlerKind::Sink);
        assert_eq!(s.kind(), HandlerKind::Source);
        assert_eq!(format!("{:?}", s.handler), "Handler::source");

        if let Handler::Transform(func) = &f.handler {
            let out: Vec<_> = func.apply(stream::just(json!("x"))).collect();
            assert_eq!(out, vec![Ok(json!("x"))]);
        }
    }
}
