//! # Element Streams
//!
//! Every function invocation is modelled as a lazy, pull-based sequence of
//! JSON values. An [`ElementStream`] is an ordinary boxed iterator: pulling
//! the next element drives the upstream producer, and dropping the stream
//! abandons whatever work the producer had left. Nothing here spawns or
//! blocks on its own; the transport materializes the sequence.
//!
//! Failures travel in-band as `Err` elements so that a handler can deliver
//! part of a sequence before terminating it with an error.
//!
//! - [`CachedStream`] shares one cold upstream between several cursors
//!   (used to echo a sink's input back to the caller).
//! - [`tap`] logs each element as it flows past without altering it.

mod cache;
mod tap;

pub use cache::{CachedStream, Replay};
pub use tap::tap;

use crate::error::InvocationError;
use serde_json::Value;

/// A single element of a sequence, or the failure that terminated it.
pub type Element = Result<Value, InvocationError>;

/// Lazy, ordered, single-pass sequence of elements.
pub type ElementStream = Box<dyn Iterator<Item = Element> + Send>;

/// A sequence with no elements.
#[must_use]
pub fn empty() -> ElementStream {
    Box::new(std::iter::empty())
}

/// A sequence with exactly one successful element.
#[must_use]
pub fn just(value: Value) -> ElementStream {
    Box::new(std::iter::once(Ok(value)))
}

/// A sequence of successful elements taken from `values`.
pub fn from_values<I>(values: I) -> ElementStream
where
    I: IntoIterator<Item = Value>,
    I::IntoIter: Send + 'static,
{
    Box::new(values.into_iter().map(Ok))
}

/// A sequence that fails immediately.
#[must_use]
pub fn failed(err: InvocationError) -> ElementStream {
    Box::new(std::iter::once(Err(err)))
}

/// Apply `f` to every successful element, passing failures through.
pub fn map_ok<F>(stream: ElementStream, f: F) -> ElementStream
where
    F: FnMut(Value) -> Value + Send + 'static,
{
    let mut f = f;
    Box::new(stream.map(move |el| el.map(&mut f)))
}

/// Apply a fallible `f` to every successful element.
pub fn try_map<F>(stream: ElementStream, f: F) -> ElementStream
where
    F: FnMut(Value) -> Element + Send + 'static,
{
    let mut f = f;
    Box::new(stream.map(move |el| el.and_then(&mut f)))
}

/// Keep at most the first element, dropping the upstream afterwards.
#[must_use]
pub fn first(stream: ElementStream) -> ElementStream {
    Box::new(stream.take(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_stops_pulling_upstream() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulled);
        let upstream: ElementStream = Box::new((0..).map(move |i| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!(i))
        }));

        let collected: Vec<_> = first(upstream).collect();
        assert_eq!(collected, vec![Ok(json!(0))]);
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_map_ok_passes_failures_through() {
        let upstream: ElementStream = Box::new(
            vec![Ok(json!(1)), Err(InvocationError::execution("bad")), Ok(json!(3))].into_iter(),
        );
        let out: Vec<_> = map_ok(upstream, |v| json!(v.as_i64().unwrap_or(0) * 10)).collect();
        assert_eq!(
            out,
            vec![
                Ok(json!(10)),
                Err(InvocationError::execution("bad")),
                Ok(json!(30))
            ]
        );
    }

    #[test]
    fn test_try_map_turns_value_into_failure() {
        let out: Vec<_> = try_map(from_values(vec![json!("x")]), |_| {
            Err(InvocationError::execution("nope"))
        })
        .collect();
        assert_eq!(out, vec![Err(InvocationError::execution("nope"))]);
    }

    #[test]
    fn test_empty_and_just() {
        assert_eq!(empty().count(), 0);
        assert_eq!(just(json!(5)).collect::<Vec<_>>(), vec![Ok(json!(5))]);
    }
}
