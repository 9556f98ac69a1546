//! Demo functions registered by `brrtfn serve`.
//!
//! | Name | Kind | Signature |
//! |------|------|-----------|
//! | `uppercase` | transform | `text -> text` |
//! | `sum` | transform | `sequence<integer> -> future<integer>` |
//! | `words` | transform | `text -> lazy_sequence` |
//! | `envelope` | transform | `json -> json (message)` |
//! | `log` | sink | `json` |
//! | `greeting` | source | `text` |
//! | `ticks` | source | `sequence<integer>` |

use crate::error::InvocationError;
use crate::function::{
    ContainerKind, ElementKind, FunctionEntry, FunctionRegistry, FunctionSignature, TypeShape,
};
use crate::stream::{self, Element, ElementStream};
use serde_json::{json, Value};
use tracing::info;

/// Number of values emitted by `ticks`
pub const TICK_COUNT: i64 = 5;

/// Register every demo function into `registry`.
pub fn register_builtins(registry: &FunctionRegistry) {
    for entry in builtins() {
        registry.register(entry);
    }
}

/// Demo entries, unregistered.
pub fn builtins() -> Vec<FunctionEntry> {
    vec![
        FunctionEntry::transform(
            "uppercase",
            FunctionSignature::new(
                TypeShape::bare(ElementKind::Text),
                TypeShape::bare(ElementKind::Text),
            ),
            |input: ElementStream| stream::try_map(input, uppercase),
        ),
        FunctionEntry::transform(
            "sum",
            FunctionSignature::new(
                TypeShape::sequence(ElementKind::Integer),
                TypeShape::new(ElementKind::Integer, ContainerKind::Future),
            ),
            sum,
        ),
        FunctionEntry::transform(
            "words",
            FunctionSignature::new(
                TypeShape::bare(ElementKind::Text),
                TypeShape::bare(ElementKind::LazySequence),
            ),
            words,
        ),
        FunctionEntry::transform(
            "envelope",
            FunctionSignature::default().with_message_output(),
            |input: ElementStream| stream::map_ok(input, envelope),
        ),
        FunctionEntry::sink(
            "log",
            FunctionSignature::consumer(TypeShape::bare(ElementKind::Json)),
            log,
        ),
        FunctionEntry::source(
            "greeting",
            FunctionSignature::supplier(TypeShape::bare(ElementKind::Text)),
            || stream::just(json!("hello")),
        ),
        FunctionEntry::source(
            "ticks",
            FunctionSignature::supplier(TypeShape::sequence(ElementKind::Integer)),
            || stream::from_values((1..=TICK_COUNT).map(Value::from)),
        ),
    ]
}

fn uppercase(value: Value) -> Element {
    match value {
        Value::String(s) => Ok(Value::String(s.to_uppercase())),
        other => Err(InvocationError::execution(format!(
            "uppercase expects text, got {other}"
        ))),
    }
}

/// Folds the whole input; nothing is produced until the caller pulls.
fn sum(input: ElementStream) -> ElementStream {
    Box::new(std::iter::once_with(move || -> Element {
        let mut total: i64 = 0;
        for element in input {
            let value = element?;
            let n = as_integer(&value).ok_or_else(|| {
                InvocationError::execution(format!("sum expects integers, got {value}"))
            })?;
            total = total
                .checked_add(n)
                .ok_or_else(|| InvocationError::execution("sum overflowed"))?;
        }
        Ok(Value::from(total))
    }))
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn words(input: ElementStream) -> ElementStream {
    Box::new(input.flat_map(|element| -> Vec<Element> {
        match element {
            Ok(Value::String(text)) => text
                .split_whitespace()
                .map(|w| Ok(Value::from(w)))
                .collect(),
            Ok(other) => vec![Err(InvocationError::execution(format!(
                "words expects text, got {other}"
            )))],
            Err(e) => vec![Err(e)],
        }
    }))
}

fn envelope(value: Value) -> Value {
    json!({
        "payload": value,
        "headers": { "content-type": "application/json" },
    })
}

fn log(input: ElementStream) {
    let mut accepted = 0usize;
    for element in input {
        match element {
            Ok(value) => {
                accepted += 1;
                info!(target: "brrtfn::sink::log", element = %value, "Accepted element");
            }
            Err(e) => {
                info!(target: "brrtfn::sink::log", error = %e, "Input failed");
                break;
            }
        }
    }
    info!(target: "brrtfn::sink::log", accepted, "Input complete");
}
