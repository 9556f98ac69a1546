//! Response Shaper: single value or sequence.

use super::cardinality::{is_input_multiple, is_output_single};
use super::context::InvocationContext;
use crate::function::FunctionSignature;
use crate::stream::{self, ElementStream};
use tracing::debug;

/// Why the shaper chose its output cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeDecision {
    /// Caller asked for a single value and the function produces one
    RequestedSingle,
    /// Many-to-one function: the output is one aggregate
    Aggregate,
    /// Everything else is streamed
    Multiple,
}

impl ShapeDecision {
    /// Decide the output shape; first matching rule wins.
    #[must_use]
    pub fn decide(signature: &FunctionSignature, single_requested: bool) -> Self {
        let output_single = is_output_single(signature);
        if single_requested && output_single {
            ShapeDecision::RequestedSingle
        } else if is_input_multiple(signature) && output_single {
            ShapeDecision::Aggregate
        } else {
            ShapeDecision::Multiple
        }
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        !matches!(self, ShapeDecision::Multiple)
    }
}

/// Collapse `output` to its first element or keep it whole, and record the
/// decision on the context before anything is encoded.
pub fn shape(
    ctx: &mut InvocationContext,
    signature: &FunctionSignature,
    single_requested: bool,
    output: ElementStream,
) -> ElementStream {
    let decision = ShapeDecision::decide(signature, single_requested);
    ctx.record_output_single(decision.is_single());
    debug!(
        request_id = %ctx.request_id(),
        decision = ?decision,
        single_requested = single_requested,
        "Output shaped"
    );
    if decision.is_single() {
        stream::first(output)
    } else {
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{ContainerKind, ElementKind, TypeShape};
    use serde_json::json;

    fn sig(input: ContainerKind, output: ContainerKind) -> FunctionSignature {
        FunctionSignature::new(
            TypeShape::new(ElementKind::Integer, input),
            TypeShape::new(ElementKind::Integer, output),
        )
    }

    fn three() -> ElementStream {
        stream::from_values(vec![json!(1), json!(2), json!(3)])
    }

    #[test]
    fn test_requested_single_collapses() {
        let mut ctx = InvocationContext::default();
        let out: Vec<_> = shape(
            &mut ctx,
            &sig(ContainerKind::Bare, ContainerKind::Bare),
            true,
            three(),
        )
        .collect();
        assert_eq!(out, vec![Ok(json!(1))]);
        assert_eq!(ctx.output_single(), Some(true));
    }

    #[test]
    fn test_many_to_one_collapses_without_hint() {
        let mut ctx = InvocationContext::default();
        let signature = sig(ContainerKind::Sequence, ContainerKind::Future);
        assert_eq!(
            ShapeDecision::decide(&signature, false),
            ShapeDecision::Aggregate
        );
        let out: Vec<_> = shape(&mut ctx, &signature, false, three()).collect();
        assert_eq!(out.len(), 1);
        assert_eq!(ctx.output_single(), Some(true));
    }

    #[test]
    fn test_hint_ignored_for_multi_output() {
        let mut ctx = InvocationContext::default();
        let out: Vec<_> = shape(
            &mut ctx,
            &sig(ContainerKind::Bare, ContainerKind::Sequence),
            true,
            three(),
        )
        .collect();
        assert_eq!(out.len(), 3);
        assert_eq!(ctx.output_single(), Some(false));
    }

    #[test]
    fn test_single_output_without_hint_streams() {
        let mut ctx = InvocationContext::default();
        let out: Vec<_> = shape(
            &mut ctx,
            &sig(ContainerKind::Bare, ContainerKind::Bare),
            false,
            three(),
        )
        .collect();
        assert_eq!(out.len(), 3);
        assert_eq!(ctx.output_single(), Some(false));
    }
}
