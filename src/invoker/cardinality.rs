//! Cardinality derived from a function's declared signature.
//!
//! Both checks are pure and cheap; they are recomputed for every invocation
//! and never stored.

use crate::function::{ContainerKind, ElementKind, FunctionSignature};

/// True when the function takes a stream of values rather than one value:
/// the input element is itself a collection, or the input is declared as a
/// sequence.
#[must_use]
pub fn is_input_multiple(signature: &FunctionSignature) -> bool {
    signature.input.element == ElementKind::Collection
        || signature.input.container == ContainerKind::Sequence
}

/// True when the function produces exactly one value.
///
/// Check order matters: a lazy pull-sequence element is always unbounded,
/// even inside a wrapper that would otherwise mean "single".
#[must_use]
pub fn is_output_single(signature: &FunctionSignature) -> bool {
    if signature.output.element == ElementKind::LazySequence {
        return false;
    }
    if signature.output.container == ContainerKind::Bare {
        return true;
    }
    matches!(
        signature.output.container,
        ContainerKind::Future | ContainerKind::Optional
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::TypeShape;
    use proptest::prelude::*;

    const ELEMENTS: [ElementKind; 7] = [
        ElementKind::Integer,
        ElementKind::Number,
        ElementKind::Boolean,
        ElementKind::Text,
        ElementKind::Json,
        ElementKind::Collection,
        ElementKind::LazySequence,
    ];

    const CONTAINERS: [ContainerKind; 6] = [
        ContainerKind::Bare,
        ContainerKind::Collection,
        ContainerKind::Sequence,
        ContainerKind::Future,
        ContainerKind::Optional,
        ContainerKind::LazySequence,
    ];

    fn output(element: ElementKind, container: ContainerKind) -> FunctionSignature {
        FunctionSignature::supplier(TypeShape::new(element, container))
    }

    fn input(element: ElementKind, container: ContainerKind) -> FunctionSignature {
        FunctionSignature::consumer(TypeShape::new(element, container))
    }

    #[test]
    fn test_default_signature_is_single_in_single_out() {
        let sig = FunctionSignature::default();
        assert!(!is_input_multiple(&sig));
        assert!(is_output_single(&sig));
    }

    #[test]
    fn test_output_wrappers() {
        assert!(is_output_single(&output(ElementKind::Text, ContainerKind::Bare)));
        assert!(is_output_single(&output(ElementKind::Text, ContainerKind::Future)));
        assert!(is_output_single(&output(ElementKind::Text, ContainerKind::Optional)));
        assert!(!is_output_single(&output(ElementKind::Text, ContainerKind::Sequence)));
        assert!(!is_output_single(&output(ElementKind::Text, ContainerKind::Collection)));
        assert!(!is_output_single(&output(
            ElementKind::Text,
            ContainerKind::LazySequence
        )));
    }

    #[test]
    fn test_lazy_sequence_element_wins_over_single_wrapper() {
        assert!(!is_output_single(&output(
            ElementKind::LazySequence,
            ContainerKind::Bare
        )));
        assert!(!is_output_single(&output(
            ElementKind::LazySequence,
            ContainerKind::Future
        )));
        assert!(!is_output_single(&output(
            ElementKind::LazySequence,
            ContainerKind::Optional
        )));
    }

    #[test]
    fn test_input_multiplicity() {
        assert!(is_input_multiple(&input(ElementKind::Integer, ContainerKind::Sequence)));
        assert!(is_input_multiple(&input(ElementKind::Collection, ContainerKind::Bare)));
        assert!(!is_input_multiple(&input(ElementKind::Integer, ContainerKind::Bare)));
        assert!(!is_input_multiple(&input(ElementKind::Integer, ContainerKind::Future)));
    }

    proptest! {
        #[test]
        fn prop_lazy_sequence_output_never_single(c in 0usize..CONTAINERS.len()) {
            prop_assert!(!is_output_single(&output(ElementKind::LazySequence, CONTAINERS[c])));
        }

        #[test]
        fn prop_sequence_input_always_multiple(e in 0usize..ELEMENTS.len()) {
            prop_assert!(is_input_multiple(&input(ELEMENTS[e], ContainerKind::Sequence)));
        }
    }
}
