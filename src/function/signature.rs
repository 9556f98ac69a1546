use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of the individual elements a function consumes or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Integer,
    Number,
    Boolean,
    Text,
    /// Arbitrary JSON value
    #[default]
    Json,
    /// The element is itself a collection (e.g. a list of items)
    Collection,
    /// The element is a lazy pull-sequence (iterator/generator style)
    LazySequence,
}

impl ElementKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Integer => "integer",
            ElementKind::Number => "number",
            ElementKind::Boolean => "boolean",
            ElementKind::Text => "text",
            ElementKind::Json => "json",
            ElementKind::Collection => "collection",
            ElementKind::LazySequence => "lazy_sequence",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wrapper a function declares around its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// No wrapper: the function takes or returns one element directly
    #[default]
    Bare,
    Collection,
    /// Push-sequence of zero or more elements
    Sequence,
    /// Deferred single value
    Future,
    Optional,
    LazySequence,
}

impl ContainerKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Bare => "bare",
            ContainerKind::Collection => "collection",
            ContainerKind::Sequence => "sequence",
            ContainerKind::Future => "future",
            ContainerKind::Optional => "optional",
            ContainerKind::LazySequence => "lazy_sequence",
        }
    }
}

/// Element kind plus the container wrapped around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TypeShape {
    pub element: ElementKind,
    pub container: ContainerKind,
}

impl TypeShape {
    #[must_use]
    pub const fn new(element: ElementKind, container: ContainerKind) -> Self {
        Self { element, container }
    }

    /// An unwrapped element of the given kind.
    #[must_use]
    pub const fn bare(element: ElementKind) -> Self {
        Self::new(element, ContainerKind::Bare)
    }

    /// A push-sequence of the given kind.
    #[must_use]
    pub const fn sequence(element: ElementKind) -> Self {
        Self::new(element, ContainerKind::Sequence)
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.container {
            ContainerKind::Bare => write!(f, "{}", self.element),
            other => write!(f, "{}<{}>", other.as_str(), self.element),
        }
    }
}

/// Cardinality metadata declared for a function.
///
/// A missing side (e.g. the input of a supplier) keeps the default shape,
/// which is a bare JSON element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FunctionSignature {
    #[serde(default)]
    pub input: TypeShape,
    #[serde(default)]
    pub output: TypeShape,
    /// Output elements are envelopes (payload + metadata) that must be unpacked
    #[serde(default)]
    pub message_output: bool,
}

impl FunctionSignature {
    #[must_use]
    pub const fn new(input: TypeShape, output: TypeShape) -> Self {
        Self {
            input,
            output,
            message_output: false,
        }
    }

    /// Signature for a supplier producing `output`.
    #[must_use]
    pub fn supplier(output: TypeShape) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }

    /// Signature for a consumer accepting `input`.
    #[must_use]
    pub fn consumer(input: TypeShape) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_message_output(mut self) -> Self {
        self.message_output = true;
        self
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input, self.output)?;
        if self.message_output {
            f.write_str(" (message)")?;
        }
        Ok(())
    }
}
