use super::handler::FunctionEntry;
use super::signature::ElementKind;
use crate::error::InvocationError;
use serde_json::Value;

/// Turns a literal string (path argument of a GET request) into a value of
/// the function's declared input element type.
pub trait Converter: Send + Sync {
    fn convert(&self, function: &FunctionEntry, literal: &str) -> Result<Value, InvocationError>;
}

/// Converts literals according to the input [`ElementKind`].
///
/// - `integer`, `number`, `boolean`: parsed, failing with
///   [`InvocationError::Conversion`] when the literal does not parse
/// - `json`: parsed as JSON, falling back to a string
/// - `collection`: comma-separated items as an array of strings
/// - everything else: the literal as a string
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralConverter;

impl Converter for LiteralConverter {
    fn convert(&self, function: &FunctionEntry, literal: &str) -> Result<Value, InvocationError> {
        let expected = function.signature.input.element;
        let conversion_error = || InvocationError::Conversion {
            expected: expected.to_string(),
            value: literal.to_string(),
        };
        match expected {
            ElementKind::Integer => literal
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| conversion_error()),
            ElementKind::Number => literal
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(conversion_error),
            ElementKind::Boolean => literal
                .trim()
                .parse::<bool>()
                .map(Value::from)
                .map_err(|_| conversion_error()),
            ElementKind::Json => {
                Ok(serde_json::from_str(literal).unwrap_or_else(|_| Value::from(literal)))
            }
            ElementKind::Collection => Ok(Value::Array(
                literal
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::from(s.trim()))
                    .collect(),
            )),
            ElementKind::Text | ElementKind::LazySequence => Ok(Value::from(literal)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::signature::{FunctionSignature, TypeShape};
    use crate::stream::ElementStream;
    use serde_json::json;

    fn taking(kind: ElementKind) -> FunctionEntry {
        FunctionEntry::transform(
            "f",
            FunctionSignature::new(TypeShape::bare(kind), TypeShape::default()),
            |s: ElementStream| s,
        )
    }

    #[test]
    fn test_integer_conversion() {
        let c = LiteralConverter;
        assert_eq!(c.convert(&taking(ElementKind::Integer), "42"), Ok(json!(42)));
        assert_eq!(
            c.convert(&taking(ElementKind::Integer), "forty-two"),
            Err(InvocationError::Conversion {
                expected: "integer".into(),
                value: "forty-two".into()
            })
        );
    }

    #[test]
    fn test_number_and_boolean_conversion() {
        let c = LiteralConverter;
        assert_eq!(c.convert(&taking(ElementKind::Number), "2.5"), Ok(json!(2.5)));
        assert!(c.convert(&taking(ElementKind::Number), "NaN").is_err());
        assert_eq!(c.convert(&taking(ElementKind::Boolean), "true"), Ok(json!(true)));
        assert!(c.convert(&taking(ElementKind::Boolean), "yes").is_err());
    }

    #[test]
    fn test_json_text_and_collection_conversion() {
        let c = LiteralConverter;
        assert_eq!(
            c.convert(&taking(ElementKind::Json), r#"{"a":1}"#),
            Ok(json!({"a": 1}))
        );
        assert_eq!(c.convert(&taking(ElementKind::Json), "plain"), Ok(json!("plain")));
        assert_eq!(c.convert(&taking(ElementKind::Text), "42"), Ok(json!("42")));
        assert_eq!(
            c.convert(&taking(ElementKind::Collection), "a, b,,c"),
            Ok(json!(["a", "b", "c"]))
        );
    }
}
