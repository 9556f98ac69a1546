//! Payload Source Adapter: request body or form parameters to an element stream.

use crate::stream::{self, ElementStream};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline form/query parameters before heap allocation
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated, order-preserving, multi-valued parameter list
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Decoded inbound payload: structured body and/or form parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPayload {
    /// Decoded body; `None` when absent or undecodable
    pub body: Option<Value>,
    /// Form fields and query parameters, in arrival order
    pub form: ParamVec,
}

impl RequestPayload {
    #[must_use]
    pub fn new(body: Option<Value>, form: ParamVec) -> Self {
        Self { body, form }
    }

    #[must_use]
    pub fn from_body(body: Value) -> Self {
        Self {
            body: Some(body),
            form: ParamVec::new(),
        }
    }

    #[must_use]
    pub fn from_form<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Arc<str>>,
        V: Into<String>,
    {
        Self {
            body: None,
            form: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn structured_body(&self) -> Option<&Value> {
        self.body.as_ref().filter(|b| !b.is_null())
    }

    /// Whether the request carries exactly one value: a non-array body, or
    /// a form producing a single record.
    #[must_use]
    pub fn is_single(&self) -> bool {
        match self.structured_body() {
            Some(body) => !body.is_array(),
            None => form_records(&self.form).len() == 1,
        }
    }

    /// Lazy element sequence for this payload.
    ///
    /// The body wins when present: an array yields one element per item, any
    /// other value yields itself. Without a body, form parameters are grouped
    /// by name and element *i* holds the *i*-th value of each name. No body
    /// and no parameters yields an empty sequence.
    #[must_use]
    pub fn into_stream(self) -> ElementStream {
        match self.body {
            Some(Value::Null) | None => stream::from_values(form_records(&self.form)),
            Some(Value::Array(items)) => stream::from_values(items),
            Some(other) => stream::just(other),
        }
    }
}

fn form_records(form: &ParamVec) -> Vec<Value> {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for (name, value) in form {
        let name: &str = name;
        match grouped.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value.as_str()),
            None => grouped.push((name, vec![value.as_str()])),
        }
    }
    let depth = grouped.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
    (0..depth)
        .map(|i| {
            let record: Map<String, Value> = grouped
                .iter()
                .filter_map(|(name, values)| {
                    values
                        .get(i)
                        .map(|v| ((*name).to_string(), Value::from(*v)))
                })
                .collect();
            Value::Object(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collect(payload: RequestPayload) -> Vec<Value> {
        payload.into_stream().map(|e| e.unwrap()).collect()
    }

    #[test]
    fn test_scalar_body_is_one_element() {
        let p = RequestPayload::from_body(json!(5));
        assert!(p.is_single());
        assert_eq!(collect(p), vec![json!(5)]);
    }

    #[test]
    fn test_array_body_is_flattened() {
        let p = RequestPayload::from_body(json!([1, 2, 3]));
        assert!(!p.is_single());
        assert_eq!(collect(p), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_empty_array_body_is_empty_sequence() {
        let p = RequestPayload::from_body(json!([]));
        assert!(collect(p).is_empty());
    }

    #[test]
    fn test_body_wins_over_form() {
        let mut p = RequestPayload::from_form([("a", "1")]);
        p.body = Some(json!({"x": true}));
        assert_eq!(collect(p), vec![json!({"x": true})]);
    }

    #[test]
    fn test_null_body_falls_back_to_form() {
        let mut p = RequestPayload::from_form([("a", "1"), ("b", "2")]);
        p.body = Some(Value::Null);
        assert!(p.is_single());
        assert_eq!(collect(p), vec![json!({"a": "1", "b": "2"})]);
    }

    #[test]
    fn test_multi_valued_form_yields_one_record_per_value() {
        let p = RequestPayload::from_form([("a", "1"), ("b", "2"), ("a", "3")]);
        assert!(!p.is_single());
        assert_eq!(
            collect(p),
            vec![json!({"a": "1", "b": "2"}), json!({"a": "3"})]
        );
    }

    #[test]
    fn test_nothing_is_empty_not_error() {
        let p = RequestPayload::default();
        assert!(!p.is_single());
        assert!(collect(p).is_empty());
    }
}
