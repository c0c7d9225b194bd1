//! Trace documents produced from webhook events.

use crate::ids::{SpanId, TraceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resource plus the spans it produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub resource: Resource,
    pub spans: Vec<Span>,
}

impl Trace {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            spans: Vec::new(),
        }
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Spans with no parent inside this trace document.
    pub fn root_spans(&self) -> impl Iterator<Item = &Span> {
        self.spans.iter().filter(|s| s.parent_span_id.is_none())
    }

    pub fn children_of(&self, parent: SpanId) -> impl Iterator<Item = &Span> {
        self.spans
            .iter()
            .filter(move |s| s.parent_span_id == Some(parent))
    }
}

/// Attribute value. Only the two shapes the receiver emits are modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Int(i64),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: AttributeValue,
}

/// Attributes describing the CI job or run that produced a trace.
///
/// Keys are unique; insertion order is preserved for stable output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    attributes: Vec<KeyValue>,
}

impl Resource {
    /// Set an attribute, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|kv| kv.key == key) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(KeyValue { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| &kv.value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            AttributeValue::String(s) => Some(s),
            AttributeValue::Int(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub parent_span_id: Option<SpanId>,
    pub name: String,
    pub kind: SpanKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Internal,
    #[default]
    Server,
    Client,
    Producer,
    Consumer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Status for a step or run, carrying its conclusion as the message.
    pub fn from_conclusion(conclusion: &str) -> Self {
        Self::new(StatusCode::from_conclusion(conclusion), conclusion)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    #[default]
    Unset,
    Ok,
    Error,
}

impl StatusCode {
    /// `success` maps to `Ok`, `failure` to `Error`; anything else
    /// (`skipped`, `cancelled`, `neutral`, empty) stays `Unset`.
    pub fn from_conclusion(conclusion: &str) -> Self {
        match conclusion {
            "success" => StatusCode::Ok,
            "failure" => StatusCode::Error,
            _ => StatusCode::Unset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resource_insert_replaces() {
        let mut resource = Resource::default();
        resource.insert("service.name", "first");
        resource.insert("ci.github.run_id", 42i64);
        resource.insert("service.name", "second");

        assert_eq!(resource.len(), 2);
        assert_eq!(resource.get_str("service.name"), Some("second"));
        assert_eq!(resource.get("ci.github.run_id"), Some(&AttributeValue::Int(42)));
        assert_eq!(resource.get_str("ci.github.run_id"), None);
    }

    #[test]
    fn test_resource_preserves_order() {
        let mut resource = Resource::default();
        resource.insert("b", "1");
        resource.insert("a", "2");
        let keys: Vec<&str> = resource.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_status_from_conclusion() {
        assert_eq!(StatusCode::from_conclusion("success"), StatusCode::Ok);
        assert_eq!(StatusCode::from_conclusion("failure"), StatusCode::Error);
        assert_eq!(StatusCode::from_conclusion("skipped"), StatusCode::Unset);
        assert_eq!(StatusCode::from_conclusion(""), StatusCode::Unset);

        let status = Status::from_conclusion("cancelled");
        assert_eq!(status, Status::new(StatusCode::Unset, "cancelled"));
    }

    #[test]
    fn test_root_and_children() {
        let trace_id = TraceId::from_bytes([1; 16]);
        let root_id = SpanId::from_bytes([2; 8]);
        let span = |id: [u8; 8], parent: Option<SpanId>| Span {
            trace_id,
            span_id: SpanId::from_bytes(id),
            parent_span_id: parent,
            name: "s".into(),
            kind: SpanKind::Server,
            start_time: DateTime::<Utc>::default(),
            end_time: DateTime::<Utc>::default(),
            status: Status::default(),
        };

        let mut trace = Trace::new(Resource::default());
        trace.spans.push(span([2; 8], None));
        trace.spans.push(span([3; 8], Some(root_id)));
        trace.spans.push(span([4; 8], Some(root_id)));

        assert_eq!(trace.span_count(), 3);
        assert_eq!(trace.root_spans().count(), 1);
        assert_eq!(trace.children_of(root_id).count(), 2);
    }
}
