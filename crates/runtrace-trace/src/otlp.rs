//! OTLP/JSON encoding of trace documents.
//!
//! Mirrors the protobuf JSON mapping used by `POST /v1/traces`: ids are
//! lowercase hex, timestamps are nanoseconds since the epoch rendered as
//! strings, and 64-bit integers are strings too.

use chrono::{DateTime, Utc};
use runtrace_core::{AttributeValue, Resource, Span, SpanKind, StatusCode, Trace};
use serde::{Deserialize, Serialize};

/// Instrumentation scope reported for every exported span.
pub const SCOPE_NAME: &str = "runtrace";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTraceServiceRequest {
    pub resource_spans: Vec<ResourceSpans>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpans {
    pub resource: OtlpResource,
    pub scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtlpResource {
    pub attributes: Vec<OtlpKeyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSpans {
    pub scope: InstrumentationScope,
    pub spans: Vec<OtlpSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentationScope {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtlpSpan {
    pub trace_id: String,
    pub span_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_span_id: String,
    pub name: String,
    pub kind: i32,
    pub start_time_unix_nano: String,
    pub end_time_unix_nano: String,
    pub status: OtlpStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtlpStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtlpKeyValue {
    pub key: String,
    pub value: AnyValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyValue {
    #[serde(rename = "stringValue")]
    String(String),
    /// int64 is carried as a decimal string in OTLP/JSON.
    #[serde(rename = "intValue")]
    Int(String),
}

impl From<&AttributeValue> for AnyValue {
    fn from(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::String(s) => AnyValue::String(s.clone()),
            AttributeValue::Int(i) => AnyValue::Int(i.to_string()),
        }
    }
}

impl From<&Resource> for OtlpResource {
    fn from(resource: &Resource) -> Self {
        Self {
            attributes: resource
                .iter()
                .map(|kv| OtlpKeyValue {
                    key: kv.key.clone(),
                    value: AnyValue::from(&kv.value),
                })
                .collect(),
        }
    }
}

impl From<&Span> for OtlpSpan {
    fn from(span: &Span) -> Self {
        Self {
            trace_id: span.trace_id.to_hex(),
            span_id: span.span_id.to_hex(),
            parent_span_id: span.parent_span_id.map(|id| id.to_hex()).unwrap_or_default(),
            name: span.name.clone(),
            kind: span_kind(span.kind),
            start_time_unix_nano: unix_nanos(span.start_time),
            end_time_unix_nano: unix_nanos(span.end_time),
            status: OtlpStatus {
                message: span.status.message.clone(),
                code: status_code(span.status.code),
            },
        }
    }
}

impl From<&Trace> for ExportTraceServiceRequest {
    fn from(trace: &Trace) -> Self {
        Self {
            resource_spans: vec![ResourceSpans {
                resource: OtlpResource::from(&trace.resource),
                scope_spans: vec![ScopeSpans {
                    scope: InstrumentationScope {
                        name: SCOPE_NAME.to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                    },
                    spans: trace.spans.iter().map(OtlpSpan::from).collect(),
                }],
            }],
        }
    }
}

fn span_kind(kind: SpanKind) -> i32 {
    match kind {
        SpanKind::Internal => 1,
        SpanKind::Server => 2,
        SpanKind::Client => 3,
        SpanKind::Producer => 4,
        SpanKind::Consumer => 5,
    }
}

fn status_code(code: StatusCode) -> i32 {
    match code {
        StatusCode::Unset => 0,
        StatusCode::Ok => 1,
        StatusCode::Error => 2,
    }
}

/// Nanoseconds since the epoch; times before 1970 or past 2262 clamp to 0.
fn unix_nanos(time: DateTime<Utc>) -> String {
    time.timestamp_nanos_opt()
        .filter(|n| *n >= 0)
        .unwrap_or_default()
        .to_string()
}
