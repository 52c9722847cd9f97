//! W3C trace-context propagation for outgoing requests.
//!
//! Header manipulation is done by hand to stay independent of the
//! OpenTelemetry crate versions.

use http::{HeaderMap, HeaderName, HeaderValue};

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

/// Build a fresh sampled `traceparent` value: `00-<trace-id>-<span-id>-01`.
pub fn new_traceparent() -> String {
    let trace_id = format!("{:032x}", rand::random::<u128>());
    let span_id = format!("{:016x}", rand::random::<u64>());
    format!("00-{trace_id}-{span_id}-01")
}

/// Insert a `traceparent` header unless the caller already set one.
/// Returns the trace id that the request carries.
pub fn inject_trace_context(headers: &mut HeaderMap) -> Option<String> {
    if let Some(existing) = headers.get(TRACEPARENT).and_then(|v| v.to_str().ok()) {
        return parse_trace_id(existing);
    }
    let traceparent = new_traceparent();
    let trace_id = parse_trace_id(&traceparent);
    if let Ok(value) = HeaderValue::from_str(&traceparent) {
        headers.insert(HeaderName::from_static(TRACEPARENT), value);
    }
    trace_id
}

/// Parse trace ID from traceparent header
pub fn parse_trace_id(traceparent: &str) -> Option<String> {
    let parts: Vec<&str> = traceparent.split('-').collect();
    if parts.len() >= 4 && parts[0] == "00" && parts[1].len() == 32 {
        Some(parts[1].to_string())
    } else {
        None
    }
}
