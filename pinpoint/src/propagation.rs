//! Context propagation ports.
//!
//! The agent reads and writes a small, fixed set of `Pinpoint-*` headers.
//! It never touches a transport directly: the host adapts its framework's
//! carrier (HTTP headers, gRPC metadata, message attributes, …) to the
//! [`TraceContextReader`] / [`TraceContextWriter`] ports below.

use std::collections::HashMap;

pub const HEADER_TRACE_ID: &str = "Pinpoint-TraceID";
pub const HEADER_SPAN_ID: &str = "Pinpoint-SpanID";
pub const HEADER_PARENT_SPAN_ID: &str = "Pinpoint-pSpanID";
pub const HEADER_SAMPLED: &str = "Pinpoint-Sampled";
pub const HEADER_FLAGS: &str = "Pinpoint-Flags";
pub const HEADER_PARENT_APP_NAME: &str = "Pinpoint-pAppName";
pub const HEADER_PARENT_APP_TYPE: &str = "Pinpoint-pAppType";
pub const HEADER_PARENT_APP_NAMESPACE: &str = "Pinpoint-pAppNamespace";
pub const HEADER_HOST: &str = "Pinpoint-Host";

/// Value written to [`HEADER_SAMPLED`] when a trace is not sampled.
pub const SAMPLED_FALSE: &str = "s0";

/// Reads propagation fields from an inbound carrier.
pub trait TraceContextReader {
    fn get(&self, key: &str) -> Option<String>;
}

/// Writes propagation fields into an outbound carrier.
pub trait TraceContextWriter {
    fn set(&mut self, key: &str, value: &str);
}

impl<S: std::hash::BuildHasher> TraceContextReader for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl<S: std::hash::BuildHasher> TraceContextWriter for HashMap<String, String, S> {
    fn set(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

/// Reader that never yields a value; used when a span is started without
/// inbound context.
#[derive(Debug, Default)]
pub struct EmptyContextReader;

impl TraceContextReader for EmptyContextReader {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}
