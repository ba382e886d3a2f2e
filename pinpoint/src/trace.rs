//! Core tracing types: trace identifiers, well-known type codes and the
//! object-safe traits implemented by the SDK (and by the no-op fallbacks).

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::annotation::Annotation;
use crate::propagation::{TraceContextReader, TraceContextWriter};

/// Application type registered for this agent family.
pub const APP_TYPE_RUST: i32 = 1300;
/// Service type recorded for plain function spans and events.
pub const SERVICE_TYPE_FUNC: i32 = 1301;
/// Service type recorded for outbound HTTP client events.
pub const SERVICE_TYPE_HTTP_CLIENT: i32 = 9800;
/// Service type of the synthetic root event of an async span.
pub const SERVICE_TYPE_ASYNC: i32 = 100;

pub const DEFAULT_APP_TYPE: i32 = APP_TYPE_RUST;
pub const DEFAULT_SERVICE_TYPE: i32 = SERVICE_TYPE_FUNC;

/// API metadata type codes, uploaded together with interned operation names.
pub const API_TYPE_DEFAULT: i32 = 0;
pub const API_TYPE_WEB_REQUEST: i32 = 100;
pub const API_TYPE_INVOCATION: i32 = 200;

/// Marker for "not an async span" / "no async fan-out yet".
pub const NONE_ASYNC_ID: i32 = 0;

/// Identifies one distributed trace: the triple of the agent that started
/// it, that agent's start time and a per-agent sequence number.
///
/// The textual form joins the three fields with `^` and is what travels in
/// the `Pinpoint-TraceID` header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceId {
    pub agent_id: String,
    pub start_time: i64,
    pub sequence: i64,
}

impl TraceId {
    /// Parses the `agent^start^seq` textual form.
    ///
    /// Parsing is deliberately lenient: missing or garbled numeric parts
    /// become 0 so that a half-broken upstream header still yields a
    /// usable (if degenerate) id rather than an error.
    pub fn parse(value: &str) -> TraceId {
        let mut parts = value.splitn(3, '^');
        let agent_id = parts.next().unwrap_or_default().to_string();
        let start_time = parts
            .next()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        let sequence = parts
            .next()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        TraceId {
            agent_id,
            start_time,
            sequence,
        }
    }

    /// True when all three fields hold their default values.
    pub fn is_empty(&self) -> bool {
        self.agent_id.is_empty() && self.start_time == 0 && self.sequence == 0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}^{}", self.agent_id, self.start_time, self.sequence)
    }
}

/// Which header family a [`HeaderReader`] is presenting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderType {
    Request,
    Response,
    Cookie,
}

/// Read-only view over a host framework's header map.
///
/// The host adapts its own request/response types to this port; the agent
/// never depends on an HTTP framework directly.
pub trait HeaderReader {
    fn get(&self, key: &str) -> Option<String>;

    /// Visits every header. The callback returns `false` to stop early.
    fn for_each(&self, f: &mut dyn FnMut(&str, &str) -> bool);
}

/// Visitor port over a captured call stack, one frame per call.
///
/// Arguments are `(module, function, file, line)`.
pub trait CallStackReader {
    fn for_each(&self, f: &mut dyn FnMut(&str, &str, &str, i32));
}

pub type SpanPtr = Arc<dyn Span>;
pub type SpanEventPtr = Arc<dyn SpanEvent>;
pub type AgentPtr = Arc<dyn Agent>;

/// One traced unit of work inside this process; the root of an event tree.
///
/// Handles use interior mutability so they can be shared across threads;
/// every method on a finished span is a silent no-op.
pub trait Span: Send + Sync {
    /// Opens a child event with the default service type.
    fn new_span_event(&self, operation: &str) -> SpanEventPtr;

    /// Opens a child event with an explicit service type.
    fn new_span_event_with_type(&self, operation: &str, service_type: i32) -> SpanEventPtr;

    /// Returns the innermost open event.
    fn span_event(&self) -> SpanEventPtr;

    /// Closes the innermost open event.
    fn end_span_event(&self);

    /// Finishes the span and hands the final chunk to the agent.
    /// Idempotent; a second call only logs a warning.
    fn end_span(&self);

    /// Creates a child span continuing work spawned by the current event,
    /// linked via `(async_id, sequence)`.
    fn new_async_span(&self, async_operation: &str) -> SpanPtr;

    /// Writes outbound propagation headers through the current event.
    fn inject_context(&self, writer: &mut dyn TraceContextWriter);

    /// Populates the span from inbound propagation headers.
    fn extract_context(&self, reader: &dyn TraceContextReader);

    /// Marks the span as log-correlated and writes the `PtxId` / `PspanId`
    /// keys the log pipeline picks up.
    fn set_logging(&self, writer: &mut dyn TraceContextWriter);

    fn trace_id(&self) -> TraceId;
    fn span_id(&self) -> i64;
    fn is_sampled(&self) -> bool;

    fn set_service_type(&self, service_type: i32);
    fn set_start_time(&self, start_time: SystemTime);
    fn set_remote_address(&self, address: &str);
    fn set_end_point(&self, end_point: &str);
    fn set_error(&self, error_message: &str);
    fn set_error_with_name(&self, error_name: &str, error_message: &str);
    fn set_error_with_callstack(
        &self,
        error_name: &str,
        error_message: &str,
        reader: &dyn CallStackReader,
    );

    /// Records the HTTP status code and flags the span as errored when the
    /// configured status-error patterns match.
    fn set_status_code(&self, status: i32);

    /// Attaches a URL statistics entry, reported when the span ends.
    fn set_url_stat(&self, url_pattern: &str, method: &str, status_code: i32);

    /// Records configured server-side headers as annotations.
    fn record_header(&self, which: HeaderType, reader: &dyn HeaderReader);

    fn annotations(&self) -> Arc<Annotation>;
}

/// One node in a span's call tree, bracketed by
/// [`Span::new_span_event`] / [`Span::end_span_event`].
pub trait SpanEvent: Send + Sync {
    fn set_service_type(&self, service_type: i32);
    fn set_operation_name(&self, operation: &str);
    fn set_start_time(&self, start_time: SystemTime);
    fn set_destination(&self, dest: &str);
    fn set_end_point(&self, end_point: &str);
    fn set_error(&self, error_message: &str);
    fn set_error_with_name(&self, error_name: &str, error_message: &str);

    /// Normalizes the query, interns it through the SQL cache and records
    /// the matching annotation.
    fn set_sql_query(&self, sql_query: &str, args: &str);

    /// Records configured client-side headers as annotations.
    fn record_header(&self, which: HeaderType, reader: &dyn HeaderReader);

    fn annotations(&self) -> Arc<Annotation>;
}

/// Process-wide tracer entry point.
pub trait Agent: Send + Sync {
    /// Starts a span with no inbound context (a locally rooted trace).
    fn new_span(&self, operation: &str, rpc_point: &str) -> SpanPtr;

    /// Starts a span, extracting inbound context from `reader`.
    fn new_span_with_reader(
        &self,
        operation: &str,
        rpc_point: &str,
        reader: &dyn TraceContextReader,
    ) -> SpanPtr;

    /// Starts an HTTP server span, additionally applying the configured
    /// method exclusion filter.
    fn new_span_with_method(
        &self,
        operation: &str,
        rpc_point: &str,
        method: &str,
        reader: &dyn TraceContextReader,
    ) -> SpanPtr;

    fn enable(&self) -> bool;

    /// Stops workers and drains queues; idempotent.
    fn shutdown(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_id_round_trip() {
        let tid = TraceId {
            agent_id: "agent-1".to_string(),
            start_time: 1700000000000,
            sequence: 42,
        };
        let parsed = TraceId::parse(&tid.to_string());
        assert_eq!(parsed, tid);
    }

    #[test]
    fn trace_id_parse_is_lenient() {
        let parsed = TraceId::parse("only-agent");
        assert_eq!(parsed.agent_id, "only-agent");
        assert_eq!(parsed.start_time, 0);
        assert_eq!(parsed.sequence, 0);

        let parsed = TraceId::parse("a^not-a-number^7");
        assert_eq!(parsed.agent_id, "a");
        assert_eq!(parsed.start_time, 0);
        assert_eq!(parsed.sequence, 7);
    }

    #[test]
    fn trace_id_empty() {
        assert!(TraceId::default().is_empty());
        assert!(!TraceId::parse("a^1^2").is_empty());
    }
}
