//! No-op implementations of the tracing traits.
//!
//! Returned whenever tracing is disabled, a span is filtered out, or an
//! internal fault forces a degrade: callers keep a fully functional handle
//! that records nothing.

use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use crate::annotation::Annotation;
use crate::propagation::{TraceContextReader, TraceContextWriter};
use crate::trace::{
    Agent, AgentPtr, CallStackReader, HeaderReader, HeaderType, Span, SpanEvent, SpanEventPtr,
    SpanPtr, TraceId,
};

/// A span that ignores every call.
#[derive(Debug, Default)]
pub struct NoopSpan;

/// A span event that ignores every call.
#[derive(Debug, Default)]
pub struct NoopSpanEvent;

/// An agent that only ever hands out no-op spans.
#[derive(Debug, Default)]
pub struct NoopAgent;

/// Shared no-op span handle.
pub fn noop_span() -> SpanPtr {
    static INSTANCE: OnceLock<Arc<NoopSpan>> = OnceLock::new();
    INSTANCE.get_or_init(|| Arc::new(NoopSpan)).clone()
}

/// Shared no-op span event handle.
pub fn noop_span_event() -> SpanEventPtr {
    static INSTANCE: OnceLock<Arc<NoopSpanEvent>> = OnceLock::new();
    INSTANCE.get_or_init(|| Arc::new(NoopSpanEvent)).clone()
}

/// Shared no-op agent handle.
pub fn noop_agent() -> AgentPtr {
    static INSTANCE: OnceLock<Arc<NoopAgent>> = OnceLock::new();
    INSTANCE.get_or_init(|| Arc::new(NoopAgent)).clone()
}

impl Span for NoopSpan {
    fn new_span_event(&self, _operation: &str) -> SpanEventPtr {
        noop_span_event()
    }

    fn new_span_event_with_type(&self, _operation: &str, _service_type: i32) -> SpanEventPtr {
        noop_span_event()
    }

    fn span_event(&self) -> SpanEventPtr {
        noop_span_event()
    }

    fn end_span_event(&self) {}

    fn end_span(&self) {}

    fn new_async_span(&self, _async_operation: &str) -> SpanPtr {
        noop_span()
    }

    fn inject_context(&self, _writer: &mut dyn TraceContextWriter) {}

    fn extract_context(&self, _reader: &dyn TraceContextReader) {}

    fn set_logging(&self, _writer: &mut dyn TraceContextWriter) {}

    fn trace_id(&self) -> TraceId {
        TraceId::default()
    }

    fn span_id(&self) -> i64 {
        0
    }

    fn is_sampled(&self) -> bool {
        false
    }

    fn set_service_type(&self, _service_type: i32) {}
    fn set_start_time(&self, _start_time: SystemTime) {}
    fn set_remote_address(&self, _address: &str) {}
    fn set_end_point(&self, _end_point: &str) {}
    fn set_error(&self, _error_message: &str) {}
    fn set_error_with_name(&self, _error_name: &str, _error_message: &str) {}
    fn set_error_with_callstack(
        &self,
        _error_name: &str,
        _error_message: &str,
        _reader: &dyn CallStackReader,
    ) {
    }
    fn set_status_code(&self, _status: i32) {}
    fn set_url_stat(&self, _url_pattern: &str, _method: &str, _status_code: i32) {}
    fn record_header(&self, _which: HeaderType, _reader: &dyn HeaderReader) {}

    fn annotations(&self) -> Arc<Annotation> {
        Arc::new(Annotation::new())
    }
}

impl SpanEvent for NoopSpanEvent {
    fn set_service_type(&self, _service_type: i32) {}
    fn set_operation_name(&self, _operation: &str) {}
    fn set_start_time(&self, _start_time: SystemTime) {}
    fn set_destination(&self, _dest: &str) {}
    fn set_end_point(&self, _end_point: &str) {}
    fn set_error(&self, _error_message: &str) {}
    fn set_error_with_name(&self, _error_name: &str, _error_message: &str) {}
    fn set_sql_query(&self, _sql_query: &str, _args: &str) {}
    fn record_header(&self, _which: HeaderType, _reader: &dyn HeaderReader) {}

    fn annotations(&self) -> Arc<Annotation> {
        Arc::new(Annotation::new())
    }
}

impl Agent for NoopAgent {
    fn new_span(&self, _operation: &str, _rpc_point: &str) -> SpanPtr {
        noop_span()
    }

    fn new_span_with_reader(
        &self,
        _operation: &str,
        _rpc_point: &str,
        _reader: &dyn TraceContextReader,
    ) -> SpanPtr {
        noop_span()
    }

    fn new_span_with_method(
        &self,
        _operation: &str,
        _rpc_point: &str,
        _method: &str,
        _reader: &dyn TraceContextReader,
    ) -> SpanPtr {
        noop_span()
    }

    fn enable(&self) -> bool {
        false
    }

    fn shutdown(&self) {}
}
