//! Span lifecycle: the root record of a trace within this process.
//!
//! A [`SpanImpl`] owns its event stack behind one mutex. Finished events
//! accumulate until `span.event_chunk_size` of them are ready, at which
//! point a non-final [`SpanChunk`] is emitted; `end_span` emits the final
//! chunk carrying the root frame. Chunks are owned snapshots so the queue
//! payload shares nothing mutable with live handles.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use pinpoint::annotation::{Annotation, AnnotationValue, ANNOTATION_EXCEPTION_ID,
    ANNOTATION_HTTP_STATUS_CODE};
use pinpoint::noop::{noop_span, noop_span_event};
use pinpoint::propagation::{
    TraceContextReader, TraceContextWriter, HEADER_FLAGS, HEADER_HOST, HEADER_PARENT_APP_NAME,
    HEADER_PARENT_APP_NAMESPACE, HEADER_PARENT_APP_TYPE, HEADER_PARENT_SPAN_ID, HEADER_SAMPLED,
    HEADER_SPAN_ID, HEADER_TRACE_ID, SAMPLED_FALSE,
};
use pinpoint::trace::{
    CallStackReader, HeaderReader, HeaderType, Span, SpanEvent, SpanEventPtr, SpanPtr, TraceId,
    API_TYPE_INVOCATION, API_TYPE_WEB_REQUEST, NONE_ASYNC_ID, SERVICE_TYPE_ASYNC,
};
use tracing::warn;

use crate::agent::AgentService;
use crate::trace::span_event::{SpanEventData, SpanEventImpl};
use crate::url_stat::UrlStatEntry;
use crate::util;

static ASYNC_ID_GEN: AtomicI32 = AtomicI32::new(1);
static EXCEPTION_ID_GEN: AtomicI64 = AtomicI64::new(1);

const SPAN_ERR_NONE: i32 = 0;
const SPAN_ERR_SET: i32 = 1;
const LOGGING_FLAG_OFF: i32 = 0;
const LOGGING_FLAG_ON: i32 = 1;

const LOG_TRACE_ID_KEY: &str = "PtxId";
const LOG_SPAN_ID_KEY: &str = "PspanId";

/// One captured call-stack frame.
#[derive(Clone, Debug)]
pub struct StackFrame {
    pub module: String,
    pub function: String,
    pub file: String,
    pub line: i32,
}

/// One captured exception, uploaded as metadata when call-stack tracing
/// is enabled.
#[derive(Clone, Debug)]
pub struct Exception {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub frames: Vec<StackFrame>,
}

impl Exception {
    fn capture(name: &str, message: &str, reader: &dyn CallStackReader) -> Exception {
        let mut frames = Vec::new();
        reader.for_each(&mut |module, function, file, line| {
            frames.push(StackFrame {
                module: module.to_string(),
                function: function.to_string(),
                file: file.to_string(),
                line,
            });
        });
        Exception {
            id: EXCEPTION_ID_GEN.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            message: message.to_string(),
            frames,
        }
    }
}

/// Exception upload payload handed to the metadata queue.
#[derive(Clone, Debug)]
pub struct ExceptionMeta {
    pub trace_id: TraceId,
    pub span_id: i64,
    pub uri_template: String,
    pub exceptions: Vec<Exception>,
}

struct SpanFields {
    trace_id: TraceId,
    span_id: i64,
    parent_span_id: i64,
    parent_app_name: String,
    parent_app_type: i32,
    parent_app_namespace: String,
    app_type: i32,
    service_type: i32,
    operation: String,
    api_id: i32,
    rpc_name: String,
    endpoint: String,
    remote_addr: String,
    acceptor_host: String,
    event_sequence: i32,
    event_depth: i32,
    logging_flag: i32,
    flags: i32,
    err: i32,
    error_func_id: i32,
    error_string: String,
    start_time: i64,
    end_time: i64,
    elapsed: i32,
    async_id: i32,
    async_sequence: i32,
    overflow: i32,
    finished: bool,
    event_stack: Vec<Arc<SpanEventImpl>>,
    finished_events: Vec<SpanEventData>,
    url_stat: Option<UrlStatEntry>,
    exceptions: Vec<Exception>,
    annotations: Arc<Annotation>,
}

/// Owned snapshot handed to the span transport queue.
#[derive(Clone, Debug)]
pub struct SpanChunk {
    pub trace_id: TraceId,
    pub span_id: i64,
    pub parent_span_id: i64,
    pub parent_app_name: String,
    pub parent_app_type: i32,
    pub acceptor_host: String,
    pub app_type: i32,
    pub service_type: i32,
    pub operation: String,
    pub api_id: i32,
    pub rpc_name: String,
    pub endpoint: String,
    pub remote_addr: String,
    pub flags: i32,
    pub err: i32,
    pub error_func_id: i32,
    pub error_string: String,
    pub start_time: i64,
    pub elapsed: i32,
    pub async_id: i32,
    pub async_sequence: i32,
    pub logging_flag: i32,
    pub annotations: Vec<(i32, AnnotationValue)>,
    pub(crate) events: Vec<SpanEventData>,
    pub is_final: bool,
    pub key_time: i64,
}

impl SpanChunk {
    fn from_fields(fields: &mut SpanFields, is_final: bool) -> SpanChunk {
        SpanChunk {
            trace_id: fields.trace_id.clone(),
            span_id: fields.span_id,
            parent_span_id: fields.parent_span_id,
            parent_app_name: fields.parent_app_name.clone(),
            parent_app_type: fields.parent_app_type,
            acceptor_host: fields.acceptor_host.clone(),
            app_type: fields.app_type,
            service_type: fields.service_type,
            operation: fields.operation.clone(),
            api_id: fields.api_id,
            rpc_name: fields.rpc_name.clone(),
            endpoint: fields.endpoint.clone(),
            remote_addr: fields.remote_addr.clone(),
            flags: fields.flags,
            err: fields.err,
            error_func_id: fields.error_func_id,
            error_string: fields.error_string.clone(),
            start_time: fields.start_time,
            elapsed: fields.elapsed,
            async_id: fields.async_id,
            async_sequence: fields.async_sequence,
            logging_flag: fields.logging_flag,
            annotations: if is_final {
                fields.annotations.snapshot()
            } else {
                Vec::new()
            },
            events: std::mem::take(&mut fields.finished_events),
            is_final,
            key_time: 0,
        }
    }

    pub fn is_async(&self) -> bool {
        self.async_id != NONE_ASYNC_ID
    }

    pub(crate) fn events(&self) -> &[SpanEventData] {
        &self.events
    }

    /// On-wire compression: events sorted by sequence, start times turned
    /// into deltas, repeated sibling depths zeroed. Authoritative fields
    /// other than the emitted `start_elapsed`/`depth` are untouched.
    pub fn optimize_span_events(&mut self) {
        if self.events.is_empty() {
            return;
        }

        self.events.sort_by_key(|e| e.sequence);

        self.key_time = if self.is_final {
            self.start_time
        } else {
            self.events[0].start_time
        };

        let mut prev_start_time = 0i64;
        let mut prev_depth = 0i32;
        for (i, event) in self.events.iter_mut().enumerate() {
            if i == 0 {
                event.start_elapsed = (event.start_time - self.key_time) as i32;
                prev_depth = event.depth;
            } else {
                event.start_elapsed = (event.start_time - prev_start_time) as i32;
                let cur_depth = event.depth;
                if prev_depth == cur_depth {
                    event.depth = 0;
                }
                prev_depth = cur_depth;
            }
            prev_start_time = event.start_time;
        }
    }
}

/// Fully recording span.
pub struct SpanImpl {
    agent: Arc<dyn AgentService>,
    fields: Mutex<SpanFields>,
}

impl SpanImpl {
    pub(crate) fn new(agent: Arc<dyn AgentService>, operation: &str, rpc_point: &str) -> SpanImpl {
        let api_id = if operation.is_empty() {
            0
        } else {
            agent.cache_api(operation, API_TYPE_WEB_REQUEST)
        };
        let app_type = agent.app_type();
        SpanImpl {
            agent,
            fields: Mutex::new(SpanFields {
                trace_id: TraceId::default(),
                span_id: 0,
                parent_span_id: -1,
                parent_app_name: String::new(),
                parent_app_type: 1,
                parent_app_namespace: String::new(),
                app_type,
                service_type: pinpoint::trace::DEFAULT_SERVICE_TYPE,
                operation: operation.to_string(),
                api_id,
                rpc_name: rpc_point.to_string(),
                endpoint: String::new(),
                remote_addr: String::new(),
                acceptor_host: String::new(),
                event_sequence: 0,
                event_depth: 1,
                logging_flag: LOGGING_FLAG_OFF,
                flags: 0,
                err: SPAN_ERR_NONE,
                error_func_id: 0,
                error_string: String::new(),
                start_time: util::now_millis(),
                end_time: 0,
                elapsed: 0,
                async_id: NONE_ASYNC_ID,
                async_sequence: 0,
                overflow: 0,
                finished: false,
                event_stack: Vec::new(),
                finished_events: Vec::new(),
                url_stat: None,
                exceptions: Vec::new(),
                annotations: Arc::new(Annotation::new()),
            }),
        }
    }

    fn lock_fields(&self) -> std::sync::MutexGuard<'_, SpanFields> {
        match self.fields.lock() {
            Ok(fields) => fields,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record_chunk(&self, chunk: SpanChunk) {
        let mut chunk = chunk;
        chunk.optimize_span_events();
        self.agent.record_span(chunk);
    }

    /// Pops and seals the innermost event; chunk emission is up to the
    /// caller.
    fn finish_top_event(fields: &mut SpanFields) {
        if let Some(event) = fields.event_stack.pop() {
            let data = event.finish();
            fields.event_depth -= 1;
            fields.finished_events.push(data);
        }
    }

    #[cfg(test)]
    pub(crate) fn event_depth(&self) -> i32 {
        self.lock_fields().event_depth
    }
}

impl Span for SpanImpl {
    fn new_span_event(&self, operation: &str) -> SpanEventPtr {
        self.new_span_event_with_type(operation, pinpoint::trace::DEFAULT_SERVICE_TYPE)
    }

    fn new_span_event_with_type(&self, operation: &str, service_type: i32) -> SpanEventPtr {
        let mut fields = self.lock_fields();
        if fields.finished {
            warn!("span is already finished");
            return noop_span_event();
        }

        let config = self.agent.config();
        let depth = fields.event_depth;
        let sequence = fields.event_sequence;
        if depth > config.span.max_event_depth || sequence >= config.span.max_event_sequence {
            fields.overflow += 1;
            warn!(depth, sequence, "span event maximum depth/sequence exceeded");
            return noop_span_event();
        }

        let event = Arc::new(SpanEventImpl::new(
            self.agent.clone(),
            operation,
            sequence,
            depth,
        ));
        event.set_service_type(service_type);
        fields.event_stack.push(event.clone());
        fields.event_sequence += 1;
        fields.event_depth += 1;
        event
    }

    fn span_event(&self) -> SpanEventPtr {
        let fields = self.lock_fields();
        if fields.finished || fields.overflow > 0 {
            return noop_span_event();
        }
        match fields.event_stack.last() {
            Some(event) => event.clone(),
            None => noop_span_event(),
        }
    }

    fn end_span_event(&self) {
        let chunk = {
            let mut fields = self.lock_fields();
            if fields.finished {
                warn!("span is already finished");
                return;
            }
            if fields.overflow > 0 {
                fields.overflow -= 1;
                return;
            }
            if fields.event_stack.is_empty() {
                warn!("no span event to end");
                return;
            }
            Self::finish_top_event(&mut fields);

            let chunk_size = self.agent.config().span.event_chunk_size;
            if fields.finished_events.len() >= chunk_size {
                Some(SpanChunk::from_fields(&mut fields, false))
            } else {
                None
            }
        };

        if let Some(chunk) = chunk {
            self.record_chunk(chunk);
        }
    }

    fn end_span(&self) {
        let chunk = {
            let mut fields = self.lock_fields();
            if fields.finished {
                warn!("span is already finished");
                return;
            }
            fields.finished = true;
            fields.end_time = util::now_millis();
            fields.elapsed = (fields.end_time - fields.start_time) as i32;

            if fields.async_id != NONE_ASYNC_ID {
                // Close the synthetic async-root event.
                Self::finish_top_event(&mut fields);
            } else {
                let stats = self.agent.agent_stats();
                stats.drop_active_span(fields.span_id);
                stats.collect_response_time(i64::from(fields.elapsed));

                if !fields.exceptions.is_empty() {
                    self.agent.record_exception(ExceptionMeta {
                        trace_id: fields.trace_id.clone(),
                        span_id: fields.span_id,
                        uri_template: fields.rpc_name.clone(),
                        exceptions: std::mem::take(&mut fields.exceptions),
                    });
                }
                if let Some(mut url_stat) = fields.url_stat.take() {
                    url_stat.end_time = fields.end_time;
                    url_stat.elapsed = fields.elapsed;
                    self.agent.record_url_stat(url_stat);
                }
            }

            SpanChunk::from_fields(&mut fields, true)
        };

        self.record_chunk(chunk);
    }

    fn new_async_span(&self, async_operation: &str) -> SpanPtr {
        let fields = self.lock_fields();
        if fields.finished || fields.overflow > 0 {
            return noop_span();
        }
        let Some(event) = fields.event_stack.last().cloned() else {
            warn!("async span requires an open span event");
            return noop_span();
        };
        let trace_id = fields.trace_id.clone();
        let span_id = fields.span_id;
        drop(fields);

        if event.async_id() == NONE_ASYNC_ID {
            let mut async_id = ASYNC_ID_GEN.fetch_add(1, Ordering::Relaxed);
            while async_id == NONE_ASYNC_ID {
                async_id = ASYNC_ID_GEN.fetch_add(1, Ordering::Relaxed);
            }
            event.set_async_id(async_id);
        }
        let async_sequence = event.next_async_sequence();

        let async_span = SpanImpl::new(self.agent.clone(), "", "");
        {
            let mut fields = async_span.lock_fields();
            fields.trace_id = trace_id;
            fields.span_id = span_id;
            fields.async_id = event.async_id();
            fields.async_sequence = async_sequence;

            let async_event = Arc::new(SpanEventImpl::new(
                self.agent.clone(),
                "",
                fields.event_sequence,
                fields.event_depth,
            ));
            async_event.set_api_id(self.agent.cache_api(async_operation, API_TYPE_INVOCATION));
            async_event.set_service_type(SERVICE_TYPE_ASYNC);
            fields.event_stack.push(async_event);
            fields.event_sequence += 1;
            fields.event_depth += 1;
        }

        Arc::new(async_span)
    }

    fn inject_context(&self, writer: &mut dyn TraceContextWriter) {
        let fields = self.lock_fields();
        if fields.finished || fields.overflow > 0 {
            return;
        }
        let Some(event) = fields.event_stack.last() else {
            warn!("inject context requires an open span event");
            return;
        };

        let next_span_id = event.generate_next_span_id();
        writer.set(HEADER_TRACE_ID, &fields.trace_id.to_string());
        writer.set(HEADER_SPAN_ID, &next_span_id.to_string());
        writer.set(HEADER_PARENT_SPAN_ID, &fields.span_id.to_string());
        writer.set(HEADER_FLAGS, &fields.flags.to_string());
        writer.set(HEADER_PARENT_APP_NAME, &self.agent.app_name());
        writer.set(HEADER_PARENT_APP_TYPE, &self.agent.app_type().to_string());
        writer.set(HEADER_PARENT_APP_NAMESPACE, "");
        writer.set(HEADER_HOST, &event.destination_id());
    }

    fn extract_context(&self, reader: &dyn TraceContextReader) {
        let mut fields = self.lock_fields();
        if fields.finished {
            return;
        }

        match reader.get(HEADER_TRACE_ID) {
            Some(tid) => fields.trace_id = TraceId::parse(&tid),
            None => fields.trace_id = self.agent.generate_trace_id(),
        }

        match reader.get(HEADER_SPAN_ID).and_then(|v| util::parse_i64(&v)) {
            Some(span_id) => fields.span_id = span_id,
            None => fields.span_id = util::generate_span_id(),
        }

        if let Some(parent_span_id) = reader
            .get(HEADER_PARENT_SPAN_ID)
            .and_then(|v| util::parse_i64(&v))
        {
            fields.parent_span_id = parent_span_id;
        }
        if let Some(parent_app_name) = reader.get(HEADER_PARENT_APP_NAME) {
            fields.parent_app_name = parent_app_name;
        }
        if let Some(parent_app_type) = reader
            .get(HEADER_PARENT_APP_TYPE)
            .and_then(|v| util::parse_i32(&v))
        {
            fields.parent_app_type = parent_app_type;
        }
        if let Some(namespace) = reader.get(HEADER_PARENT_APP_NAMESPACE) {
            fields.parent_app_namespace = namespace;
        }
        if let Some(flags) = reader.get(HEADER_FLAGS).and_then(|v| util::parse_i32(&v)) {
            fields.flags = flags;
        }
        if let Some(host) = reader.get(HEADER_HOST) {
            fields.acceptor_host = host.clone();
            fields.endpoint = host.clone();
            fields.remote_addr = host;
        }

        self.agent
            .agent_stats()
            .add_active_span(fields.span_id, fields.start_time);
    }

    fn set_logging(&self, writer: &mut dyn TraceContextWriter) {
        let mut fields = self.lock_fields();
        if fields.finished {
            return;
        }
        fields.logging_flag = LOGGING_FLAG_ON;
        writer.set(LOG_TRACE_ID_KEY, &fields.trace_id.to_string());
        writer.set(LOG_SPAN_ID_KEY, &fields.span_id.to_string());
    }

    fn trace_id(&self) -> TraceId {
        self.lock_fields().trace_id.clone()
    }

    fn span_id(&self) -> i64 {
        self.lock_fields().span_id
    }

    fn is_sampled(&self) -> bool {
        true
    }

    fn set_service_type(&self, service_type: i32) {
        let mut fields = self.lock_fields();
        if !fields.finished {
            fields.service_type = service_type;
        }
    }

    fn set_start_time(&self, start_time: SystemTime) {
        let mut fields = self.lock_fields();
        if !fields.finished {
            fields.start_time = util::to_millis(start_time);
        }
    }

    fn set_remote_address(&self, address: &str) {
        let mut fields = self.lock_fields();
        if !fields.finished {
            fields.remote_addr = address.to_string();
        }
    }

    fn set_end_point(&self, end_point: &str) {
        let mut fields = self.lock_fields();
        if !fields.finished {
            fields.endpoint = end_point.to_string();
        }
    }

    fn set_error(&self, error_message: &str) {
        self.set_error_with_name("Error", error_message);
    }

    fn set_error_with_name(&self, error_name: &str, error_message: &str) {
        let error_func_id = self.agent.cache_error(error_name);
        let mut fields = self.lock_fields();
        if fields.finished {
            return;
        }
        fields.error_func_id = error_func_id;
        fields.error_string = error_message.to_string();
        fields.err = SPAN_ERR_SET;
    }

    fn set_error_with_callstack(
        &self,
        error_name: &str,
        error_message: &str,
        reader: &dyn CallStackReader,
    ) {
        self.set_error_with_name(error_name, error_message);
        let exception = Exception::capture(error_name, error_message, reader);
        let mut fields = self.lock_fields();
        if fields.finished {
            return;
        }
        fields
            .annotations
            .append_long(ANNOTATION_EXCEPTION_ID, exception.id);
        fields.exceptions.push(exception);
    }

    fn set_status_code(&self, status: i32) {
        let is_fail = self.agent.is_status_fail(status);
        let mut fields = self.lock_fields();
        if fields.finished {
            return;
        }
        fields
            .annotations
            .append_int(ANNOTATION_HTTP_STATUS_CODE, status);
        if is_fail {
            fields.err = SPAN_ERR_SET;
        }
    }

    fn set_url_stat(&self, url_pattern: &str, method: &str, status_code: i32) {
        let mut fields = self.lock_fields();
        if fields.finished {
            return;
        }
        fields.url_stat = Some(UrlStatEntry {
            url_pattern: url_pattern.to_string(),
            method: method.to_string(),
            status_code,
            end_time: 0,
            elapsed: 0,
        });
    }

    fn record_header(&self, which: HeaderType, reader: &dyn HeaderReader) {
        let annotations = {
            let fields = self.lock_fields();
            if fields.finished {
                return;
            }
            fields.annotations.clone()
        };
        self.agent.record_server_header(which, reader, &annotations);
    }

    fn annotations(&self) -> Arc<Annotation> {
        self.lock_fields().annotations.clone()
    }
}

/// Span for traces that are not sampled: it still participates in
/// active-request counting and URL statistics but records no payload and
/// propagates only `Pinpoint-Sampled: s0`.
pub struct UnsampledSpan {
    agent: Arc<dyn AgentService>,
    span_id: i64,
    start_time: i64,
    url_stat: Mutex<Option<UrlStatEntry>>,
    finished: AtomicBool,
}

impl UnsampledSpan {
    pub(crate) fn new(agent: Arc<dyn AgentService>) -> UnsampledSpan {
        let span = UnsampledSpan {
            agent,
            span_id: util::generate_span_id(),
            start_time: util::now_millis(),
            url_stat: Mutex::new(None),
            finished: AtomicBool::new(false),
        };
        span.agent
            .agent_stats()
            .add_active_span(span.span_id, span.start_time);
        span
    }
}

impl Span for UnsampledSpan {
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

    fn end_span(&self) {
        if self.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        let end_time = util::now_millis();
        let elapsed = (end_time - self.start_time) as i32;

        let stats = self.agent.agent_stats();
        stats.collect_response_time(i64::from(elapsed));
        stats.drop_active_span(self.span_id);

        let url_stat = self
            .url_stat
            .lock()
            .map(|mut u| u.take())
            .unwrap_or_default();
        if let Some(mut url_stat) = url_stat {
            url_stat.end_time = end_time;
            url_stat.elapsed = elapsed;
            self.agent.record_url_stat(url_stat);
        }
    }

    fn new_async_span(&self, _async_operation: &str) -> SpanPtr {
        noop_span()
    }

    fn inject_context(&self, writer: &mut dyn TraceContextWriter) {
        writer.set(HEADER_SAMPLED, SAMPLED_FALSE);
    }

    fn extract_context(&self, _reader: &dyn TraceContextReader) {}

    fn set_logging(&self, _writer: &mut dyn TraceContextWriter) {}

    fn trace_id(&self) -> TraceId {
        TraceId::default()
    }

    fn span_id(&self) -> i64 {
        self.span_id
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

    fn set_url_stat(&self, url_pattern: &str, method: &str, status_code: i32) {
        if let Ok(mut url_stat) = self.url_stat.lock() {
            *url_stat = Some(UrlStatEntry {
                url_pattern: url_pattern.to_string(),
                method: method.to_string(),
                status_code,
                end_time: 0,
                elapsed: 0,
            });
        }
    }

    fn record_header(&self, _which: HeaderType, _reader: &dyn HeaderReader) {}

    fn annotations(&self) -> Arc<Annotation> {
        Arc::new(Annotation::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::TestAgentService;
    use pinpoint::propagation::EmptyContextReader;
    use std::collections::HashMap;

    fn agent() -> Arc<TestAgentService> {
        Arc::new(TestAgentService::new())
    }

    fn agent_with(f: impl FnOnce(&mut Config)) -> Arc<TestAgentService> {
        let mut cfg = Config::default();
        f(&mut cfg);
        Arc::new(TestAgentService::with_config(cfg))
    }

    fn sampled_span(agent: &Arc<TestAgentService>) -> SpanImpl {
        let span = SpanImpl::new(agent.clone(), "test.op", "/test");
        span.extract_context(&EmptyContextReader);
        span
    }

    #[test]
    fn minimal_span_records_one_final_chunk() {
        let agent = agent();
        let span = sampled_span(&agent);
        span.end_span();

        let chunks = agent.chunks();
        assert_eq!(chunks.len(), 1);
        let chunk = &chunks[0];
        assert!(chunk.is_final);
        assert!(chunk.events().is_empty());
        assert!(chunk.annotations.is_empty());
        assert!(chunk.api_id > 0);
        assert!(chunk.elapsed >= 0);
        assert!(chunk.span_id != 0);
        assert!(!chunk.trace_id.is_empty());
    }

    #[test]
    fn end_span_is_idempotent() {
        let agent = agent();
        let span = sampled_span(&agent);
        span.end_span();
        span.end_span();
        assert_eq!(agent.chunks().len(), 1);
    }

    #[test]
    fn setters_are_noops_after_end() {
        let agent = agent();
        let span = sampled_span(&agent);
        span.end_span();
        span.set_remote_address("10.0.0.1");
        span.set_status_code(500);
        assert!(span.new_span_event("late").annotations().is_empty());
        span.end_span_event();

        let chunks = agent.chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].remote_addr, "");
        assert_eq!(chunks[0].err, 0);
    }

    #[test]
    fn event_lifecycle_balances_depth() {
        let agent = agent();
        let span = sampled_span(&agent);
        span.new_span_event("a");
        span.new_span_event("b");
        assert_eq!(span.event_depth(), 3);
        span.end_span_event();
        span.end_span_event();
        assert_eq!(span.event_depth(), 1);
        span.end_span();

        let chunks = agent.chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].events().len(), 2);
    }

    #[test]
    fn depth_overflow_keeps_balance_and_drops_extras() {
        let agent = agent_with(|cfg| cfg.span.max_event_depth = 2);
        let span = sampled_span(&agent);
        span.new_span_event("a");
        span.new_span_event("b");
        span.new_span_event("c");
        span.end_span_event();
        span.end_span_event();
        span.end_span_event();
        assert_eq!(span.event_depth(), 1);
        span.end_span();

        let chunks = agent.chunks();
        assert_eq!(chunks.len(), 1);
        let names: Vec<&str> = chunks[0]
            .events()
            .iter()
            .map(|e| e.operation.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn sequence_overflow_drops_events() {
        let agent = agent_with(|cfg| cfg.span.max_event_sequence = 2);
        let span = sampled_span(&agent);
        for _ in 0..4 {
            span.new_span_event("e");
            span.end_span_event();
        }
        span.end_span();
        assert_eq!(agent.chunks()[0].events().len(), 2);
    }

    #[test]
    fn chunk_emitted_when_event_chunk_size_reached() {
        let agent = agent_with(|cfg| cfg.span.event_chunk_size = 2);
        let span = sampled_span(&agent);
        for _ in 0..3 {
            span.new_span_event("e");
            span.end_span_event();
        }
        span.end_span();

        let chunks = agent.chunks();
        assert_eq!(chunks.len(), 2);
        assert!(!chunks[0].is_final);
        assert_eq!(chunks[0].events().len(), 2);
        assert!(chunks[1].is_final);
        assert_eq!(chunks[1].events().len(), 1);
    }

    #[test]
    fn context_round_trip() {
        let agent = agent();
        let parent = sampled_span(&agent);
        parent.new_span_event("outbound");

        let mut carrier: HashMap<String, String> = HashMap::new();
        parent.inject_context(&mut carrier);
        assert!(carrier.contains_key(HEADER_TRACE_ID));

        let child = SpanImpl::new(agent.clone(), "child.op", "/child");
        child.extract_context(&carrier);

        assert_eq!(child.trace_id(), parent.trace_id());
        assert_ne!(child.span_id(), parent.span_id());
        let expected_parent = parent.span_id();
        let child_fields = child.lock_fields();
        assert_eq!(child_fields.parent_span_id, expected_parent);
        assert_eq!(child_fields.parent_app_name, agent.app_name());
    }

    #[test]
    fn inject_without_open_event_writes_nothing() {
        let agent = agent();
        let span = sampled_span(&agent);
        let mut carrier: HashMap<String, String> = HashMap::new();
        span.inject_context(&mut carrier);
        assert!(carrier.is_empty());
    }

    #[test]
    fn chunk_optimization_rewrites_start_elapsed_and_sibling_depth() {
        let agent = agent();
        let span = sampled_span(&agent);
        let start_time = span.lock_fields().start_time;

        span.new_span_event("a");
        span.end_span_event();
        span.new_span_event("b");
        span.end_span_event();
        {
            // Space the events out without sleeping.
            let mut fields = span.lock_fields();
            fields.finished_events[0].start_time = start_time + 5;
            fields.finished_events[1].start_time = start_time + 12;
        }
        span.end_span();

        let chunks = agent.chunks();
        let events = chunks[0].events();
        assert_eq!(chunks[0].key_time, start_time);
        assert_eq!(events[0].start_elapsed, 5);
        assert_eq!(events[0].depth, 1);
        assert_eq!(events[1].start_elapsed, 7);
        // Sibling at the same depth is emitted as zero.
        assert_eq!(events[1].depth, 0);
        assert!(events[0].sequence < events[1].sequence);
    }

    #[test]
    fn non_final_chunk_key_time_is_first_event_start() {
        let agent = agent_with(|cfg| cfg.span.event_chunk_size = 1);
        let span = sampled_span(&agent);
        span.new_span_event("a");
        span.end_span_event();

        let chunks = agent.chunks();
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].is_final);
        assert_eq!(chunks[0].key_time, chunks[0].events()[0].start_time);
        assert_eq!(chunks[0].events()[0].start_elapsed, 0);
    }

    #[test]
    fn error_and_status_code_mark_the_span() {
        let agent = agent();
        let span = sampled_span(&agent);
        span.set_status_code(500);
        span.set_error_with_name("DbError", "boom");
        span.end_span();

        let chunks = agent.chunks();
        assert_eq!(chunks[0].err, 1);
        assert!(chunks[0].error_func_id > 0);
        assert_eq!(chunks[0].error_string, "boom");
        assert_eq!(
            chunks[0].annotations[0],
            (ANNOTATION_HTTP_STATUS_CODE, AnnotationValue::Int(500))
        );
    }

    #[test]
    fn url_stat_is_reported_on_end() {
        let agent = agent_with(|cfg| cfg.http.url_stat.enable = true);
        let span = sampled_span(&agent);
        span.set_url_stat("/users/42", "GET", 200);
        span.end_span();

        let url_stats = agent.url_stats();
        assert_eq!(url_stats.len(), 1);
        assert_eq!(url_stats[0].url_pattern, "/users/42");
        assert!(url_stats[0].end_time > 0);
    }

    #[test]
    fn exceptions_flush_on_end() {
        struct OneFrame;
        impl CallStackReader for OneFrame {
            fn for_each(&self, f: &mut dyn FnMut(&str, &str, &str, i32)) {
                f("app", "handler", "main.rs", 42);
            }
        }

        let agent = agent();
        let span = sampled_span(&agent);
        span.set_error_with_callstack("Panic", "boom", &OneFrame);
        span.end_span();

        let exceptions = agent.exceptions();
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].exceptions[0].message, "boom");
        assert_eq!(exceptions[0].exceptions[0].frames[0].line, 42);
        // The exception id annotation rides on the root frame.
        let chunks = agent.chunks();
        assert!(matches!(
            chunks[0].annotations.last(),
            Some((key, AnnotationValue::Long(_))) if *key == ANNOTATION_EXCEPTION_ID
        ));
    }

    #[test]
    fn active_span_tracking_follows_lifecycle() {
        let agent = agent();
        let span = sampled_span(&agent);
        assert_eq!(agent.agent_stats().active_span_count(), 1);
        span.end_span();
        assert_eq!(agent.agent_stats().active_span_count(), 0);
    }

    #[test]
    fn async_span_links_to_parent_event() {
        let agent = agent();
        let span = sampled_span(&agent);
        span.new_span_event("spawn");

        let async_span = span.new_async_span("worker");
        assert!(async_span.is_sampled());
        assert_eq!(async_span.trace_id(), span.trace_id());
        assert_eq!(async_span.span_id(), span.span_id());

        async_span.new_span_event("inner");
        async_span.end_span_event();
        async_span.end_span();

        let chunks = agent.chunks();
        assert_eq!(chunks.len(), 1);
        let chunk = &chunks[0];
        assert!(chunk.is_async());
        assert!(chunk.async_id != NONE_ASYNC_ID);
        assert_eq!(chunk.async_sequence, 1);
        // Synthetic async-root event plus the inner event.
        assert_eq!(chunk.events().len(), 2);
        assert_eq!(chunk.events()[0].service_type, SERVICE_TYPE_ASYNC);

        let second = span.new_async_span("worker");
        second.end_span();
        let chunks = agent.chunks();
        assert_eq!(chunks[1].async_id, chunks[0].async_id);
        assert_eq!(chunks[1].async_sequence, 2);
    }

    #[test]
    fn async_span_without_open_event_is_noop() {
        let agent = agent();
        let span = sampled_span(&agent);
        let async_span = span.new_async_span("worker");
        assert!(!async_span.is_sampled());
    }

    #[test]
    fn unsampled_span_propagates_only_s0() {
        let agent = agent();
        let span = UnsampledSpan::new(agent.clone());
        let mut carrier: HashMap<String, String> = HashMap::new();
        span.inject_context(&mut carrier);
        assert_eq!(carrier.len(), 1);
        assert_eq!(
            carrier.get(HEADER_SAMPLED),
            Some(&SAMPLED_FALSE.to_string())
        );
    }

    #[test]
    fn unsampled_span_records_url_stat_but_no_chunk() {
        let agent = agent_with(|cfg| cfg.http.url_stat.enable = true);
        let span = UnsampledSpan::new(agent.clone());
        assert_eq!(agent.agent_stats().active_span_count(), 1);
        span.set_url_stat("/a", "GET", 200);
        span.end_span();

        assert!(agent.chunks().is_empty());
        assert_eq!(agent.url_stats().len(), 1);
        assert_eq!(agent.agent_stats().active_span_count(), 0);
    }

    #[test]
    fn unsampled_span_end_is_idempotent() {
        let agent = agent_with(|cfg| cfg.http.url_stat.enable = true);
        let span = UnsampledSpan::new(agent.clone());
        span.set_url_stat("/a", "GET", 200);
        span.end_span();
        span.end_span();
        assert_eq!(agent.url_stats().len(), 1);
    }
}
