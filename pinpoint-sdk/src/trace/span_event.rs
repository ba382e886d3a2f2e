//! Span events: the nodes of a span's call tree.
//!
//! The user-facing handle ([`SpanEventImpl`]) shares ownership of its
//! annotation bag with the span; the rest of the event state is copied
//! out as an owned [`SpanEventData`] when the event finishes, which is
//! what chunks carry to the transport.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use pinpoint::annotation::{Annotation, ANNOTATION_SQL_ID, ANNOTATION_SQL_UID};
use pinpoint::trace::{HeaderReader, HeaderType, SpanEvent, API_TYPE_DEFAULT, NONE_ASYNC_ID};

use crate::agent::AgentService;
use crate::sql::SqlNormalizer;
use crate::util;

/// Maximum statement length accepted from instrumentation before
/// normalization.
const SET_SQL_QUERY_MAX_LENGTH: usize = 64 * 1024;

/// Owned event state as carried by span chunks.
#[derive(Clone, Debug)]
pub(crate) struct SpanEventData {
    pub service_type: i32,
    pub operation: String,
    pub api_id: i32,
    pub sequence: i32,
    pub depth: i32,
    pub start_time: i64,
    pub start_elapsed: i32,
    pub elapsed: i32,
    pub next_span_id: i64,
    pub endpoint: String,
    pub destination_id: String,
    pub error_func_id: i32,
    pub error_string: String,
    pub async_id: i32,
    pub async_seq_gen: i32,
    pub annotations: Arc<Annotation>,
}

/// Live event handle handed to instrumented code.
pub(crate) struct SpanEventImpl {
    agent: Arc<dyn AgentService>,
    data: Mutex<SpanEventData>,
}

impl SpanEventImpl {
    /// `sequence` and `depth` are captured from the owning span at push
    /// time.
    pub(crate) fn new(
        agent: Arc<dyn AgentService>,
        operation: &str,
        sequence: i32,
        depth: i32,
    ) -> SpanEventImpl {
        let api_id = if operation.is_empty() {
            0
        } else {
            agent.cache_api(operation, API_TYPE_DEFAULT)
        };
        SpanEventImpl {
            agent,
            data: Mutex::new(SpanEventData {
                service_type: pinpoint::trace::DEFAULT_SERVICE_TYPE,
                operation: operation.to_string(),
                api_id,
                sequence,
                depth,
                start_time: util::now_millis(),
                start_elapsed: 0,
                elapsed: 0,
                next_span_id: 0,
                endpoint: String::new(),
                destination_id: String::new(),
                error_func_id: 0,
                error_string: String::new(),
                async_id: NONE_ASYNC_ID,
                async_seq_gen: 0,
                annotations: Arc::new(Annotation::new()),
            }),
        }
    }

    /// Seals the event and returns the data the chunk will carry.
    pub(crate) fn finish(&self) -> SpanEventData {
        let mut data = match self.data.lock() {
            Ok(data) => data,
            Err(poisoned) => poisoned.into_inner(),
        };
        data.elapsed = (util::now_millis() - data.start_time) as i32;
        data.clone()
    }

    /// Mints (and remembers) the span id the next process will use.
    pub(crate) fn generate_next_span_id(&self) -> i64 {
        let next = util::generate_span_id();
        if let Ok(mut data) = self.data.lock() {
            data.next_span_id = next;
        }
        next
    }

    pub(crate) fn destination_id(&self) -> String {
        self.data
            .lock()
            .map(|d| d.destination_id.clone())
            .unwrap_or_default()
    }

    pub(crate) fn async_id(&self) -> i32 {
        self.data.lock().map(|d| d.async_id).unwrap_or(NONE_ASYNC_ID)
    }

    pub(crate) fn set_async_id(&self, async_id: i32) {
        if let Ok(mut data) = self.data.lock() {
            data.async_id = async_id;
        }
    }

    /// Bumps the per-event async sequence and returns the new value.
    pub(crate) fn next_async_sequence(&self) -> i32 {
        self.data
            .lock()
            .map(|mut d| {
                d.async_seq_gen += 1;
                d.async_seq_gen
            })
            .unwrap_or(0)
    }

    pub(crate) fn set_api_id(&self, api_id: i32) {
        if let Ok(mut data) = self.data.lock() {
            data.api_id = api_id;
        }
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> SpanEventData {
        self.data
            .lock()
            .map(|d| d.clone())
            .unwrap_or_else(|p| p.into_inner().clone())
    }
}

impl SpanEvent for SpanEventImpl {
    fn set_service_type(&self, service_type: i32) {
        if let Ok(mut data) = self.data.lock() {
            data.service_type = service_type;
        }
    }

    fn set_operation_name(&self, operation: &str) {
        if let Ok(mut data) = self.data.lock() {
            data.operation = operation.to_string();
            data.api_id = if operation.is_empty() {
                0
            } else {
                self.agent.cache_api(operation, API_TYPE_DEFAULT)
            };
        }
    }

    fn set_start_time(&self, start_time: SystemTime) {
        if let Ok(mut data) = self.data.lock() {
            data.start_time = util::to_millis(start_time);
        }
    }

    fn set_destination(&self, dest: &str) {
        if let Ok(mut data) = self.data.lock() {
            data.destination_id = dest.to_string();
        }
    }

    fn set_end_point(&self, end_point: &str) {
        if let Ok(mut data) = self.data.lock() {
            data.endpoint = end_point.to_string();
        }
    }

    fn set_error(&self, error_message: &str) {
        self.set_error_with_name("Error", error_message);
    }

    fn set_error_with_name(&self, error_name: &str, error_message: &str) {
        let error_func_id = self.agent.cache_error(error_name);
        if let Ok(mut data) = self.data.lock() {
            data.error_func_id = error_func_id;
            data.error_string = error_message.to_string();
        }
    }

    fn set_sql_query(&self, sql_query: &str, args: &str) {
        let normalizer = SqlNormalizer::new(SET_SQL_QUERY_MAX_LENGTH);
        let result = normalizer.normalize(sql_query);
        if result.normalized_sql.is_empty() {
            return;
        }

        let config = self.agent.config();
        let mut args = args;
        let max_args = config.sql.max_bind_args_size.max(0) as usize;
        if args.len() > max_args {
            let mut cut = max_args;
            while cut > 0 && !args.is_char_boundary(cut) {
                cut -= 1;
            }
            args = &args[..cut];
        }

        let annotations = self
            .data
            .lock()
            .map(|d| d.annotations.clone())
            .unwrap_or_default();
        if config.sql.enable_sql_stats {
            let uid = self.agent.cache_sql_uid(&result.normalized_sql);
            if !uid.is_empty() {
                annotations.append_bytes_string_string(
                    ANNOTATION_SQL_UID,
                    uid,
                    &result.parameters,
                    args,
                );
            }
        } else {
            let sql_id = self.agent.cache_sql(&result.normalized_sql);
            if sql_id > 0 {
                annotations.append_int_string_string(
                    ANNOTATION_SQL_ID,
                    sql_id,
                    &result.parameters,
                    args,
                );
            }
        }
    }

    fn record_header(&self, which: HeaderType, reader: &dyn HeaderReader) {
        let annotations = self
            .data
            .lock()
            .map(|d| d.annotations.clone())
            .unwrap_or_default();
        self.agent.record_client_header(which, reader, &annotations);
    }

    fn annotations(&self) -> Arc<Annotation> {
        self.data
            .lock()
            .map(|d| d.annotations.clone())
            .unwrap_or_default()
    }
}
