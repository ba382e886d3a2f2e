//! Conversions from in-process records to collector wire messages.

use pinpoint::annotation::{AnnotationValue, ANNOTATION_API};
use pinpoint::trace::{TraceId, NONE_ASYNC_ID};
use pinpoint_proto::v1;

use crate::agent::AgentService;
use crate::config::{self, Config};
use crate::stats::AgentStatsSnapshot;
use crate::trace::span_event::SpanEventData;
use crate::trace::{ExceptionMeta, SpanChunk};
use crate::url_stat::{UrlStatHistogram, UrlStatSnapshot, URL_STATS_BUCKET_SIZE,
    URL_STATS_BUCKET_VERSION};
use crate::util;

pub(crate) fn transaction_id(trace_id: &TraceId) -> v1::PTransactionId {
    v1::PTransactionId {
        agent_id: trace_id.agent_id.clone(),
        agent_start_time: trace_id.start_time,
        sequence: trace_id.sequence,
    }
}

fn annotation_value(value: &AnnotationValue) -> v1::PAnnotationValue {
    use v1::p_annotation_value::Field;

    let field = match value {
        AnnotationValue::Int(v) => Field::IntValue(*v),
        AnnotationValue::Long(v) => Field::LongValue(*v),
        AnnotationValue::String(v) => Field::StringValue(v.clone()),
        AnnotationValue::StringString(v1, v2) => Field::StringStringValue(v1::PStringStringValue {
            string_value1: Some(v1.clone()),
            string_value2: Some(v2.clone()),
        }),
        AnnotationValue::IntStringString(i, v1, v2) => {
            Field::IntStringStringValue(v1::PIntStringStringValue {
                int_value: *i,
                string_value1: Some(v1.clone()),
                string_value2: Some(v2.clone()),
            })
        }
        AnnotationValue::BytesStringString(bytes, v1, v2) => {
            Field::BytesStringStringValue(v1::PBytesStringStringValue {
                bytes_value: bytes.clone(),
                string_value1: Some(v1.clone()),
                string_value2: Some(v2.clone()),
            })
        }
        AnnotationValue::LongIntIntByteByteString(l, i1, i2, b1, b2, s) => {
            Field::LongIntIntByteByteStringValue(v1::PLongIntIntByteByteStringValue {
                long_value: *l,
                int_value1: *i1,
                int_value2: *i2,
                byte_value1: *b1,
                byte_value2: *b2,
                string_value: Some(s.clone()),
            })
        }
    };

    v1::PAnnotationValue { field: Some(field) }
}

pub(crate) fn annotation(key: i32, value: &AnnotationValue) -> v1::PAnnotation {
    v1::PAnnotation {
        key,
        value: Some(annotation_value(value)),
    }
}

fn string_annotation(key: i32, value: &str) -> v1::PAnnotation {
    annotation(key, &AnnotationValue::String(value.to_string()))
}

fn exception_info(error_func_id: i32, error_string: &str) -> Option<v1::PIntStringValue> {
    if error_string.is_empty() {
        return None;
    }
    Some(v1::PIntStringValue {
        int_value: error_func_id,
        string_value: Some(error_string.to_string()),
    })
}

fn span_event(event: &SpanEventData) -> v1::PSpanEvent {
    let mut annotations = Vec::new();
    if event.api_id == 0 && !event.operation.is_empty() {
        annotations.push(string_annotation(ANNOTATION_API, &event.operation));
    }
    for (key, value) in event.annotations.snapshot() {
        annotations.push(annotation(key, &value));
    }

    let next_event = if event.destination_id.is_empty() {
        None
    } else {
        Some(v1::PNextEvent {
            field: Some(v1::p_next_event::Field::MessageEvent(v1::PMessageEvent {
                next_span_id: event.next_span_id,
                end_point: event.endpoint.clone(),
                destination_id: event.destination_id.clone(),
            })),
        })
    };

    v1::PSpanEvent {
        sequence: event.sequence,
        depth: event.depth,
        start_elapsed: event.start_elapsed,
        end_elapsed: event.elapsed,
        service_type: event.service_type,
        annotation: annotations,
        api_id: event.api_id,
        exception_info: exception_info(event.error_func_id, &event.error_string),
        next_event,
        async_event: event.async_id,
    }
}

fn accept_event(chunk: &SpanChunk) -> v1::PAcceptEvent {
    let parent_info = if chunk.parent_app_name.is_empty() {
        None
    } else {
        Some(v1::PParentInfo {
            parent_application_name: chunk.parent_app_name.clone(),
            parent_application_type: chunk.parent_app_type,
            acceptor_host: chunk.acceptor_host.clone(),
        })
    };
    v1::PAcceptEvent {
        rpc: chunk.rpc_name.clone(),
        end_point: chunk.endpoint.clone(),
        remote_addr: chunk.remote_addr.clone(),
        parent_info,
    }
}

fn grpc_span(chunk: &SpanChunk) -> v1::PSpan {
    let mut annotations = Vec::new();
    if chunk.api_id == 0 && !chunk.operation.is_empty() {
        annotations.push(string_annotation(ANNOTATION_API, &chunk.operation));
    }
    for (key, value) in &chunk.annotations {
        annotations.push(annotation(*key, value));
    }

    v1::PSpan {
        version: 1,
        transaction_id: Some(transaction_id(&chunk.trace_id)),
        span_id: chunk.span_id,
        parent_span_id: chunk.parent_span_id,
        start_time: chunk.start_time,
        elapsed: chunk.elapsed,
        api_id: chunk.api_id,
        service_type: chunk.service_type,
        accept_event: Some(accept_event(chunk)),
        annotation: annotations,
        flag: chunk.flags,
        err: chunk.err,
        span_event: chunk.events().iter().map(span_event).collect(),
        exception_info: exception_info(chunk.error_func_id, &chunk.error_string),
        application_service_type: chunk.app_type,
        logging_transaction_info: chunk.logging_flag,
    }
}

fn grpc_span_chunk(chunk: &SpanChunk) -> v1::PSpanChunk {
    let local_async_id = if chunk.async_id == NONE_ASYNC_ID {
        None
    } else {
        Some(v1::PLocalAsyncId {
            async_id: chunk.async_id,
            sequence: chunk.async_sequence,
        })
    };

    v1::PSpanChunk {
        version: 1,
        transaction_id: Some(transaction_id(&chunk.trace_id)),
        span_id: chunk.span_id,
        end_point: chunk.endpoint.clone(),
        span_event: chunk.events().iter().map(span_event).collect(),
        application_service_type: chunk.app_type,
        key_time: chunk.key_time,
        local_async_id,
    }
}

/// Frames a chunk: final non-async spans travel as `PSpan`, everything
/// else as `PSpanChunk`.
pub(crate) fn span_message(chunk: &SpanChunk) -> v1::PSpanMessage {
    let field = if !chunk.is_final || chunk.is_async() {
        v1::p_span_message::Field::SpanChunk(grpc_span_chunk(chunk))
    } else {
        v1::p_span_message::Field::Span(grpc_span(chunk))
    };
    v1::PSpanMessage { field: Some(field) }
}

pub(crate) fn agent_info(agent: &dyn AgentService, config: &Config) -> v1::PAgentInfo {
    v1::PAgentInfo {
        hostname: util::host_name(),
        ip: util::host_ip_addr(),
        ports: String::new(),
        service_type: agent.app_type(),
        pid: std::process::id() as i32,
        agent_version: env!("CARGO_PKG_VERSION").to_string(),
        vm_version: String::new(),
        end_timestamp: 0,
        end_status: 0,
        server_meta_data: Some(v1::PServerMetaData {
            server_info: "Rust".to_string(),
            vm_arg: vec![config::to_config_string(config)],
            service_info: Vec::new(),
        }),
        jvm_info: None,
        container: config.is_container,
    }
}

pub(crate) fn api_meta(id: i32, api_type: i32, api_str: &str) -> v1::PApiMetaData {
    v1::PApiMetaData {
        api_id: id,
        api_info: api_str.to_string(),
        line: 0,
        r#type: api_type,
        location: String::new(),
    }
}

pub(crate) fn string_meta(id: i32, value: &str) -> v1::PStringMetaData {
    v1::PStringMetaData {
        string_id: id,
        string_value: value.to_string(),
    }
}

pub(crate) fn sql_uid_meta(uid: &[u8], sql: &str) -> v1::PSqlUidMetaData {
    v1::PSqlUidMetaData {
        sql_uid: uid.to_vec(),
        sql: sql.to_string(),
    }
}

pub(crate) fn exception_meta(meta: &ExceptionMeta) -> v1::PExceptionMetaData {
    v1::PExceptionMetaData {
        transaction_id: Some(transaction_id(&meta.trace_id)),
        span_id: meta.span_id,
        uri_template: meta.uri_template.clone(),
        exceptions: meta
            .exceptions
            .iter()
            .map(|e| v1::PException {
                exception_class_name: e.name.clone(),
                exception_message: e.message.clone(),
                exception_depth: 1,
                stack_trace_element: e
                    .frames
                    .iter()
                    .map(|f| v1::PStackTraceElement {
                        class_name: f.module.clone(),
                        file_name: f.file.clone(),
                        line_number: f.line,
                        method_name: f.function.clone(),
                    })
                    .collect(),
                exception_id: e.id,
            })
            .collect(),
    }
}

pub(crate) fn agent_stat(snapshot: &AgentStatsSnapshot, collect_interval_ms: u64) -> v1::PAgentStat {
    v1::PAgentStat {
        timestamp: snapshot.sample_time,
        collect_interval: collect_interval_ms as i64,
        gc: Some(v1::PJvmGc {
            r#type: v1::PJvmGcType::JvmGcTypeUnknown as i32,
            jvm_memory_heap_used: snapshot.heap_alloc_size,
            jvm_memory_heap_max: snapshot.heap_max_size,
            jvm_memory_non_heap_used: 0,
            jvm_memory_non_heap_max: 0,
            jvm_gc_old_count: 0,
            jvm_gc_old_time: 0,
        }),
        cpu_load: Some(v1::PCpuLoad {
            jvm_cpu_load: snapshot.process_cpu_time,
            system_cpu_load: snapshot.system_cpu_time,
        }),
        transaction: Some(v1::PTransaction {
            sampled_new_count: snapshot.num_sample_new,
            sampled_continuation_count: snapshot.num_sample_cont,
            unsampled_new_count: snapshot.num_unsample_new,
            unsampled_continuation_count: snapshot.num_unsample_cont,
            skipped_new_count: snapshot.num_skip_new,
            skipped_continuation_count: snapshot.num_skip_cont,
        }),
        active_trace: Some(v1::PActiveTrace {
            histogram: Some(v1::PActiveTraceHistogram {
                version: 1,
                histogram_schema_type: 2,
                active_trace_count: snapshot.active_requests.to_vec(),
            }),
        }),
        response_time: Some(v1::PResponseTime {
            avg: snapshot.response_time_avg,
            max: snapshot.response_time_max,
        }),
        total_thread: Some(v1::PTotalThread {
            total_thread_count: snapshot.num_threads,
        }),
    }
}

pub(crate) fn agent_stat_batch(
    snapshots: &[AgentStatsSnapshot],
    collect_interval_ms: u64,
) -> v1::PAgentStatBatch {
    v1::PAgentStatBatch {
        agent_stat: snapshots
            .iter()
            .map(|s| agent_stat(s, collect_interval_ms))
            .collect(),
    }
}

fn uri_histogram(histogram: &UrlStatHistogram) -> v1::PUriHistogram {
    v1::PUriHistogram {
        total: histogram.total(),
        max: histogram.max(),
        histogram: (0..URL_STATS_BUCKET_SIZE)
            .map(|i| histogram.bucket(i))
            .collect(),
    }
}

pub(crate) fn agent_uri_stat(snapshot: &UrlStatSnapshot) -> v1::PAgentUriStat {
    v1::PAgentUriStat {
        bucket_version: URL_STATS_BUCKET_VERSION,
        each_uri_stat: snapshot
            .each_stats()
            .iter()
            .map(|(key, each)| v1::PEachUriStat {
                uri: key.url.clone(),
                total_histogram: Some(uri_histogram(&each.total_histogram)),
                failed_histogram: Some(uri_histogram(&each.fail_histogram)),
                timestamp: key.tick,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestAgentService;
    use crate::url_stat::UrlStatEntry;
    use pinpoint::propagation::EmptyContextReader;
    use pinpoint::trace::{Span, SpanEvent};
    use std::sync::Arc;

    fn finished_chunk(f: impl FnOnce(&crate::trace::SpanImpl)) -> SpanChunk {
        let agent = Arc::new(TestAgentService::new());
        let span = crate::trace::SpanImpl::new(agent.clone(), "op", "/rpc");
        span.extract_context(&EmptyContextReader);
        f(&span);
        span.end_span();
        let mut chunks = agent.chunks();
        chunks.pop().expect("final chunk")
    }

    #[test]
    fn final_span_frames_as_pspan() {
        let chunk = finished_chunk(|span| {
            span.set_remote_address("10.1.2.3");
            span.set_end_point("svc:8080");
        });
        let message = span_message(&chunk);
        let v1::PSpanMessage { field: Some(v1::p_span_message::Field::Span(span)) } = message
        else {
            panic!("expected PSpan frame");
        };
        assert_eq!(span.version, 1);
        assert_eq!(span.parent_span_id, -1);
        assert!(span.api_id > 0);
        let accept = span.accept_event.expect("accept event");
        assert_eq!(accept.rpc, "/rpc");
        assert_eq!(accept.remote_addr, "10.1.2.3");
        assert_eq!(accept.end_point, "svc:8080");
        assert!(accept.parent_info.is_none());
        let tid = span.transaction_id.expect("transaction id");
        assert_eq!(tid.agent_id, chunk.trace_id.agent_id);
    }

    #[test]
    fn non_final_chunk_frames_as_pspanchunk() {
        let agent = Arc::new(TestAgentService::with_config({
            let mut cfg = crate::config::Config::default();
            cfg.span.event_chunk_size = 1;
            cfg
        }));
        let span = crate::trace::SpanImpl::new(agent.clone(), "op", "/rpc");
        span.extract_context(&EmptyContextReader);
        span.new_span_event("child");
        span.end_span_event();

        let chunk = agent.chunks().remove(0);
        assert!(!chunk.is_final);
        let message = span_message(&chunk);
        assert!(matches!(
            message.field,
            Some(v1::p_span_message::Field::SpanChunk(_))
        ));
    }

    #[test]
    fn event_with_destination_carries_next_event() {
        let chunk = finished_chunk(|span| {
            let event = span.new_span_event("client.call");
            event.set_destination("backend");
            let mut carrier: std::collections::HashMap<String, String> =
                std::collections::HashMap::new();
            span.inject_context(&mut carrier);
            span.end_span_event();
        });
        let events: Vec<v1::PSpanEvent> = chunk.events().iter().map(span_event).collect();
        assert_eq!(events.len(), 1);
        let next = events[0].next_event.clone().expect("next event");
        let v1::p_next_event::Field::MessageEvent(message_event) = next.field.expect("field");
        assert_eq!(message_event.destination_id, "backend");
        assert_ne!(message_event.next_span_id, 0);
    }

    #[test]
    fn error_becomes_exception_info() {
        let chunk = finished_chunk(|span| {
            span.set_error_with_name("DbError", "boom");
        });
        let span = match span_message(&chunk).field {
            Some(v1::p_span_message::Field::Span(span)) => span,
            other => panic!("unexpected frame {:?}", other),
        };
        assert_eq!(span.err, 1);
        let info = span.exception_info.expect("exception info");
        assert!(info.int_value > 0);
        assert_eq!(info.string_value.as_deref(), Some("boom"));
    }

    #[test]
    fn annotation_variants_map_to_wire_values() {
        use v1::p_annotation_value::Field;

        let cases: Vec<(AnnotationValue, fn(&Field) -> bool)> = vec![
            (AnnotationValue::Int(1), |f| matches!(f, Field::IntValue(1))),
            (AnnotationValue::Long(2), |f| matches!(f, Field::LongValue(2))),
            (AnnotationValue::String("s".to_string()), |f| {
                matches!(f, Field::StringValue(s) if s == "s")
            }),
            (
                AnnotationValue::StringString("a".to_string(), "b".to_string()),
                |f| {
                    matches!(f, Field::StringStringValue(v)
                        if v.string_value1.as_deref() == Some("a")
                            && v.string_value2.as_deref() == Some("b"))
                },
            ),
            (
                AnnotationValue::IntStringString(9, "p".to_string(), "q".to_string()),
                |f| matches!(f, Field::IntStringStringValue(v) if v.int_value == 9),
            ),
            (
                AnnotationValue::BytesStringString(vec![1, 2], "p".to_string(), "q".to_string()),
                |f| matches!(f, Field::BytesStringStringValue(v) if v.bytes_value == vec![1, 2]),
            ),
            (
                AnnotationValue::LongIntIntByteByteString(1, 2, 3, 4, 5, "x".to_string()),
                |f| {
                    matches!(f, Field::LongIntIntByteByteStringValue(v)
                        if v.long_value == 1 && v.byte_value2 == 5)
                },
            ),
        ];

        for (value, check) in cases {
            let wire = annotation(40, &value);
            assert_eq!(wire.key, 40);
            let field = wire.value.unwrap().field.unwrap();
            assert!(check(&field), "mismatched mapping for {:?}", value);
        }
    }

    #[test]
    fn stat_snapshot_maps_all_sections() {
        let snapshot = AgentStatsSnapshot {
            sample_time: 123,
            system_cpu_time: 0.5,
            process_cpu_time: 0.25,
            num_threads: 8,
            heap_alloc_size: 1000,
            heap_max_size: 2000,
            response_time_avg: 15,
            response_time_max: 90,
            num_sample_new: 1,
            num_sample_cont: 2,
            num_unsample_new: 3,
            num_unsample_cont: 4,
            num_skip_new: 5,
            num_skip_cont: 6,
            active_requests: [1, 2, 3, 4],
        };
        let stat = agent_stat(&snapshot, 5000);
        assert_eq!(stat.timestamp, 123);
        assert_eq!(stat.collect_interval, 5000);
        assert_eq!(stat.gc.unwrap().jvm_memory_heap_max, 2000);
        assert_eq!(stat.cpu_load.unwrap().system_cpu_load, 0.5);
        let tx = stat.transaction.unwrap();
        assert_eq!(tx.skipped_continuation_count, 6);
        let histogram = stat.active_trace.unwrap().histogram.unwrap();
        assert_eq!(histogram.active_trace_count, vec![1, 2, 3, 4]);
        assert_eq!(stat.response_time.unwrap().max, 90);
        assert_eq!(stat.total_thread.unwrap().total_thread_count, 8);
    }

    #[test]
    fn uri_snapshot_maps_histograms() {
        let mut cfg = crate::config::Config::default();
        cfg.http.url_stat.enable = true;
        let mut snapshot = UrlStatSnapshot::default();
        snapshot.add(
            &UrlStatEntry {
                url_pattern: "/a".to_string(),
                method: "GET".to_string(),
                status_code: 500,
                end_time: 31_000,
                elapsed: 250,
            },
            &cfg,
        );

        let wire = agent_uri_stat(&snapshot);
        assert_eq!(wire.bucket_version, 0);
        assert_eq!(wire.each_uri_stat.len(), 1);
        let each = &wire.each_uri_stat[0];
        assert_eq!(each.uri, "/a");
        assert_eq!(each.timestamp, 30_000);
        let total = each.total_histogram.clone().unwrap();
        assert_eq!(total.total, 250);
        assert_eq!(total.histogram[1], 1);
        let failed = each.failed_histogram.clone().unwrap();
        assert_eq!(failed.histogram[1], 1);
    }
}
