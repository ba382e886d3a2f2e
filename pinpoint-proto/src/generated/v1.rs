/// Generic call result returned by the agent and metadata services.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}
/// Liveness probe exchanged on the bidirectional ping stream.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PPing {}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PServiceInfo {
    #[prost(string, tag = "1")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub service_libs: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PServerMetaData {
    #[prost(string, tag = "1")]
    pub server_info: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub vm_arg: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "3")]
    pub service_info: ::prost::alloc::vec::Vec<PServiceInfo>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PJvmInfo {
    #[prost(int32, tag = "1")]
    pub version: i32,
    #[prost(string, tag = "2")]
    pub vm_version: ::prost::alloc::string::String,
    #[prost(enumeration = "PJvmGcType", tag = "3")]
    pub gc_type: i32,
}
/// Registration payload sent once at agent startup.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PAgentInfo {
    #[prost(string, tag = "1")]
    pub hostname: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub ip: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub ports: ::prost::alloc::string::String,
    #[prost(int32, tag = "4")]
    pub service_type: i32,
    #[prost(int32, tag = "5")]
    pub pid: i32,
    #[prost(string, tag = "6")]
    pub agent_version: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub vm_version: ::prost::alloc::string::String,
    #[prost(int64, tag = "8")]
    pub end_timestamp: i64,
    #[prost(int32, tag = "9")]
    pub end_status: i32,
    #[prost(message, optional, tag = "10")]
    pub server_meta_data: ::core::option::Option<PServerMetaData>,
    #[prost(message, optional, tag = "11")]
    pub jvm_info: ::core::option::Option<PJvmInfo>,
    #[prost(bool, tag = "12")]
    pub container: bool,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PApiMetaData {
    #[prost(int32, tag = "1")]
    pub api_id: i32,
    #[prost(string, tag = "2")]
    pub api_info: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub line: i32,
    #[prost(int32, tag = "4")]
    pub r#type: i32,
    #[prost(string, tag = "5")]
    pub location: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PStringMetaData {
    #[prost(int32, tag = "1")]
    pub string_id: i32,
    #[prost(string, tag = "2")]
    pub string_value: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PSqlUidMetaData {
    #[prost(bytes = "vec", tag = "1")]
    pub sql_uid: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "2")]
    pub sql: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PStackTraceElement {
    #[prost(string, tag = "1")]
    pub class_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub file_name: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub line_number: i32,
    #[prost(string, tag = "4")]
    pub method_name: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PException {
    #[prost(string, tag = "1")]
    pub exception_class_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub exception_message: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub exception_depth: i32,
    #[prost(message, repeated, tag = "4")]
    pub stack_trace_element: ::prost::alloc::vec::Vec<PStackTraceElement>,
    #[prost(int64, tag = "5")]
    pub exception_id: i64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PExceptionMetaData {
    #[prost(message, optional, tag = "1")]
    pub transaction_id: ::core::option::Option<PTransactionId>,
    #[prost(int64, tag = "2")]
    pub span_id: i64,
    #[prost(string, tag = "3")]
    pub uri_template: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "4")]
    pub exceptions: ::prost::alloc::vec::Vec<PException>,
}
/// Identifies the distributed trace a span belongs to.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PTransactionId {
    #[prost(string, tag = "1")]
    pub agent_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub agent_start_time: i64,
    #[prost(int64, tag = "3")]
    pub sequence: i64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PParentInfo {
    #[prost(string, tag = "1")]
    pub parent_application_name: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub parent_application_type: i32,
    #[prost(string, tag = "3")]
    pub acceptor_host: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PAcceptEvent {
    #[prost(string, tag = "1")]
    pub rpc: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub end_point: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub remote_addr: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub parent_info: ::core::option::Option<PParentInfo>,
}
/// Links an async span back to the parent event that spawned it.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PLocalAsyncId {
    #[prost(int32, tag = "1")]
    pub async_id: i32,
    #[prost(int32, tag = "2")]
    pub sequence: i32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PMessageEvent {
    #[prost(int64, tag = "1")]
    pub next_span_id: i64,
    #[prost(string, tag = "2")]
    pub end_point: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub destination_id: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PNextEvent {
    #[prost(oneof = "p_next_event::Field", tags = "1")]
    pub field: ::core::option::Option<p_next_event::Field>,
}
/// Nested message and enum types in `PNextEvent`.
pub mod p_next_event {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Field {
        #[prost(message, tag = "1")]
        MessageEvent(super::PMessageEvent),
    }
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PStringStringValue {
    #[prost(message, optional, tag = "1")]
    pub string_value1: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "2")]
    pub string_value2: ::core::option::Option<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PIntStringValue {
    #[prost(int32, tag = "1")]
    pub int_value: i32,
    #[prost(message, optional, tag = "2")]
    pub string_value: ::core::option::Option<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PIntStringStringValue {
    #[prost(int32, tag = "1")]
    pub int_value: i32,
    #[prost(message, optional, tag = "2")]
    pub string_value1: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "3")]
    pub string_value2: ::core::option::Option<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PBytesStringStringValue {
    #[prost(bytes = "vec", tag = "1")]
    pub bytes_value: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub string_value1: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "3")]
    pub string_value2: ::core::option::Option<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PLongIntIntByteByteStringValue {
    #[prost(int64, tag = "1")]
    pub long_value: i64,
    #[prost(int32, tag = "2")]
    pub int_value1: i32,
    #[prost(int32, tag = "3")]
    pub int_value2: i32,
    #[prost(sint32, tag = "4")]
    pub byte_value1: i32,
    #[prost(sint32, tag = "5")]
    pub byte_value2: i32,
    #[prost(message, optional, tag = "6")]
    pub string_value: ::core::option::Option<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PAnnotationValue {
    #[prost(
        oneof = "p_annotation_value::Field",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14"
    )]
    pub field: ::core::option::Option<p_annotation_value::Field>,
}
/// Nested message and enum types in `PAnnotationValue`.
pub mod p_annotation_value {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Field {
        #[prost(string, tag = "1")]
        StringValue(::prost::alloc::string::String),
        #[prost(bool, tag = "2")]
        BoolValue(bool),
        #[prost(int32, tag = "3")]
        IntValue(i32),
        #[prost(int64, tag = "4")]
        LongValue(i64),
        #[prost(int32, tag = "5")]
        ShortValue(i32),
        #[prost(double, tag = "6")]
        DoubleValue(f64),
        #[prost(bytes, tag = "7")]
        BinaryValue(::prost::alloc::vec::Vec<u8>),
        #[prost(int32, tag = "8")]
        ByteValue(i32),
        #[prost(message, tag = "9")]
        StringStringValue(super::PStringStringValue),
        #[prost(message, tag = "10")]
        IntStringValue(super::PIntStringValue),
        #[prost(message, tag = "11")]
        IntStringStringValue(super::PIntStringStringValue),
        #[prost(message, tag = "12")]
        LongIntIntByteByteStringValue(super::PLongIntIntByteByteStringValue),
        #[prost(message, tag = "14")]
        BytesStringStringValue(super::PBytesStringStringValue),
    }
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PAnnotation {
    #[prost(int32, tag = "1")]
    pub key: i32,
    #[prost(message, optional, tag = "2")]
    pub value: ::core::option::Option<PAnnotationValue>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PSpanEvent {
    #[prost(int32, tag = "1")]
    pub sequence: i32,
    #[prost(int32, tag = "2")]
    pub depth: i32,
    #[prost(int32, tag = "3")]
    pub start_elapsed: i32,
    #[prost(int32, tag = "4")]
    pub end_elapsed: i32,
    #[prost(int32, tag = "5")]
    pub service_type: i32,
    #[prost(message, repeated, tag = "6")]
    pub annotation: ::prost::alloc::vec::Vec<PAnnotation>,
    #[prost(int32, tag = "10")]
    pub api_id: i32,
    #[prost(message, optional, tag = "11")]
    pub exception_info: ::core::option::Option<PIntStringValue>,
    #[prost(message, optional, tag = "12")]
    pub next_event: ::core::option::Option<PNextEvent>,
    #[prost(int32, tag = "13")]
    pub async_event: i32,
}
/// Root span record; sent once per sampled trace as the final frame.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PSpan {
    #[prost(int32, tag = "1")]
    pub version: i32,
    #[prost(message, optional, tag = "2")]
    pub transaction_id: ::core::option::Option<PTransactionId>,
    #[prost(int64, tag = "3")]
    pub span_id: i64,
    #[prost(int64, tag = "4")]
    pub parent_span_id: i64,
    #[prost(int64, tag = "5")]
    pub start_time: i64,
    #[prost(int32, tag = "6")]
    pub elapsed: i32,
    #[prost(int32, tag = "7")]
    pub api_id: i32,
    #[prost(int32, tag = "8")]
    pub service_type: i32,
    #[prost(message, optional, tag = "9")]
    pub accept_event: ::core::option::Option<PAcceptEvent>,
    #[prost(message, repeated, tag = "10")]
    pub annotation: ::prost::alloc::vec::Vec<PAnnotation>,
    #[prost(int32, tag = "11")]
    pub flag: i32,
    #[prost(int32, tag = "12")]
    pub err: i32,
    #[prost(message, repeated, tag = "13")]
    pub span_event: ::prost::alloc::vec::Vec<PSpanEvent>,
    #[prost(message, optional, tag = "14")]
    pub exception_info: ::core::option::Option<PIntStringValue>,
    #[prost(int32, tag = "15")]
    pub application_service_type: i32,
    #[prost(int32, tag = "16")]
    pub logging_transaction_info: i32,
}
/// Partial batch of finished events for a still-open or async span.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PSpanChunk {
    #[prost(int32, tag = "1")]
    pub version: i32,
    #[prost(message, optional, tag = "2")]
    pub transaction_id: ::core::option::Option<PTransactionId>,
    #[prost(int64, tag = "3")]
    pub span_id: i64,
    #[prost(string, tag = "4")]
    pub end_point: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "5")]
    pub span_event: ::prost::alloc::vec::Vec<PSpanEvent>,
    #[prost(int32, tag = "6")]
    pub application_service_type: i32,
    #[prost(int64, tag = "7")]
    pub key_time: i64,
    #[prost(message, optional, tag = "8")]
    pub local_async_id: ::core::option::Option<PLocalAsyncId>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PSpanMessage {
    #[prost(oneof = "p_span_message::Field", tags = "1, 2")]
    pub field: ::core::option::Option<p_span_message::Field>,
}
/// Nested message and enum types in `PSpanMessage`.
pub mod p_span_message {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Field {
        #[prost(message, tag = "1")]
        Span(super::PSpan),
        #[prost(message, tag = "2")]
        SpanChunk(super::PSpanChunk),
    }
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PJvmGc {
    #[prost(enumeration = "PJvmGcType", tag = "1")]
    pub r#type: i32,
    #[prost(int64, tag = "2")]
    pub jvm_memory_heap_used: i64,
    #[prost(int64, tag = "3")]
    pub jvm_memory_heap_max: i64,
    #[prost(int64, tag = "4")]
    pub jvm_memory_non_heap_used: i64,
    #[prost(int64, tag = "5")]
    pub jvm_memory_non_heap_max: i64,
    #[prost(int64, tag = "6")]
    pub jvm_gc_old_count: i64,
    #[prost(int64, tag = "7")]
    pub jvm_gc_old_time: i64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PCpuLoad {
    #[prost(double, tag = "1")]
    pub jvm_cpu_load: f64,
    #[prost(double, tag = "2")]
    pub system_cpu_load: f64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PTransaction {
    #[prost(int64, tag = "2")]
    pub sampled_new_count: i64,
    #[prost(int64, tag = "3")]
    pub sampled_continuation_count: i64,
    #[prost(int64, tag = "4")]
    pub unsampled_new_count: i64,
    #[prost(int64, tag = "5")]
    pub unsampled_continuation_count: i64,
    #[prost(int64, tag = "6")]
    pub skipped_new_count: i64,
    #[prost(int64, tag = "7")]
    pub skipped_continuation_count: i64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PActiveTraceHistogram {
    #[prost(int32, tag = "1")]
    pub version: i32,
    #[prost(int32, tag = "2")]
    pub histogram_schema_type: i32,
    #[prost(int32, repeated, tag = "3")]
    pub active_trace_count: ::prost::alloc::vec::Vec<i32>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PActiveTrace {
    #[prost(message, optional, tag = "1")]
    pub histogram: ::core::option::Option<PActiveTraceHistogram>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PResponseTime {
    #[prost(int64, tag = "1")]
    pub avg: i64,
    #[prost(int64, tag = "2")]
    pub max: i64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PTotalThread {
    #[prost(int64, tag = "1")]
    pub total_thread_count: i64,
}
/// One interval's worth of runtime statistics.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PAgentStat {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(int64, tag = "2")]
    pub collect_interval: i64,
    #[prost(message, optional, tag = "3")]
    pub gc: ::core::option::Option<PJvmGc>,
    #[prost(message, optional, tag = "4")]
    pub cpu_load: ::core::option::Option<PCpuLoad>,
    #[prost(message, optional, tag = "5")]
    pub transaction: ::core::option::Option<PTransaction>,
    #[prost(message, optional, tag = "6")]
    pub active_trace: ::core::option::Option<PActiveTrace>,
    #[prost(message, optional, tag = "8")]
    pub response_time: ::core::option::Option<PResponseTime>,
    #[prost(message, optional, tag = "13")]
    pub total_thread: ::core::option::Option<PTotalThread>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PAgentStatBatch {
    #[prost(message, repeated, tag = "1")]
    pub agent_stat: ::prost::alloc::vec::Vec<PAgentStat>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PUriHistogram {
    #[prost(int64, tag = "1")]
    pub total: i64,
    #[prost(int64, tag = "2")]
    pub max: i64,
    #[prost(int32, repeated, tag = "3")]
    pub histogram: ::prost::alloc::vec::Vec<i32>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PEachUriStat {
    #[prost(string, tag = "1")]
    pub uri: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub total_histogram: ::core::option::Option<PUriHistogram>,
    #[prost(message, optional, tag = "3")]
    pub failed_histogram: ::core::option::Option<PUriHistogram>,
    #[prost(int64, tag = "4")]
    pub timestamp: i64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PAgentUriStat {
    #[prost(int32, tag = "1")]
    pub bucket_version: i32,
    #[prost(message, repeated, tag = "2")]
    pub each_uri_stat: ::prost::alloc::vec::Vec<PEachUriStat>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PStatMessage {
    #[prost(oneof = "p_stat_message::Field", tags = "1, 2, 3")]
    pub field: ::core::option::Option<p_stat_message::Field>,
}
/// Nested message and enum types in `PStatMessage`.
pub mod p_stat_message {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Field {
        #[prost(message, tag = "1")]
        AgentStat(super::PAgentStat),
        #[prost(message, tag = "2")]
        AgentStatBatch(super::PAgentStatBatch),
        #[prost(message, tag = "3")]
        AgentUriStat(super::PAgentUriStat),
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PJvmGcType {
    JvmGcTypeUnknown = 0,
    JvmGcTypeSerial = 1,
    JvmGcTypeParallel = 2,
    JvmGcTypeCms = 3,
    JvmGcTypeG1 = 4,
}
impl PJvmGcType {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            PJvmGcType::JvmGcTypeUnknown => "JVM_GC_TYPE_UNKNOWN",
            PJvmGcType::JvmGcTypeSerial => "JVM_GC_TYPE_SERIAL",
            PJvmGcType::JvmGcTypeParallel => "JVM_GC_TYPE_PARALLEL",
            PJvmGcType::JvmGcTypeCms => "JVM_GC_TYPE_CMS",
            PJvmGcType::JvmGcTypeG1 => "JVM_GC_TYPE_G1",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "JVM_GC_TYPE_UNKNOWN" => Some(Self::JvmGcTypeUnknown),
            "JVM_GC_TYPE_SERIAL" => Some(Self::JvmGcTypeSerial),
            "JVM_GC_TYPE_PARALLEL" => Some(Self::JvmGcTypeParallel),
            "JVM_GC_TYPE_CMS" => Some(Self::JvmGcTypeCms),
            "JVM_GC_TYPE_G1" => Some(Self::JvmGcTypeG1),
            _ => None,
        }
    }
}
/// Generated client implementations.
pub mod agent_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    /// Agent registration and liveness service.
    #[derive(Debug, Clone)]
    pub struct AgentClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl AgentClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> AgentClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> AgentClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
            >>::Error: Into<StdError> + Send + Sync,
        {
            AgentClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        /// Registers this agent instance with the collector.
        pub async fn request_agent_info(
            &mut self,
            request: impl tonic::IntoRequest<super::PAgentInfo>,
        ) -> std::result::Result<tonic::Response<super::PResult>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/v1.Agent/RequestAgentInfo");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("v1.Agent", "RequestAgentInfo"));
            self.inner.unary(req, path, codec).await
        }
        /// Keeps a bidirectional liveness stream open with the collector.
        pub async fn ping_session(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::PPing>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::PPing>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/v1.Agent/PingSession");
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("v1.Agent", "PingSession"));
            self.inner.streaming(req, path, codec).await
        }
    }
}
/// Generated client implementations.
pub mod metadata_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    /// Metadata interning service.
    #[derive(Debug, Clone)]
    pub struct MetadataClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl MetadataClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> MetadataClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> MetadataClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
            >>::Error: Into<StdError> + Send + Sync,
        {
            MetadataClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        /// Uploads an interned API operation name.
        pub async fn request_api_meta_data(
            &mut self,
            request: impl tonic::IntoRequest<super::PApiMetaData>,
        ) -> std::result::Result<tonic::Response<super::PResult>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/v1.Metadata/RequestApiMetaData",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("v1.Metadata", "RequestApiMetaData"));
            self.inner.unary(req, path, codec).await
        }
        /// Uploads an interned string (error name or SQL statement).
        pub async fn request_string_meta_data(
            &mut self,
            request: impl tonic::IntoRequest<super::PStringMetaData>,
        ) -> std::result::Result<tonic::Response<super::PResult>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/v1.Metadata/RequestStringMetaData",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("v1.Metadata", "RequestStringMetaData"));
            self.inner.unary(req, path, codec).await
        }
        /// Uploads the byte uid of a normalized SQL statement.
        pub async fn request_sql_uid_meta_data(
            &mut self,
            request: impl tonic::IntoRequest<super::PSqlUidMetaData>,
        ) -> std::result::Result<tonic::Response<super::PResult>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/v1.Metadata/RequestSqlUidMetaData",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("v1.Metadata", "RequestSqlUidMetaData"));
            self.inner.unary(req, path, codec).await
        }
        /// Uploads a captured exception with its call stack.
        pub async fn request_exception_meta_data(
            &mut self,
            request: impl tonic::IntoRequest<super::PExceptionMetaData>,
        ) -> std::result::Result<tonic::Response<super::PResult>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/v1.Metadata/RequestExceptionMetaData",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("v1.Metadata", "RequestExceptionMetaData"));
            self.inner.unary(req, path, codec).await
        }
    }
}
/// Generated client implementations.
pub mod span_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    /// Span upload service.
    #[derive(Debug, Clone)]
    pub struct SpanClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl SpanClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> SpanClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> SpanClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
            >>::Error: Into<StdError> + Send + Sync,
        {
            SpanClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        /// Streams span and span-chunk frames to the collector.
        pub async fn send_span(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::PSpanMessage>,
        ) -> std::result::Result<tonic::Response<()>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/v1.Span/SendSpan");
            let mut req = request.into_streaming_request();
            req.extensions_mut().insert(GrpcMethod::new("v1.Span", "SendSpan"));
            self.inner.client_streaming(req, path, codec).await
        }
    }
}
/// Generated client implementations.
pub mod stat_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;
    /// Statistics upload service.
    #[derive(Debug, Clone)]
    pub struct StatClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl StatClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> StatClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> StatClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
            >>::Error: Into<StdError> + Send + Sync,
        {
            StatClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        /// Streams agent-stat and uri-stat frames to the collector.
        pub async fn send_agent_stat(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::PStatMessage>,
        ) -> std::result::Result<tonic::Response<()>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/v1.Stat/SendAgentStat");
            let mut req = request.into_streaming_request();
            req.extensions_mut().insert(GrpcMethod::new("v1.Stat", "SendAgentStat"));
            self.inner.client_streaming(req, path, codec).await
        }
    }
}
