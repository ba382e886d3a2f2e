//! Agent configuration.
//!
//! Configuration is resolved once into an immutable [`Config`] snapshot:
//! defaults, then the YAML document (either a file named via
//! [`set_config_file_path`] / `PINPOINT_CPP_CONFIG_FILE` or an inline
//! string via [`set_config_string`]), then `PINPOINT_CPP_*` environment
//! overrides. Resolution never fails: unreadable input is logged and the
//! affected values fall back, out-of-range values are clamped.
//!
//! Reconfiguration swaps in a whole new snapshot; nothing mutates a live
//! `Config`.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::util;

/// Environment variable prefix, kept for drop-in compatibility with
/// existing agent deployments.
pub const ENV_PREFIX: &str = "PINPOINT_CPP_";

pub const SAMPLING_TYPE_COUNTER: &str = "COUNTER";
pub const SAMPLING_TYPE_PERCENT: &str = "PERCENT";

const DEFAULT_SPAN_QUEUE_SIZE: usize = 1024;
const DEFAULT_EVENT_CHUNK_SIZE: usize = 20;
const DEFAULT_MAX_EVENT_DEPTH: i32 = 64;
const DEFAULT_MAX_EVENT_SEQUENCE: i32 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config yaml: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogConfig {
    pub level: String,
    pub file_path: String,
    pub max_file_size: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectorConfig {
    pub host: String,
    pub agent_port: u16,
    pub span_port: u16,
    pub stat_port: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SamplingConfig {
    pub sampling_type: String,
    pub counter_rate: i32,
    pub percent_rate: f64,
    pub new_throughput: i64,
    pub cont_throughput: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpanConfig {
    pub queue_size: usize,
    pub max_event_depth: i32,
    pub max_event_sequence: i32,
    pub event_chunk_size: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatConfig {
    pub enable: bool,
    pub batch_count: usize,
    pub collect_interval_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UrlStatConfig {
    pub enable: bool,
    pub limit: usize,
    pub enable_trim_path: bool,
    pub trim_path_depth: i32,
    pub method_prefix: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HttpServerConfig {
    pub status_errors: Vec<String>,
    pub exclude_url: Vec<String>,
    pub exclude_method: Vec<String>,
    pub rec_request_header: Vec<String>,
    pub rec_request_cookie: Vec<String>,
    pub rec_response_header: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HttpClientConfig {
    pub rec_request_header: Vec<String>,
    pub rec_request_cookie: Vec<String>,
    pub rec_response_header: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HttpConfig {
    pub url_stat: UrlStatConfig,
    pub server: HttpServerConfig,
    pub client: HttpClientConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SqlConfig {
    pub max_bind_args_size: i32,
    pub enable_sql_stats: bool,
}

/// Immutable, validated configuration snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Config {
    pub enable: bool,
    pub app_name: String,
    pub app_type: i32,
    pub agent_id: String,
    pub agent_name: String,
    pub is_container: bool,
    pub enable_callstack_trace: bool,
    pub log: LogConfig,
    pub collector: CollectorConfig,
    pub sampling: SamplingConfig,
    pub span: SpanConfig,
    pub stat: StatConfig,
    pub http: HttpConfig,
    pub sql: SqlConfig,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            enable: true,
            app_name: String::new(),
            app_type: pinpoint::trace::DEFAULT_APP_TYPE,
            agent_id: String::new(),
            agent_name: String::new(),
            is_container: false,
            enable_callstack_trace: false,
            log: LogConfig {
                level: "info".to_string(),
                file_path: String::new(),
                max_file_size: 10,
            },
            collector: CollectorConfig {
                host: "localhost".to_string(),
                agent_port: 9991,
                stat_port: 9992,
                span_port: 9993,
            },
            sampling: SamplingConfig {
                sampling_type: SAMPLING_TYPE_COUNTER.to_string(),
                counter_rate: 1,
                percent_rate: 100.0,
                new_throughput: 0,
                cont_throughput: 0,
            },
            span: SpanConfig {
                queue_size: DEFAULT_SPAN_QUEUE_SIZE,
                max_event_depth: DEFAULT_MAX_EVENT_DEPTH,
                max_event_sequence: DEFAULT_MAX_EVENT_SEQUENCE,
                event_chunk_size: DEFAULT_EVENT_CHUNK_SIZE,
            },
            stat: StatConfig {
                enable: true,
                batch_count: 6,
                collect_interval_ms: 5000,
            },
            http: HttpConfig {
                url_stat: UrlStatConfig {
                    enable: false,
                    limit: 1024,
                    enable_trim_path: true,
                    trim_path_depth: 1,
                    method_prefix: false,
                },
                server: HttpServerConfig {
                    status_errors: vec!["5xx".to_string()],
                    exclude_url: Vec::new(),
                    exclude_method: Vec::new(),
                    rec_request_header: Vec::new(),
                    rec_request_cookie: Vec::new(),
                    rec_response_header: Vec::new(),
                },
                client: HttpClientConfig {
                    rec_request_header: Vec::new(),
                    rec_request_cookie: Vec::new(),
                    rec_response_header: Vec::new(),
                },
            },
            sql: SqlConfig {
                max_bind_args_size: 1024,
                enable_sql_stats: false,
            },
        }
    }
}

impl Config {
    pub fn is_percent_sampling(&self) -> bool {
        self.sampling
            .sampling_type
            .eq_ignore_ascii_case(SAMPLING_TYPE_PERCENT)
    }
}

// Raw YAML document, PascalCase keys, everything optional.

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawConfig {
    enable: Option<bool>,
    application_name: Option<String>,
    application_type: Option<i32>,
    agent_id: Option<String>,
    agent_name: Option<String>,
    is_container: Option<bool>,
    enable_callstack_trace: Option<bool>,
    log: RawLog,
    collector: RawCollector,
    sampling: RawSampling,
    span: RawSpan,
    stat: RawStat,
    http: RawHttp,
    sql: RawSql,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawLog {
    level: Option<String>,
    file_path: Option<String>,
    max_file_size: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawCollector {
    grpc_host: Option<String>,
    grpc_agent_port: Option<u16>,
    grpc_span_port: Option<u16>,
    grpc_stat_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawSampling {
    #[serde(rename = "Type")]
    sampling_type: Option<String>,
    counter_rate: Option<i32>,
    percent_rate: Option<f64>,
    new_throughput: Option<i64>,
    continue_throughput: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawSpan {
    queue_size: Option<i64>,
    max_event_depth: Option<i32>,
    max_event_sequence: Option<i32>,
    event_chunk_size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawStat {
    enable: Option<bool>,
    batch_count: Option<i64>,
    batch_interval: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawHttp {
    collect_url_stat: Option<bool>,
    url_stat_limit: Option<i64>,
    url_stat_enable_trim_path: Option<bool>,
    url_stat_trim_path_depth: Option<i32>,
    url_stat_method_prefix: Option<bool>,
    server: RawHttpServer,
    client: RawHttpClient,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawHttpServer {
    status_code_errors: Option<Vec<String>>,
    exclude_url: Option<Vec<String>>,
    exclude_method: Option<Vec<String>>,
    record_request_header: Option<Vec<String>>,
    record_request_cookie: Option<Vec<String>>,
    record_response_header: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawHttpClient {
    record_request_header: Option<Vec<String>>,
    record_request_cookie: Option<Vec<String>>,
    record_response_header: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawSql {
    max_bind_args_size: Option<i32>,
    enable_sql_stats: Option<bool>,
}

#[derive(Debug, Default)]
enum ConfigSource {
    #[default]
    Unset,
    FilePath(String),
    Inline(String),
}

static CONFIG_SOURCE: Mutex<ConfigSource> = Mutex::new(ConfigSource::Unset);

/// Remembers the YAML file to read when the agent is created.
pub fn set_config_file_path(path: &str) {
    if let Ok(mut source) = CONFIG_SOURCE.lock() {
        *source = ConfigSource::FilePath(path.to_string());
    }
}

/// Remembers an inline YAML document, taking precedence over any file.
pub fn set_config_string(yaml: &str) {
    if let Ok(mut source) = CONFIG_SOURCE.lock() {
        *source = if yaml.is_empty() {
            ConfigSource::Unset
        } else {
            ConfigSource::Inline(yaml.to_string())
        };
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.is_empty())
}

fn load_raw() -> RawConfig {
    let document: Option<String> = match CONFIG_SOURCE.lock() {
        Ok(source) => match &*source {
            ConfigSource::Inline(yaml) => Some(yaml.clone()),
            ConfigSource::FilePath(path) => read_config_file(path),
            ConfigSource::Unset => env_var("CONFIG_FILE").and_then(|path| read_config_file(&path)),
        },
        Err(_) => None,
    };

    match document {
        Some(yaml) => match serde_yaml::from_str::<RawConfig>(&yaml) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("config yaml ignored: {}", ConfigError::ParseYaml(err));
                RawConfig::default()
            }
        },
        None => RawConfig::default(),
    }
}

fn read_config_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(source) => {
            warn!(
                "{}",
                ConfigError::ReadFile {
                    path: path.to_string(),
                    source,
                }
            );
            None
        }
    }
}

/// Builds the resolved snapshot: defaults <- YAML <- environment, then
/// validation.
pub fn make_config() -> Config {
    let raw = load_raw();
    let mut cfg = Config::default();

    // YAML layer.
    if let Some(v) = raw.enable {
        cfg.enable = v;
    }
    if let Some(v) = raw.application_name {
        cfg.app_name = v;
    }
    if let Some(v) = raw.application_type {
        cfg.app_type = v;
    }
    if let Some(v) = raw.agent_id {
        cfg.agent_id = v;
    }
    if let Some(v) = raw.agent_name {
        cfg.agent_name = v;
    }
    if let Some(v) = raw.is_container {
        cfg.is_container = v;
    }
    if let Some(v) = raw.enable_callstack_trace {
        cfg.enable_callstack_trace = v;
    }
    if let Some(v) = raw.log.level {
        cfg.log.level = v;
    }
    if let Some(v) = raw.log.file_path {
        cfg.log.file_path = v;
    }
    if let Some(v) = raw.log.max_file_size {
        cfg.log.max_file_size = v;
    }
    if let Some(v) = raw.collector.grpc_host {
        cfg.collector.host = v;
    }
    if let Some(v) = raw.collector.grpc_agent_port {
        cfg.collector.agent_port = v;
    }
    if let Some(v) = raw.collector.grpc_span_port {
        cfg.collector.span_port = v;
    }
    if let Some(v) = raw.collector.grpc_stat_port {
        cfg.collector.stat_port = v;
    }
    if let Some(v) = raw.sampling.sampling_type {
        cfg.sampling.sampling_type = v;
    }
    if let Some(v) = raw.sampling.counter_rate {
        cfg.sampling.counter_rate = v;
    }
    if let Some(v) = raw.sampling.percent_rate {
        cfg.sampling.percent_rate = v;
    }
    if let Some(v) = raw.sampling.new_throughput {
        cfg.sampling.new_throughput = v;
    }
    if let Some(v) = raw.sampling.continue_throughput {
        cfg.sampling.cont_throughput = v;
    }
    if let Some(v) = raw.span.queue_size {
        cfg.span.queue_size = v.max(0) as usize;
    }
    if let Some(v) = raw.span.max_event_depth {
        cfg.span.max_event_depth = v;
    }
    if let Some(v) = raw.span.max_event_sequence {
        cfg.span.max_event_sequence = v;
    }
    if let Some(v) = raw.span.event_chunk_size {
        cfg.span.event_chunk_size = v.max(0) as usize;
    }
    if let Some(v) = raw.stat.enable {
        cfg.stat.enable = v;
    }
    if let Some(v) = raw.stat.batch_count {
        cfg.stat.batch_count = v.max(1) as usize;
    }
    if let Some(v) = raw.stat.batch_interval {
        cfg.stat.collect_interval_ms = v;
    }
    if let Some(v) = raw.http.collect_url_stat {
        cfg.http.url_stat.enable = v;
    }
    if let Some(v) = raw.http.url_stat_limit {
        cfg.http.url_stat.limit = v.max(0) as usize;
    }
    if let Some(v) = raw.http.url_stat_enable_trim_path {
        cfg.http.url_stat.enable_trim_path = v;
    }
    if let Some(v) = raw.http.url_stat_trim_path_depth {
        cfg.http.url_stat.trim_path_depth = v;
    }
    if let Some(v) = raw.http.url_stat_method_prefix {
        cfg.http.url_stat.method_prefix = v;
    }
    if let Some(v) = raw.http.server.status_code_errors {
        cfg.http.server.status_errors = v;
    }
    if let Some(v) = raw.http.server.exclude_url {
        cfg.http.server.exclude_url = v;
    }
    if let Some(v) = raw.http.server.exclude_method {
        cfg.http.server.exclude_method = v;
    }
    if let Some(v) = raw.http.server.record_request_header {
        cfg.http.server.rec_request_header = v;
    }
    if let Some(v) = raw.http.server.record_request_cookie {
        cfg.http.server.rec_request_cookie = v;
    }
    if let Some(v) = raw.http.server.record_response_header {
        cfg.http.server.rec_response_header = v;
    }
    if let Some(v) = raw.http.client.record_request_header {
        cfg.http.client.rec_request_header = v;
    }
    if let Some(v) = raw.http.client.record_request_cookie {
        cfg.http.client.rec_request_cookie = v;
    }
    if let Some(v) = raw.http.client.record_response_header {
        cfg.http.client.rec_response_header = v;
    }
    if let Some(v) = raw.sql.max_bind_args_size {
        cfg.sql.max_bind_args_size = v;
    }
    if let Some(v) = raw.sql.enable_sql_stats {
        cfg.sql.enable_sql_stats = v;
    }

    apply_env_overrides(&mut cfg);
    validate(&mut cfg);
    cfg
}

fn apply_env_overrides(cfg: &mut Config) {
    if let Some(v) = env_var("ENABLE").and_then(|v| util::parse_bool(&v)) {
        cfg.enable = v;
    }
    if let Some(v) = env_var("APPLICATION_NAME") {
        cfg.app_name = v;
    }
    if let Some(v) = env_var("APPLICATION_TYPE").and_then(|v| util::parse_i32(&v)) {
        cfg.app_type = v;
    }
    if let Some(v) = env_var("AGENT_ID") {
        cfg.agent_id = v;
    }
    if let Some(v) = env_var("AGENT_NAME") {
        cfg.agent_name = v;
    }
    if let Some(v) = env_var("IS_CONTAINER").and_then(|v| util::parse_bool(&v)) {
        cfg.is_container = v;
    }
    if let Some(v) = env_var("ENABLE_CALLSTACK_TRACE").and_then(|v| util::parse_bool(&v)) {
        cfg.enable_callstack_trace = v;
    }
    if let Some(v) = env_var("LOG_LEVEL") {
        cfg.log.level = v;
    }
    if let Some(v) = env_var("GRPC_HOST") {
        cfg.collector.host = v;
    }
    if let Some(v) = env_var("GRPC_AGENT_PORT").and_then(|v| util::parse_i32(&v)) {
        cfg.collector.agent_port = v as u16;
    }
    if let Some(v) = env_var("GRPC_SPAN_PORT").and_then(|v| util::parse_i32(&v)) {
        cfg.collector.span_port = v as u16;
    }
    if let Some(v) = env_var("GRPC_STAT_PORT").and_then(|v| util::parse_i32(&v)) {
        cfg.collector.stat_port = v as u16;
    }
    if let Some(v) = env_var("SAMPLING_TYPE") {
        cfg.sampling.sampling_type = v;
    }
    if let Some(v) = env_var("SAMPLING_COUNTER_RATE").and_then(|v| util::parse_i32(&v)) {
        cfg.sampling.counter_rate = v;
    }
    if let Some(v) = env_var("SAMPLING_PERCENT_RATE").and_then(|v| util::parse_f64(&v)) {
        cfg.sampling.percent_rate = v;
    }
    if let Some(v) = env_var("SAMPLING_NEW_THROUGHPUT").and_then(|v| util::parse_i64(&v)) {
        cfg.sampling.new_throughput = v;
    }
    if let Some(v) = env_var("SAMPLING_CONT_THROUGHPUT").and_then(|v| util::parse_i64(&v)) {
        cfg.sampling.cont_throughput = v;
    }
    if let Some(v) = env_var("SPAN_QUEUE_SIZE").and_then(|v| util::parse_i64(&v)) {
        cfg.span.queue_size = v.max(0) as usize;
    }
    if let Some(v) = env_var("SPAN_MAX_EVENT_DEPTH").and_then(|v| util::parse_i32(&v)) {
        cfg.span.max_event_depth = v;
    }
    if let Some(v) = env_var("SPAN_MAX_EVENT_SEQUENCE").and_then(|v| util::parse_i32(&v)) {
        cfg.span.max_event_sequence = v;
    }
    if let Some(v) = env_var("STAT_ENABLE").and_then(|v| util::parse_bool(&v)) {
        cfg.stat.enable = v;
    }
    if let Some(v) = env_var("HTTP_COLLECT_URL_STAT").and_then(|v| util::parse_bool(&v)) {
        cfg.http.url_stat.enable = v;
    }
    if let Some(v) = env_var("HTTP_URL_STAT_LIMIT").and_then(|v| util::parse_i64(&v)) {
        cfg.http.url_stat.limit = v.max(0) as usize;
    }
    if let Some(v) = env_var("HTTP_URL_STAT_ENABLE_TRIM_PATH").and_then(|v| util::parse_bool(&v)) {
        cfg.http.url_stat.enable_trim_path = v;
    }
    if let Some(v) = env_var("HTTP_URL_STAT_TRIM_PATH_DEPTH").and_then(|v| util::parse_i32(&v)) {
        cfg.http.url_stat.trim_path_depth = v;
    }
    if let Some(v) = env_var("HTTP_URL_STAT_METHOD_PREFIX").and_then(|v| util::parse_bool(&v)) {
        cfg.http.url_stat.method_prefix = v;
    }
    if let Some(v) = env_var("SQL_MAX_BIND_ARGS_SIZE").and_then(|v| util::parse_i32(&v)) {
        cfg.sql.max_bind_args_size = v;
    }
    if let Some(v) = env_var("SQL_ENABLE_SQL_STATS").and_then(|v| util::parse_bool(&v)) {
        cfg.sql.enable_sql_stats = v;
    }
}

fn validate(cfg: &mut Config) {
    if cfg.sampling.counter_rate < 0 {
        warn!(
            rate = cfg.sampling.counter_rate,
            "negative sampling counter rate, sampling disabled"
        );
        cfg.sampling.counter_rate = 0;
    }
    if cfg.sampling.percent_rate > 100.0 {
        warn!(
            rate = cfg.sampling.percent_rate,
            "sampling percent rate above 100, clamped"
        );
        cfg.sampling.percent_rate = 100.0;
    }
    if cfg.sampling.percent_rate < 0.0 {
        warn!(
            rate = cfg.sampling.percent_rate,
            "negative sampling percent rate, sampling disabled"
        );
        cfg.sampling.percent_rate = 0.0;
    }
    if cfg.sampling.percent_rate > 0.0 && cfg.sampling.percent_rate < 0.01 {
        cfg.sampling.percent_rate = 0.01;
    }
    if cfg.sampling.new_throughput < 0 {
        cfg.sampling.new_throughput = 0;
    }
    if cfg.sampling.cont_throughput < 0 {
        cfg.sampling.cont_throughput = 0;
    }
    if cfg.span.queue_size < 1 {
        warn!("span queue size below 1, using default");
        cfg.span.queue_size = DEFAULT_SPAN_QUEUE_SIZE;
    }
    if cfg.span.max_event_depth == -1 {
        cfg.span.max_event_depth = i32::MAX;
    } else if cfg.span.max_event_depth < 1 {
        warn!(
            depth = cfg.span.max_event_depth,
            "invalid max event depth, using default"
        );
        cfg.span.max_event_depth = DEFAULT_MAX_EVENT_DEPTH;
    }
    if cfg.span.max_event_sequence == -1 {
        cfg.span.max_event_sequence = i32::MAX;
    } else if cfg.span.max_event_sequence < 1 {
        warn!(
            sequence = cfg.span.max_event_sequence,
            "invalid max event sequence, using default"
        );
        cfg.span.max_event_sequence = DEFAULT_MAX_EVENT_SEQUENCE;
    }
    if cfg.span.event_chunk_size < 1 {
        warn!("span event chunk size below 1, using default");
        cfg.span.event_chunk_size = DEFAULT_EVENT_CHUNK_SIZE;
    }
    if cfg.http.url_stat.trim_path_depth < 1 {
        cfg.http.url_stat.trim_path_depth = 1;
    }
    if cfg.agent_id.is_empty() {
        cfg.agent_id = util::generate_agent_id();
    }
}

/// Serializes the snapshot for the collector-side debugging payload sent
/// with agent registration.
pub fn to_config_string(cfg: &Config) -> String {
    serde_yaml::to_string(cfg).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Config sources are process-global, so every test resets them.
    fn with_inline_yaml<R>(yaml: &str, f: impl FnOnce() -> R) -> R {
        set_config_string(yaml);
        let out = f();
        set_config_string("");
        out
    }

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert!(cfg.enable);
        assert_eq!(cfg.collector.agent_port, 9991);
        assert_eq!(cfg.collector.stat_port, 9992);
        assert_eq!(cfg.collector.span_port, 9993);
        assert_eq!(cfg.sampling.counter_rate, 1);
        assert_eq!(cfg.span.queue_size, 1024);
        assert_eq!(cfg.stat.collect_interval_ms, 5000);
        assert!(!cfg.is_percent_sampling());
    }

    #[test]
    fn yaml_document_overrides_defaults() {
        let yaml = r#"
ApplicationName: "MyTestApp"
ApplicationType: 1300
AgentId: "test-agent-123"

Collector:
  GrpcHost: "test.collector.host"
  GrpcAgentPort: 9000
  GrpcSpanPort: 9001
  GrpcStatPort: 9002

Sampling:
  Type: "PERCENT"
  PercentRate: 0.1

Span:
  QueueSize: 512
  MaxEventDepth: 32

Http:
  CollectUrlStat: true
  UrlStatLimit: 2048
  Server:
    StatusCodeErrors: ["5xx", "401"]
    ExcludeUrl: ["/health"]
"#;
        let cfg = with_inline_yaml(yaml, make_config);
        assert_eq!(cfg.app_name, "MyTestApp");
        assert_eq!(cfg.agent_id, "test-agent-123");
        assert_eq!(cfg.collector.host, "test.collector.host");
        assert_eq!(cfg.collector.agent_port, 9000);
        assert_eq!(cfg.collector.span_port, 9001);
        assert_eq!(cfg.collector.stat_port, 9002);
        assert!(cfg.is_percent_sampling());
        assert_eq!(cfg.sampling.percent_rate, 0.1);
        assert_eq!(cfg.span.queue_size, 512);
        assert_eq!(cfg.span.max_event_depth, 32);
        assert!(cfg.http.url_stat.enable);
        assert_eq!(cfg.http.url_stat.limit, 2048);
        assert_eq!(cfg.http.server.exclude_url, vec!["/health".to_string()]);
    }

    #[test]
    fn extreme_values_are_clamped() {
        let yaml = r#"
Sampling:
  CounterRate: -100
  PercentRate: 150.5

Span:
  QueueSize: 0
  MaxEventDepth: -1
  MaxEventSequence: -1
  EventChunkSize: 0
"#;
        let cfg = with_inline_yaml(yaml, make_config);
        assert_eq!(cfg.sampling.counter_rate, 0);
        assert_eq!(cfg.sampling.percent_rate, 100.0);
        assert_eq!(cfg.span.queue_size, 1024);
        assert_eq!(cfg.span.max_event_depth, i32::MAX);
        assert_eq!(cfg.span.max_event_sequence, i32::MAX);
        assert_eq!(cfg.span.event_chunk_size, 20);
    }

    #[test]
    fn tiny_percent_rate_rounds_up() {
        let yaml = "Sampling:\n  PercentRate: 0.001\n";
        let cfg = with_inline_yaml(yaml, make_config);
        assert_eq!(cfg.sampling.percent_rate, 0.01);
    }

    #[test]
    fn env_overrides_beat_yaml() {
        let yaml = "ApplicationName: \"FromYaml\"\n";
        temp_env::with_vars(
            [
                ("PINPOINT_CPP_APPLICATION_NAME", Some("FromEnv")),
                ("PINPOINT_CPP_GRPC_AGENT_PORT", Some("7777")),
                ("PINPOINT_CPP_SAMPLING_TYPE", Some("PERCENT")),
                ("PINPOINT_CPP_STAT_ENABLE", Some("false")),
            ],
            || {
                let cfg = with_inline_yaml(yaml, make_config);
                assert_eq!(cfg.app_name, "FromEnv");
                assert_eq!(cfg.collector.agent_port, 7777);
                assert!(cfg.is_percent_sampling());
                assert!(!cfg.stat.enable);
            },
        );
    }

    #[test]
    fn blank_agent_id_is_generated() {
        let cfg = with_inline_yaml("ApplicationName: \"x\"\n", make_config);
        assert_eq!(cfg.agent_id.len(), 16);
    }

    #[test]
    fn invalid_yaml_falls_back_to_defaults() {
        let cfg = with_inline_yaml("Application: [unclosed\n  nope", make_config);
        assert_eq!(cfg.collector.agent_port, 9991);
        assert!(cfg.enable);
    }

    #[test]
    fn config_string_round_trips_app_identity() {
        let mut cfg = Config::default();
        cfg.app_name = "serialized".to_string();
        let text = to_config_string(&cfg);
        assert!(text.contains("serialized"));
        assert!(text.contains("collector"));
    }
}
