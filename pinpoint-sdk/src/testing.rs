//! In-crate test double for the [`AgentService`] seam.
//!
//! Records everything the agent would have shipped so span, event and
//! worker tests can assert on it without a collector.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use pinpoint::annotation::Annotation;
use pinpoint::trace::{HeaderReader, HeaderType, TraceId};

use crate::agent::AgentService;
use crate::cache::{IdCache, SqlUidCache};
use crate::config::Config;
use crate::http::HttpStatusErrors;
use crate::stats::{AgentStats, StatsType};
use crate::trace::{ExceptionMeta, SpanChunk};
use crate::url_stat::{UrlStatEntry, UrlStatSnapshot};
use crate::util;

pub(crate) struct TestAgentService {
    config: Arc<Config>,
    start_time: i64,
    trace_id_sequence: AtomicI64,
    agent_stats: Arc<AgentStats>,
    status_errors: HttpStatusErrors,
    api_cache: IdCache,
    error_cache: IdCache,
    sql_cache: IdCache,
    sql_uid_cache: SqlUidCache,
    chunks: Mutex<Vec<SpanChunk>>,
    url_stats: Mutex<Vec<UrlStatEntry>>,
    stats_kinds: Mutex<Vec<StatsType>>,
    exceptions: Mutex<Vec<ExceptionMeta>>,
    url_snapshot: Mutex<UrlStatSnapshot>,
    shutdown_tx: watch::Sender<bool>,
}

impl TestAgentService {
    pub(crate) fn new() -> TestAgentService {
        TestAgentService::with_config(Config::default())
    }

    pub(crate) fn with_config(mut config: Config) -> TestAgentService {
        if config.app_name.is_empty() {
            config.app_name = "test-app".to_string();
        }
        if config.agent_id.is_empty() {
            config.agent_id = "test-agent".to_string();
        }
        let status_errors = HttpStatusErrors::new(&config.http.server.status_errors);
        let (shutdown_tx, _) = watch::channel(false);
        TestAgentService {
            config: Arc::new(config),
            start_time: util::now_millis(),
            trace_id_sequence: AtomicI64::new(1),
            agent_stats: Arc::new(AgentStats::new()),
            status_errors,
            api_cache: IdCache::new(64),
            error_cache: IdCache::new(64),
            sql_cache: IdCache::new(64),
            sql_uid_cache: SqlUidCache::new(64),
            chunks: Mutex::new(Vec::new()),
            url_stats: Mutex::new(Vec::new()),
            stats_kinds: Mutex::new(Vec::new()),
            exceptions: Mutex::new(Vec::new()),
            url_snapshot: Mutex::new(UrlStatSnapshot::default()),
            shutdown_tx,
        }
    }

    pub(crate) fn chunks(&self) -> Vec<SpanChunk> {
        self.chunks.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub(crate) fn url_stats(&self) -> Vec<UrlStatEntry> {
        self.url_stats.lock().map(|u| u.clone()).unwrap_or_default()
    }

    pub(crate) fn exceptions(&self) -> Vec<ExceptionMeta> {
        self.exceptions
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    #[allow(dead_code)]
    pub(crate) fn stats_kinds(&self) -> Vec<StatsType> {
        self.stats_kinds
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    #[allow(dead_code)]
    pub(crate) fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl AgentService for TestAgentService {
    fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    fn is_exiting(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    fn app_name(&self) -> String {
        self.config.app_name.clone()
    }

    fn app_type(&self) -> i32 {
        self.config.app_type
    }

    fn agent_id(&self) -> String {
        self.config.agent_id.clone()
    }

    fn agent_name(&self) -> String {
        self.config.agent_name.clone()
    }

    fn start_time(&self) -> i64 {
        self.start_time
    }

    fn generate_trace_id(&self) -> TraceId {
        TraceId {
            agent_id: self.config.agent_id.clone(),
            start_time: self.start_time,
            sequence: self.trace_id_sequence.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn agent_stats(&self) -> Arc<AgentStats> {
        self.agent_stats.clone()
    }

    fn record_span(&self, chunk: SpanChunk) {
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.push(chunk);
        }
    }

    fn record_url_stat(&self, entry: UrlStatEntry) {
        if let Ok(mut url_stats) = self.url_stats.lock() {
            url_stats.push(entry);
        }
    }

    fn record_stats(&self, kind: StatsType) {
        if let Ok(mut kinds) = self.stats_kinds.lock() {
            kinds.push(kind);
        }
    }

    fn record_exception(&self, meta: ExceptionMeta) {
        if let Ok(mut exceptions) = self.exceptions.lock() {
            exceptions.push(meta);
        }
    }

    fn cache_api(&self, api_str: &str, api_type: i32) -> i32 {
        self.api_cache
            .get(&format!("{}_{}", api_str, api_type))
            .id
    }

    fn remove_cache_api(&self, api_str: &str, api_type: i32) {
        self.api_cache.remove(&format!("{}_{}", api_str, api_type));
    }

    fn cache_error(&self, error_name: &str) -> i32 {
        self.error_cache.get(error_name).id
    }

    fn remove_cache_error(&self, error_name: &str) {
        self.error_cache.remove(error_name);
    }

    fn cache_sql(&self, sql: &str) -> i32 {
        self.sql_cache.get(sql).id
    }

    fn remove_cache_sql(&self, sql: &str) {
        self.sql_cache.remove(sql);
    }

    fn cache_sql_uid(&self, sql: &str) -> Vec<u8> {
        self.sql_uid_cache.get(sql).uid
    }

    fn remove_cache_sql_uid(&self, sql: &str) {
        self.sql_uid_cache.remove(sql);
    }

    fn is_status_fail(&self, status: i32) -> bool {
        self.status_errors.is_error_code(status)
    }

    fn record_server_header(
        &self,
        _which: HeaderType,
        _reader: &dyn HeaderReader,
        _annotation: &Annotation,
    ) {
    }

    fn record_client_header(
        &self,
        _which: HeaderType,
        _reader: &dyn HeaderReader,
        _annotation: &Annotation,
    ) {
    }

    fn add_url_stat_to_snapshot(&self, entry: UrlStatEntry) {
        if let Ok(mut snapshot) = self.url_snapshot.lock() {
            snapshot.add(&entry, &self.config);
        }
    }

    fn take_url_snapshot(&self) -> UrlStatSnapshot {
        self.url_snapshot
            .lock()
            .map(|mut snapshot| std::mem::take(&mut *snapshot))
            .unwrap_or_default()
    }
}
