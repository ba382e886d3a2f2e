//! The concrete agent: wiring between configuration, samplers, caches,
//! statistics and the transport workers.
//!
//! A process holds at most one [`AgentImpl`], reachable through
//! [`create_agent`] / [`global_agent`]. The agent owns a small tokio
//! runtime; workers are spawned once the collector channel is ready and
//! the registration call has succeeded. Until then (and whenever tracing
//! is disabled) every span request yields a no-op handle.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use pinpoint::annotation::{
    Annotation, ANNOTATION_HTTP_COOKIE, ANNOTATION_HTTP_REQUEST_HEADER,
    ANNOTATION_HTTP_RESPONSE_HEADER,
};
use pinpoint::noop::{noop_agent, noop_span};
use pinpoint::propagation::{
    EmptyContextReader, TraceContextReader, HEADER_SAMPLED, HEADER_TRACE_ID, SAMPLED_FALSE,
};
use pinpoint::trace::{Agent, AgentPtr, HeaderReader, HeaderType, SpanPtr, TraceId};

use crate::cache::{IdCache, SqlUidCache};
use crate::config::{self, Config};
use crate::grpc::{self, ClientKind, MetaData};
use crate::http::{HttpHeaderRecorder, HttpMethodFilter, HttpStatusErrors, HttpUrlFilter};
use crate::logging;
use crate::sampler::{
    BasicTraceSampler, CounterSampler, PercentSampler, Sampler, ThroughputLimitTraceSampler,
    TraceSampler,
};
use crate::stats::{self, AgentStats, StatsType};
use crate::trace::{ExceptionMeta, SpanChunk, SpanImpl, UnsampledSpan};
use crate::url_stat::{self, UrlStatEntry, UrlStatSnapshot};
use crate::util;

const CACHE_SIZE: usize = 1024;
const MAX_STATS_QUEUE_SIZE: usize = 2;
const REGISTER_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to start agent runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Internal service boundary between the agent and the objects it owns
/// (spans, samplers, workers). Tests substitute this seam.
pub(crate) trait AgentService: Send + Sync {
    fn config(&self) -> Arc<Config>;
    fn is_exiting(&self) -> bool;
    fn shutdown_signal(&self) -> watch::Receiver<bool>;

    fn app_name(&self) -> String;
    fn app_type(&self) -> i32;
    fn agent_id(&self) -> String;
    fn agent_name(&self) -> String;
    fn start_time(&self) -> i64;
    fn generate_trace_id(&self) -> TraceId;
    fn agent_stats(&self) -> Arc<AgentStats>;

    fn record_span(&self, chunk: SpanChunk);
    fn record_url_stat(&self, entry: UrlStatEntry);
    fn record_stats(&self, kind: StatsType);
    fn record_exception(&self, meta: ExceptionMeta);

    fn cache_api(&self, api_str: &str, api_type: i32) -> i32;
    fn remove_cache_api(&self, api_str: &str, api_type: i32);
    fn cache_error(&self, error_name: &str) -> i32;
    fn remove_cache_error(&self, error_name: &str);
    fn cache_sql(&self, sql: &str) -> i32;
    fn remove_cache_sql(&self, sql: &str);
    fn cache_sql_uid(&self, sql: &str) -> Vec<u8>;
    fn remove_cache_sql_uid(&self, sql: &str);

    fn is_status_fail(&self, status: i32) -> bool;
    fn record_server_header(
        &self,
        which: HeaderType,
        reader: &dyn HeaderReader,
        annotation: &Annotation,
    );
    fn record_client_header(
        &self,
        which: HeaderType,
        reader: &dyn HeaderReader,
        annotation: &Annotation,
    );

    fn add_url_stat_to_snapshot(&self, entry: UrlStatEntry);
    fn take_url_snapshot(&self) -> UrlStatSnapshot;
}

type HeaderRecorders = [Option<Arc<HttpHeaderRecorder>>; 3];

fn header_index(which: HeaderType) -> usize {
    match which {
        HeaderType::Request => 0,
        HeaderType::Response => 1,
        HeaderType::Cookie => 2,
    }
}

fn build_sampler(cfg: &Config, stats: Arc<AgentStats>) -> Arc<dyn TraceSampler> {
    let base: Box<dyn Sampler> = if cfg.is_percent_sampling() {
        Box::new(PercentSampler::new(cfg.sampling.percent_rate))
    } else {
        Box::new(CounterSampler::new(cfg.sampling.counter_rate))
    };

    if cfg.sampling.new_throughput > 0 || cfg.sampling.cont_throughput > 0 {
        Arc::new(ThroughputLimitTraceSampler::new(
            base,
            cfg.sampling.new_throughput,
            cfg.sampling.cont_throughput,
            stats,
        ))
    } else {
        Arc::new(BasicTraceSampler::new(base, stats))
    }
}

fn build_server_recorders(cfg: &Config) -> HeaderRecorders {
    let server = &cfg.http.server;
    let build = |key, headers: &Vec<String>| {
        (!headers.is_empty()).then(|| Arc::new(HttpHeaderRecorder::new(key, headers)))
    };
    [
        build(ANNOTATION_HTTP_REQUEST_HEADER, &server.rec_request_header),
        build(ANNOTATION_HTTP_RESPONSE_HEADER, &server.rec_response_header),
        build(ANNOTATION_HTTP_COOKIE, &server.rec_request_cookie),
    ]
}

fn build_client_recorders(cfg: &Config) -> HeaderRecorders {
    let client = &cfg.http.client;
    let build = |key, headers: &Vec<String>| {
        (!headers.is_empty()).then(|| Arc::new(HttpHeaderRecorder::new(key, headers)))
    };
    [
        build(ANNOTATION_HTTP_REQUEST_HEADER, &client.rec_request_header),
        build(ANNOTATION_HTTP_RESPONSE_HEADER, &client.rec_response_header),
        build(ANNOTATION_HTTP_COOKIE, &client.rec_request_cookie),
    ]
}

pub(crate) struct AgentImpl {
    weak: Weak<AgentImpl>,
    config: RwLock<Arc<Config>>,
    start_time: i64,
    trace_id_sequence: AtomicI64,
    enabled: AtomicBool,
    exiting: AtomicBool,
    shutdown_tx: watch::Sender<bool>,

    sampler: RwLock<Arc<dyn TraceSampler>>,
    url_filter: RwLock<Option<Arc<HttpUrlFilter>>>,
    method_filter: RwLock<Option<Arc<HttpMethodFilter>>>,
    status_errors: RwLock<Option<Arc<HttpStatusErrors>>>,
    server_header_recorders: RwLock<HeaderRecorders>,
    client_header_recorders: RwLock<HeaderRecorders>,

    api_cache: IdCache,
    error_cache: IdCache,
    sql_cache: IdCache,
    sql_uid_cache: SqlUidCache,

    agent_stats: Arc<AgentStats>,
    url_snapshot: Mutex<UrlStatSnapshot>,

    span_tx: mpsc::Sender<SpanChunk>,
    meta_tx: mpsc::Sender<MetaData>,
    stat_tx: mpsc::Sender<StatsType>,
    url_tx: mpsc::Sender<UrlStatEntry>,
    span_rx: Mutex<Option<mpsc::Receiver<SpanChunk>>>,
    meta_rx: Mutex<Option<mpsc::Receiver<MetaData>>>,
    stat_rx: Mutex<Option<mpsc::Receiver<StatsType>>>,
    url_rx: Mutex<Option<mpsc::Receiver<UrlStatEntry>>>,
    span_force_empty: Arc<AtomicBool>,
    stat_force_empty: Arc<AtomicBool>,

    runtime: Mutex<Option<tokio::runtime::Runtime>>,
}

impl AgentImpl {
    pub(crate) fn new(cfg: Config) -> Result<Arc<AgentImpl>, AgentError> {
        logging::init_logger(&cfg.log);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("pinpoint-agent")
            .enable_all()
            .build()?;

        let (shutdown_tx, _) = watch::channel(false);
        let (span_tx, span_rx) = mpsc::channel(cfg.span.queue_size);
        let (meta_tx, meta_rx) = mpsc::channel(cfg.span.queue_size);
        let (url_tx, url_rx) = mpsc::channel(cfg.span.queue_size);
        let (stat_tx, stat_rx) = mpsc::channel(MAX_STATS_QUEUE_SIZE);

        let agent_stats = Arc::new(AgentStats::new());
        let config = Arc::new(cfg);

        let agent = Arc::new_cyclic(|weak| AgentImpl {
            weak: weak.clone(),
            start_time: util::now_millis(),
            trace_id_sequence: AtomicI64::new(1),
            enabled: AtomicBool::new(false),
            exiting: AtomicBool::new(false),
            shutdown_tx,
            sampler: RwLock::new(build_sampler(&config, agent_stats.clone())),
            url_filter: RwLock::new(
                (!config.http.server.exclude_url.is_empty())
                    .then(|| Arc::new(HttpUrlFilter::new(&config.http.server.exclude_url))),
            ),
            method_filter: RwLock::new(
                (!config.http.server.exclude_method.is_empty())
                    .then(|| Arc::new(HttpMethodFilter::new(&config.http.server.exclude_method))),
            ),
            status_errors: RwLock::new(
                (!config.http.server.status_errors.is_empty())
                    .then(|| Arc::new(HttpStatusErrors::new(&config.http.server.status_errors))),
            ),
            server_header_recorders: RwLock::new(build_server_recorders(&config)),
            client_header_recorders: RwLock::new(build_client_recorders(&config)),
            api_cache: IdCache::new(CACHE_SIZE),
            error_cache: IdCache::new(CACHE_SIZE),
            sql_cache: IdCache::new(CACHE_SIZE),
            sql_uid_cache: SqlUidCache::new(CACHE_SIZE),
            agent_stats,
            url_snapshot: Mutex::new(UrlStatSnapshot::default()),
            span_tx,
            meta_tx,
            stat_tx,
            url_tx,
            span_rx: Mutex::new(Some(span_rx)),
            meta_rx: Mutex::new(Some(meta_rx)),
            stat_rx: Mutex::new(Some(stat_rx)),
            url_rx: Mutex::new(Some(url_rx)),
            span_force_empty: Arc::new(AtomicBool::new(false)),
            stat_force_empty: Arc::new(AtomicBool::new(false)),
            runtime: Mutex::new(None),
            config: RwLock::new(config),
        });
        if let Ok(mut slot) = agent.runtime.lock() {
            *slot = Some(runtime);
        }
        Ok(agent)
    }

    fn service(&self) -> Option<Arc<dyn AgentService>> {
        self.weak
            .upgrade()
            .map(|agent| agent as Arc<dyn AgentService>)
    }

    fn take_receiver<T>(slot: &Mutex<Option<mpsc::Receiver<T>>>) -> Option<mpsc::Receiver<T>> {
        slot.lock().ok().and_then(|mut rx| rx.take())
    }

    /// Spawns the init task: wait for the agent channel, register, then
    /// start every worker and enable tracing.
    pub(crate) fn start(self: &Arc<Self>) {
        let this = self.clone();
        let Some(service) = self.service() else {
            return;
        };

        let guard = match self.runtime.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        let Some(runtime) = guard.as_ref() else {
            return;
        };

        runtime.spawn(async move {
            let agent = service;
            let mut shutdown = agent.shutdown_signal();

            let Some((channel, _)) = grpc::ready_channel(&agent, ClientKind::Agent).await else {
                return;
            };
            loop {
                if agent.is_exiting() {
                    return;
                }
                if grpc::register_agent(&agent, channel.clone()).await.is_ok() {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(REGISTER_RETRY_DELAY) => {}
                    _ = shutdown.changed() => return,
                }
            }

            tokio::spawn(grpc::ping_worker(agent.clone(), Some(channel.clone())));
            if let Some(rx) = Self::take_receiver(&this.meta_rx) {
                tokio::spawn(grpc::meta_worker(agent.clone(), channel, rx));
            }
            if let Some(rx) = Self::take_receiver(&this.span_rx) {
                tokio::spawn(grpc::span::span_worker(
                    agent.clone(),
                    rx,
                    this.span_force_empty.clone(),
                ));
            }
            if let Some(rx) = Self::take_receiver(&this.stat_rx) {
                tokio::spawn(grpc::stat::stat_worker(
                    agent.clone(),
                    rx,
                    this.stat_force_empty.clone(),
                ));
            }
            if let Some(rx) = Self::take_receiver(&this.url_rx) {
                tokio::spawn(url_stat::add_url_stats_worker(agent.clone(), rx));
            }
            tokio::spawn(url_stat::send_url_stats_worker(agent.clone()));
            tokio::spawn(stats::agent_stats_worker(agent.clone()));

            this.enabled.store(true, Ordering::Release);
            info!("pinpoint agent started");
        });
    }

    /// Swaps in a new config snapshot and rebuilds samplers, filters and
    /// header recorders. Live spans keep their sampling decision.
    pub(crate) fn reload_config(&self, cfg: Config) {
        let config = Arc::new(cfg);

        if let Ok(mut slot) = self.sampler.write() {
            *slot = build_sampler(&config, self.agent_stats.clone());
        }
        if let Ok(mut slot) = self.url_filter.write() {
            *slot = (!config.http.server.exclude_url.is_empty())
                .then(|| Arc::new(HttpUrlFilter::new(&config.http.server.exclude_url)));
        }
        if let Ok(mut slot) = self.method_filter.write() {
            *slot = (!config.http.server.exclude_method.is_empty())
                .then(|| Arc::new(HttpMethodFilter::new(&config.http.server.exclude_method)));
        }
        if let Ok(mut slot) = self.status_errors.write() {
            *slot = (!config.http.server.status_errors.is_empty())
                .then(|| Arc::new(HttpStatusErrors::new(&config.http.server.status_errors)));
        }
        if let Ok(mut slot) = self.server_header_recorders.write() {
            *slot = build_server_recorders(&config);
        }
        if let Ok(mut slot) = self.client_header_recorders.write() {
            *slot = build_client_recorders(&config);
        }
        if let Ok(mut slot) = self.config.write() {
            *slot = config;
        }
    }

    fn create_span(
        &self,
        operation: &str,
        rpc_point: &str,
        method: &str,
        reader: &dyn TraceContextReader,
    ) -> SpanPtr {
        if !self.enabled.load(Ordering::Acquire) {
            return noop_span();
        }
        let Some(service) = self.service() else {
            return noop_span();
        };

        let url_filter = self.url_filter.read().ok().and_then(|f| f.clone());
        if let Some(filter) = url_filter {
            if filter.is_filtered(rpc_point) {
                return noop_span();
            }
        }
        if !method.is_empty() {
            let method_filter = self.method_filter.read().ok().and_then(|f| f.clone());
            if let Some(filter) = method_filter {
                if filter.is_filtered(method) {
                    return noop_span();
                }
            }
        }

        if reader.get(HEADER_SAMPLED).as_deref() == Some(SAMPLED_FALSE) {
            self.agent_stats.incr_unsample_cont();
            return Arc::new(UnsampledSpan::new(service));
        }

        let Some(sampler) = self.sampler.read().ok().map(|s| s.clone()) else {
            return noop_span();
        };
        let sampled = if reader.get(HEADER_TRACE_ID).is_some() {
            sampler.is_continue_sampled()
        } else {
            sampler.is_new_sampled()
        };

        let span: SpanPtr = if sampled {
            Arc::new(SpanImpl::new(service, operation, rpc_point))
        } else {
            Arc::new(UnsampledSpan::new(service))
        };
        span.extract_context(reader);
        span
    }

    fn shutdown_impl(&self) {
        if self.exiting.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("agent shutdown");
        self.enabled.store(false, Ordering::Release);

        if let Ok(mut global) = GLOBAL_AGENT.lock() {
            let is_self = global
                .as_ref()
                .is_some_and(|agent| std::ptr::eq(Arc::as_ptr(agent), self));
            if is_self {
                *global = None;
            }
        }

        let _ = self.shutdown_tx.send(true);

        let runtime = self.runtime.lock().ok().and_then(|mut slot| slot.take());
        if let Some(runtime) = runtime {
            // Bounded drain; tasks still running after the deadline are
            // abandoned with the runtime.
            let joiner =
                std::thread::spawn(move || runtime.shutdown_timeout(Duration::from_secs(5)));
            let _ = joiner.join();
        }
    }

    #[cfg(test)]
    pub(crate) fn force_enable_for_test(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn take_span_receiver_for_test(&self) -> Option<mpsc::Receiver<SpanChunk>> {
        Self::take_receiver(&self.span_rx)
    }

    #[cfg(test)]
    pub(crate) fn span_force_empty_for_test(&self) -> bool {
        self.span_force_empty.load(Ordering::Relaxed)
    }
}

impl AgentService for AgentImpl {
    fn config(&self) -> Arc<Config> {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_else(|_| Arc::new(Config::default()))
    }

    fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::Acquire)
    }

    fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    fn app_name(&self) -> String {
        self.config().app_name.clone()
    }

    fn app_type(&self) -> i32 {
        self.config().app_type
    }

    fn agent_id(&self) -> String {
        self.config().agent_id.clone()
    }

    fn agent_name(&self) -> String {
        self.config().agent_name.clone()
    }

    fn start_time(&self) -> i64 {
        self.start_time
    }

    fn generate_trace_id(&self) -> TraceId {
        TraceId {
            agent_id: self.agent_id(),
            start_time: self.start_time,
            sequence: self.trace_id_sequence.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn agent_stats(&self) -> Arc<AgentStats> {
        self.agent_stats.clone()
    }

    fn record_span(&self, chunk: SpanChunk) {
        if !self.enabled.load(Ordering::Acquire) {
            return;
        }
        if let Err(mpsc::error::TrySendError::Full(_)) = self.span_tx.try_send(chunk) {
            debug!("drop span: queue full");
            self.span_force_empty.store(true, Ordering::Relaxed);
        }
    }

    fn record_url_stat(&self, entry: UrlStatEntry) {
        if !self.enabled.load(Ordering::Acquire) || !self.config().http.url_stat.enable {
            return;
        }
        if self.url_tx.try_send(entry).is_err() {
            debug!("drop url stats: queue full");
        }
    }

    fn record_stats(&self, kind: StatsType) {
        if !self.enabled.load(Ordering::Acquire) {
            return;
        }
        if let Err(mpsc::error::TrySendError::Full(_)) = self.stat_tx.try_send(kind) {
            debug!("drop stats: queue full");
            self.stat_force_empty.store(true, Ordering::Relaxed);
        }
    }

    fn record_exception(&self, meta: ExceptionMeta) {
        if !self.enabled.load(Ordering::Acquire) || !self.config().enable_callstack_trace {
            return;
        }
        if self.meta_tx.try_send(MetaData::Exception(meta)).is_err() {
            debug!("drop exception metadata: queue full");
        }
    }

    fn cache_api(&self, api_str: &str, api_type: i32) -> i32 {
        if !self.enabled.load(Ordering::Acquire) {
            return 0;
        }
        let key = format!("{}_{}", api_str, api_type);
        let result = self.api_cache.get(&key);
        if result.old {
            return result.id;
        }
        if self
            .meta_tx
            .try_send(MetaData::Api {
                id: result.id,
                api_type,
                api_str: api_str.to_string(),
            })
            .is_err()
        {
            debug!("drop api metadata: queue full");
        }
        result.id
    }

    fn remove_cache_api(&self, api_str: &str, api_type: i32) {
        self.api_cache.remove(&format!("{}_{}", api_str, api_type));
    }

    fn cache_error(&self, error_name: &str) -> i32 {
        if !self.enabled.load(Ordering::Acquire) {
            return 0;
        }
        let result = self.error_cache.get(error_name);
        if result.old {
            return result.id;
        }
        if self
            .meta_tx
            .try_send(MetaData::Error {
                id: result.id,
                name: error_name.to_string(),
            })
            .is_err()
        {
            debug!("drop string metadata: queue full");
        }
        result.id
    }

    fn remove_cache_error(&self, error_name: &str) {
        self.error_cache.remove(error_name);
    }

    fn cache_sql(&self, sql: &str) -> i32 {
        if !self.enabled.load(Ordering::Acquire) {
            return 0;
        }
        let result = self.sql_cache.get(sql);
        if result.old {
            return result.id;
        }
        if self
            .meta_tx
            .try_send(MetaData::Sql {
                id: result.id,
                sql: sql.to_string(),
            })
            .is_err()
        {
            debug!("drop sql metadata: queue full");
        }
        result.id
    }

    fn remove_cache_sql(&self, sql: &str) {
        self.sql_cache.remove(sql);
    }

    fn cache_sql_uid(&self, sql: &str) -> Vec<u8> {
        if !self.enabled.load(Ordering::Acquire) {
            return Vec::new();
        }
        let result = self.sql_uid_cache.get(sql);
        if result.old {
            return result.uid;
        }
        if self
            .meta_tx
            .try_send(MetaData::SqlUid {
                uid: result.uid.clone(),
                sql: sql.to_string(),
            })
            .is_err()
        {
            debug!("drop sql uid metadata: queue full");
        }
        result.uid
    }

    fn remove_cache_sql_uid(&self, sql: &str) {
        self.sql_uid_cache.remove(sql);
    }

    fn is_status_fail(&self, status: i32) -> bool {
        if !self.enabled.load(Ordering::Acquire) {
            return false;
        }
        self.status_errors
            .read()
            .ok()
            .and_then(|slot| slot.clone())
            .map(|errors| errors.is_error_code(status))
            .unwrap_or(false)
    }

    fn record_server_header(
        &self,
        which: HeaderType,
        reader: &dyn HeaderReader,
        annotation: &Annotation,
    ) {
        if !self.enabled.load(Ordering::Acquire) {
            return;
        }
        let recorder = self
            .server_header_recorders
            .read()
            .ok()
            .and_then(|slot| slot[header_index(which)].clone());
        if let Some(recorder) = recorder {
            recorder.record(reader, annotation);
        }
    }

    fn record_client_header(
        &self,
        which: HeaderType,
        reader: &dyn HeaderReader,
        annotation: &Annotation,
    ) {
        if !self.enabled.load(Ordering::Acquire) {
            return;
        }
        let recorder = self
            .client_header_recorders
            .read()
            .ok()
            .and_then(|slot| slot[header_index(which)].clone());
        if let Some(recorder) = recorder {
            recorder.record(reader, annotation);
        }
    }

    fn add_url_stat_to_snapshot(&self, entry: UrlStatEntry) {
        let config = self.config();
        if let Ok(mut snapshot) = self.url_snapshot.lock() {
            snapshot.add(&entry, &config);
        }
    }

    fn take_url_snapshot(&self) -> UrlStatSnapshot {
        self.url_snapshot
            .lock()
            .map(|mut snapshot| std::mem::take(&mut *snapshot))
            .unwrap_or_default()
    }
}

impl Agent for AgentImpl {
    fn new_span(&self, operation: &str, rpc_point: &str) -> SpanPtr {
        self.create_span(operation, rpc_point, "", &EmptyContextReader)
    }

    fn new_span_with_reader(
        &self,
        operation: &str,
        rpc_point: &str,
        reader: &dyn TraceContextReader,
    ) -> SpanPtr {
        self.create_span(operation, rpc_point, "", reader)
    }

    fn new_span_with_method(
        &self,
        operation: &str,
        rpc_point: &str,
        method: &str,
        reader: &dyn TraceContextReader,
    ) -> SpanPtr {
        self.create_span(operation, rpc_point, method, reader)
    }

    fn enable(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        self.shutdown_impl();
    }
}

static GLOBAL_AGENT: Mutex<Option<Arc<AgentImpl>>> = Mutex::new(None);

fn create_agent_helper(cfg: Config) -> AgentPtr {
    let Ok(mut global) = GLOBAL_AGENT.lock() else {
        return noop_agent();
    };

    if !cfg.enable {
        info!("agent disabled by configuration");
        return noop_agent();
    }
    if cfg.app_name.is_empty() {
        warn!("application name is required, agent disabled");
        return noop_agent();
    }

    if let Some(existing) = global.as_ref() {
        existing.reload_config(cfg);
        return existing.clone();
    }

    match AgentImpl::new(cfg) {
        Ok(agent) => {
            agent.start();
            *global = Some(agent.clone());
            agent
        }
        Err(err) => {
            error!(%err, "failed to create agent");
            noop_agent()
        }
    }
}

/// Creates (or reconfigures) the process-wide agent from the resolved
/// configuration. Returns a no-op agent when tracing is disabled or the
/// agent cannot start.
pub fn create_agent() -> AgentPtr {
    create_agent_helper(config::make_config())
}

/// Like [`create_agent`], with an explicit application type.
pub fn create_agent_with_app_type(app_type: i32) -> AgentPtr {
    let mut cfg = config::make_config();
    cfg.app_type = app_type;
    create_agent_helper(cfg)
}

/// The process-wide agent, or a no-op handle when none was created.
pub fn global_agent() -> AgentPtr {
    GLOBAL_AGENT
        .lock()
        .ok()
        .and_then(|global| global.clone())
        .map(|agent| agent as AgentPtr)
        .unwrap_or_else(noop_agent)
}
