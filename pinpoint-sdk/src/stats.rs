//! Runtime statistics aggregation.
//!
//! `AgentStats` accumulates response times, sampling counters and the
//! active-span table between collection ticks. Every
//! `stat.collect_interval_ms` a snapshot is taken (CPU, memory and thread
//! figures come from `sysinfo`), filling one slot of a rolling batch;
//! when `stat.batch_count` slots are full the batch is handed to the stat
//! transport worker.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, info};

use crate::agent::AgentService;
use crate::util;

/// What the stat transport worker should drain next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsType {
    AgentStats,
    UrlStats,
}

/// One collected interval.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentStatsSnapshot {
    pub sample_time: i64,
    pub system_cpu_time: f64,
    pub process_cpu_time: f64,
    pub num_threads: i64,
    pub heap_alloc_size: i64,
    pub heap_max_size: i64,
    pub response_time_avg: i64,
    pub response_time_max: i64,
    pub num_sample_new: i64,
    pub num_sample_cont: i64,
    pub num_unsample_new: i64,
    pub num_unsample_cont: i64,
    pub num_skip_new: i64,
    pub num_skip_cont: i64,
    pub active_requests: [i32; 4],
}

#[derive(Default)]
struct ResponseAccum {
    acc: i64,
    count: i64,
    max: i64,
}

struct SystemSampler {
    sys: System,
    pid: Option<Pid>,
    heap_max_seen: u64,
}

impl SystemSampler {
    fn new() -> SystemSampler {
        SystemSampler {
            sys: System::new(),
            pid: sysinfo::get_current_pid().ok(),
            heap_max_seen: 0,
        }
    }

    /// Refreshes CPU/process figures; meaningful deltas require two calls
    /// spaced apart, so the first interval reads as zero.
    fn sample(&mut self, snapshot: &mut AgentStatsSnapshot) {
        self.sys.refresh_cpu_usage();
        snapshot.system_cpu_time = f64::from(self.sys.global_cpu_usage() / 100.0).clamp(0.0, 1.0);

        let Some(pid) = self.pid else {
            return;
        };
        self.sys
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let cores = self.sys.cpus().len().max(1);
        if let Some(process) = self.sys.process(pid) {
            snapshot.process_cpu_time =
                f64::from(process.cpu_usage() / (100.0 * cores as f32)).clamp(0.0, 1.0);
            let heap_kb = process.virtual_memory() / 1024;
            self.heap_max_seen = self.heap_max_seen.max(heap_kb);
            snapshot.heap_alloc_size = heap_kb as i64;
            snapshot.heap_max_size = self.heap_max_seen as i64;
            snapshot.num_threads = process.tasks().map(|t| t.len() as i64).unwrap_or(0);
        }
    }
}

struct CollectorState {
    slots: Vec<AgentStatsSnapshot>,
    batch_count: usize,
    system: SystemSampler,
}

/// Interval accumulators plus snapshot batching.
pub struct AgentStats {
    response: Mutex<ResponseAccum>,
    sample_new: AtomicI64,
    sample_cont: AtomicI64,
    unsample_new: AtomicI64,
    unsample_cont: AtomicI64,
    skip_new: AtomicI64,
    skip_cont: AtomicI64,
    active_spans: Mutex<HashMap<i64, i64>>,
    collector: Mutex<CollectorState>,
    pending_batch: Mutex<Vec<AgentStatsSnapshot>>,
}

impl Default for AgentStats {
    fn default() -> AgentStats {
        AgentStats::new()
    }
}

impl AgentStats {
    pub fn new() -> AgentStats {
        AgentStats {
            response: Mutex::new(ResponseAccum::default()),
            sample_new: AtomicI64::new(0),
            sample_cont: AtomicI64::new(0),
            unsample_new: AtomicI64::new(0),
            unsample_cont: AtomicI64::new(0),
            skip_new: AtomicI64::new(0),
            skip_cont: AtomicI64::new(0),
            active_spans: Mutex::new(HashMap::new()),
            collector: Mutex::new(CollectorState {
                slots: Vec::new(),
                batch_count: 0,
                system: SystemSampler::new(),
            }),
            pending_batch: Mutex::new(Vec::new()),
        }
    }

    pub fn collect_response_time(&self, response_time: i64) {
        if let Ok(mut response) = self.response.lock() {
            response.acc += response_time;
            response.count += 1;
            if response.max < response_time {
                response.max = response_time;
            }
        }
    }

    pub fn add_active_span(&self, span_id: i64, start_time: i64) {
        if let Ok(mut active) = self.active_spans.lock() {
            active.insert(span_id, start_time);
        }
    }

    pub fn drop_active_span(&self, span_id: i64) {
        if let Ok(mut active) = self.active_spans.lock() {
            active.remove(&span_id);
        }
    }

    pub fn incr_sample_new(&self) {
        self.sample_new.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_sample_cont(&self) {
        self.sample_cont.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_unsample_new(&self) {
        self.unsample_new.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_unsample_cont(&self) {
        self.unsample_cont.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_skip_new(&self) {
        self.skip_new.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_skip_cont(&self) {
        self.skip_cont.fetch_add(1, Ordering::Relaxed);
    }

    /// Clears interval accumulators, e.g. when a stale backlog is dropped.
    pub fn reset(&self) {
        if let Ok(mut response) = self.response.lock() {
            *response = ResponseAccum::default();
        }
        self.sample_new.store(0, Ordering::Relaxed);
        self.sample_cont.store(0, Ordering::Relaxed);
        self.unsample_new.store(0, Ordering::Relaxed);
        self.unsample_cont.store(0, Ordering::Relaxed);
        self.skip_new.store(0, Ordering::Relaxed);
        self.skip_cont.store(0, Ordering::Relaxed);
    }

    /// Prepares the batch buffer and CPU baselines before the first tick.
    pub fn init_collection(&self, batch_count: usize) {
        if let Ok(mut state) = self.collector.lock() {
            state.batch_count = batch_count.max(1);
            state.slots.clear();
            let mut scratch = AgentStatsSnapshot::default();
            state.system.sample(&mut scratch);
        }
        self.reset();
    }

    pub(crate) fn active_buckets(&self, sample_time: i64) -> [i32; 4] {
        let mut buckets = [0i32; 4];
        if let Ok(active) = self.active_spans.lock() {
            for start_time in active.values() {
                let age = sample_time - start_time;
                if age < 1000 {
                    buckets[0] += 1;
                } else if age < 3000 {
                    buckets[1] += 1;
                } else if age < 5000 {
                    buckets[2] += 1;
                } else {
                    buckets[3] += 1;
                }
            }
        }
        buckets
    }

    fn collect(&self) -> AgentStatsSnapshot {
        let mut snapshot = AgentStatsSnapshot {
            sample_time: util::now_millis(),
            ..AgentStatsSnapshot::default()
        };

        if let Ok(mut state) = self.collector.lock() {
            state.system.sample(&mut snapshot);
        }

        if let Ok(mut response) = self.response.lock() {
            snapshot.response_time_avg = if response.count > 0 {
                response.acc / response.count
            } else {
                0
            };
            snapshot.response_time_max = response.max;
            *response = ResponseAccum::default();
        }

        snapshot.num_sample_new = self.sample_new.swap(0, Ordering::Relaxed);
        snapshot.num_sample_cont = self.sample_cont.swap(0, Ordering::Relaxed);
        snapshot.num_unsample_new = self.unsample_new.swap(0, Ordering::Relaxed);
        snapshot.num_unsample_cont = self.unsample_cont.swap(0, Ordering::Relaxed);
        snapshot.num_skip_new = self.skip_new.swap(0, Ordering::Relaxed);
        snapshot.num_skip_cont = self.skip_cont.swap(0, Ordering::Relaxed);
        snapshot.active_requests = self.active_buckets(snapshot.sample_time);

        snapshot
    }

    /// Takes one snapshot; returns true when the batch just filled up and
    /// is ready for [`AgentStats::take_batch`].
    pub fn collect_snapshot(&self) -> bool {
        let snapshot = self.collect();
        let Ok(mut state) = self.collector.lock() else {
            return false;
        };
        state.slots.push(snapshot);
        if state.slots.len() >= state.batch_count {
            let batch = std::mem::take(&mut state.slots);
            if let Ok(mut pending) = self.pending_batch.lock() {
                *pending = batch;
            }
            true
        } else {
            false
        }
    }

    /// Hands out the most recently completed batch.
    pub fn take_batch(&self) -> Vec<AgentStatsSnapshot> {
        self.pending_batch
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn counters_for_test(&self) -> CounterValues {
        CounterValues {
            sample_new: self.sample_new.load(Ordering::Relaxed),
            sample_cont: self.sample_cont.load(Ordering::Relaxed),
            unsample_new: self.unsample_new.load(Ordering::Relaxed),
            unsample_cont: self.unsample_cont.load(Ordering::Relaxed),
            skip_new: self.skip_new.load(Ordering::Relaxed),
            skip_cont: self.skip_cont.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    pub(crate) fn active_span_count(&self) -> usize {
        self.active_spans.lock().map(|a| a.len()).unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) struct CounterValues {
    pub sample_new: i64,
    pub sample_cont: i64,
    pub unsample_new: i64,
    pub unsample_cont: i64,
    pub skip_new: i64,
    pub skip_cont: i64,
}

/// Periodic collection task; one per agent.
pub(crate) async fn agent_stats_worker(agent: Arc<dyn AgentService>) {
    let config = agent.config();
    if !config.stat.enable {
        return;
    }

    let stats = agent.agent_stats();
    stats.init_collection(config.stat.batch_count);

    let mut shutdown = agent.shutdown_signal();
    let mut ticker =
        tokio::time::interval(Duration::from_millis(config.stat.collect_interval_ms.max(100)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if agent.is_exiting() {
                    break;
                }
                if stats.collect_snapshot() {
                    debug!("agent stat batch complete");
                    agent.record_stats(StatsType::AgentStats);
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    info!("agent stats worker end");
}
