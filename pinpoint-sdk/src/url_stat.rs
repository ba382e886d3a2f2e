//! Per-URL latency statistics.
//!
//! Finished spans carrying a URL stat entry are queued to an adder task
//! that folds them into the current snapshot, bucketed by a 30 second
//! tick clock and an 8-bucket latency histogram. A sender task wakes
//! every 30 seconds and asks the stat transport worker to ship (and
//! replace) the snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::agent::AgentService;
use crate::config::Config;
use crate::stats::StatsType;

pub const URL_STATS_BUCKET_SIZE: usize = 8;
pub const URL_STATS_BUCKET_VERSION: i32 = 0;

/// Tick period for URL stat bucketization.
pub const URL_STATS_TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Discretizes end times into fixed windows.
#[derive(Clone, Copy, Debug)]
pub struct TickClock {
    interval_ms: i64,
}

impl TickClock {
    pub fn new(interval: Duration) -> TickClock {
        TickClock {
            interval_ms: interval.as_millis() as i64,
        }
    }

    pub fn tick(&self, time_ms: i64) -> i64 {
        time_ms - time_ms % self.interval_ms
    }
}

const BUCKET_BOUNDS: [i32; URL_STATS_BUCKET_SIZE - 1] =
    [100, 300, 500, 1000, 3000, 5000, 8000];

fn bucket_index(elapsed: i32) -> usize {
    BUCKET_BOUNDS
        .iter()
        .position(|&bound| elapsed < bound)
        .unwrap_or(URL_STATS_BUCKET_SIZE - 1)
}

/// Fixed 8-bucket latency histogram with running total and max.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlStatHistogram {
    total: i64,
    max: i64,
    histogram: [i32; URL_STATS_BUCKET_SIZE],
}

impl UrlStatHistogram {
    pub fn add(&mut self, elapsed: i32) {
        self.total += i64::from(elapsed);
        if self.max < i64::from(elapsed) {
            self.max = i64::from(elapsed);
        }
        self.histogram[bucket_index(elapsed)] += 1;
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn bucket(&self, index: usize) -> i32 {
        self.histogram[index]
    }
}

/// Statistics for one `(url, tick)` pair.
#[derive(Clone, Debug, Default)]
pub struct EachUrlStat {
    pub total_histogram: UrlStatHistogram,
    pub fail_histogram: UrlStatHistogram,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct UrlKey {
    pub url: String,
    pub tick: i64,
}

/// Raw figures for one finished request, produced by `set_url_stat`.
#[derive(Clone, Debug)]
pub struct UrlStatEntry {
    pub url_pattern: String,
    pub method: String,
    pub status_code: i32,
    pub end_time: i64,
    pub elapsed: i32,
}

/// Aggregated URL statistics for the current reporting window.
#[derive(Debug, Default)]
pub struct UrlStatSnapshot {
    count: usize,
    stats: BTreeMap<UrlKey, EachUrlStat>,
}

impl UrlStatSnapshot {
    pub fn add(&mut self, entry: &UrlStatEntry, config: &Config) {
        let tick_clock = TickClock::new(URL_STATS_TICK_INTERVAL);

        let mut url = if config.http.url_stat.enable_trim_path {
            trim_url_path(&entry.url_pattern, config.http.url_stat.trim_path_depth)
        } else {
            entry
                .url_pattern
                .split('?')
                .next()
                .unwrap_or(&entry.url_pattern)
                .to_string()
        };
        if config.http.url_stat.method_prefix && !entry.method.is_empty() {
            url = format!("{} {}", entry.method, url);
        }

        let key = UrlKey {
            url,
            tick: tick_clock.tick(entry.end_time),
        };
        debug!(url = %key.url, tick = key.tick, "url stats snapshot add");

        let is_new = !self.stats.contains_key(&key);
        if is_new {
            if self.count >= config.http.url_stat.limit {
                return;
            }
            self.count += 1;
        }
        let each = self.stats.entry(key).or_default();

        each.total_histogram.add(entry.elapsed);
        if entry.status_code / 100 >= 4 {
            each.fail_histogram.add(entry.elapsed);
        }
    }

    pub fn each_stats(&self) -> &BTreeMap<UrlKey, EachUrlStat> {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Keeps the path up to `depth` slashes (query dropped); a `*` marks the
/// truncation point.
pub fn trim_url_path(url: &str, depth: i32) -> String {
    let mut depth = depth.max(1);
    let mut chars = url.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut out = String::new();
    let mut tailing = false;
    out.push(first);
    for c in chars {
        if c == '?' {
            break;
        }
        out.push(c);
        if c == '/' {
            depth -= 1;
            if depth == 0 {
                tailing = true;
                break;
            }
        }
    }
    if tailing {
        out.push('*');
    }
    out
}

/// Drains the URL stat queue into the current snapshot.
pub(crate) async fn add_url_stats_worker(
    agent: Arc<dyn AgentService>,
    mut rx: mpsc::Receiver<UrlStatEntry>,
) {
    let config = agent.config();
    if !config.http.url_stat.enable {
        return;
    }

    let mut shutdown = agent.shutdown_signal();
    loop {
        tokio::select! {
            entry = rx.recv() => match entry {
                Some(entry) => agent.add_url_stat_to_snapshot(entry),
                None => break,
            },
            _ = shutdown.changed() => break,
        }
    }
    info!("add url stats worker end");
}

/// Requests a snapshot upload every tick interval.
pub(crate) async fn send_url_stats_worker(agent: Arc<dyn AgentService>) {
    let config = agent.config();
    if !config.http.url_stat.enable {
        return;
    }

    let mut shutdown = agent.shutdown_signal();
    let mut ticker = tokio::time::interval(URL_STATS_TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if agent.is_exiting() {
                    break;
                }
                agent.record_stats(StatsType::UrlStats);
            }
            _ = shutdown.changed() => break,
        }
    }
    info!("send url stats worker end");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, status: i32, elapsed: i32, end_time: i64) -> UrlStatEntry {
        UrlStatEntry {
            url_pattern: url.to_string(),
            method: "GET".to_string(),
            status_code: status,
            end_time,
            elapsed,
        }
    }

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.http.url_stat.enable = true;
        cfg
    }

    #[test]
    fn tick_clock_floors_to_interval() {
        let clock = TickClock::new(URL_STATS_TICK_INTERVAL);
        assert_eq!(clock.tick(0), 0);
        assert_eq!(clock.tick(29_999), 0);
        assert_eq!(clock.tick(30_000), 30_000);
        assert_eq!(clock.tick(65_432), 60_000);
    }

    #[test]
    fn histogram_bucket_bounds() {
        let mut histogram = UrlStatHistogram::default();
        for elapsed in [0, 99, 100, 299, 300, 999, 2999, 4999, 7999, 8000, 50_000] {
            histogram.add(elapsed);
        }
        assert_eq!(histogram.bucket(0), 2); // 0, 99
        assert_eq!(histogram.bucket(1), 2); // 100, 299
        assert_eq!(histogram.bucket(2), 1); // 300
        assert_eq!(histogram.bucket(3), 1); // 999
        assert_eq!(histogram.bucket(4), 1); // 2999
        assert_eq!(histogram.bucket(5), 1); // 4999
        assert_eq!(histogram.bucket(6), 1); // 7999
        assert_eq!(histogram.bucket(7), 2); // 8000, 50000
        assert_eq!(histogram.max(), 50_000);
    }

    #[test]
    fn snapshot_aggregates_total_and_fail() {
        let cfg = config();
        let mut snapshot = UrlStatSnapshot::default();
        snapshot.add(&entry("/a", 200, 50, 1000), &cfg);
        snapshot.add(&entry("/a", 500, 250, 2000), &cfg);
        snapshot.add(&entry("/b", 404, 50, 3000), &cfg);

        assert_eq!(snapshot.len(), 2);
        let stats = snapshot.each_stats();
        let a = &stats[&UrlKey {
            url: "/a".to_string(),
            tick: 0,
        }];
        assert_eq!(a.total_histogram.bucket(0), 1);
        assert_eq!(a.total_histogram.bucket(1), 1);
        assert_eq!(a.fail_histogram.bucket(1), 1);
        assert_eq!(a.fail_histogram.bucket(0), 0);
        assert_eq!(a.total_histogram.max(), 250);

        let b = &stats[&UrlKey {
            url: "/b".to_string(),
            tick: 0,
        }];
        assert_eq!(b.total_histogram.bucket(0), 1);
        assert_eq!(b.fail_histogram.bucket(0), 1);
    }

    #[test]
    fn snapshot_honours_the_entry_limit() {
        let mut cfg = config();
        cfg.http.url_stat.limit = 1;
        let mut snapshot = UrlStatSnapshot::default();
        snapshot.add(&entry("/a", 200, 10, 0), &cfg);
        snapshot.add(&entry("/b", 200, 10, 0), &cfg);
        // Existing keys still aggregate once the limit is reached.
        snapshot.add(&entry("/a", 200, 20, 0), &cfg);

        assert_eq!(snapshot.len(), 1);
        let a = &snapshot.each_stats()[&UrlKey {
            url: "/a".to_string(),
            tick: 0,
        }];
        assert_eq!(a.total_histogram.total(), 30);
    }

    #[test]
    fn method_prefix_changes_the_key() {
        let mut cfg = config();
        cfg.http.url_stat.method_prefix = true;
        let mut snapshot = UrlStatSnapshot::default();
        snapshot.add(&entry("/a", 200, 10, 0), &cfg);
        assert!(snapshot
            .each_stats()
            .contains_key(&UrlKey { url: "GET /a".to_string(), tick: 0 }));
    }

    #[test]
    fn trim_url_path_keeps_depth_segments() {
        assert_eq!(trim_url_path("/a", 1), "/a");
        assert_eq!(trim_url_path("/a/b/c", 1), "/a/*");
        assert_eq!(trim_url_path("/a/b/c", 2), "/a/b/*");
        assert_eq!(trim_url_path("/a/b/c", 5), "/a/b/c");
        assert_eq!(trim_url_path("/a/b?x=1", 5), "/a/b");
        assert_eq!(trim_url_path("/a/b/c", 0), "/a/*");
        assert_eq!(trim_url_path("", 1), "");
    }

    #[test]
    fn separate_ticks_make_separate_entries() {
        let cfg = config();
        let mut snapshot = UrlStatSnapshot::default();
        snapshot.add(&entry("/a", 200, 10, 10_000), &cfg);
        snapshot.add(&entry("/a", 200, 10, 40_000), &cfg);
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn add_worker_folds_entries_until_the_queue_closes() {
        let test_agent = Arc::new(crate::testing::TestAgentService::with_config(config()));
        let agent: Arc<dyn AgentService> = test_agent.clone();

        let (tx, rx) = mpsc::channel(4);
        let worker = tokio::spawn(add_url_stats_worker(agent.clone(), rx));
        tx.send(entry("/a", 200, 10, 0)).await.expect("send");
        tx.send(entry("/a", 500, 20, 0)).await.expect("send");
        drop(tx);
        worker.await.expect("worker");

        let snapshot = agent.take_url_snapshot();
        assert_eq!(snapshot.len(), 1);
        let each = &snapshot.each_stats()[&UrlKey {
            url: "/a".to_string(),
            tick: 0,
        }];
        assert_eq!(each.total_histogram.total(), 30);
        assert_eq!(each.fail_histogram.total(), 20);
    }
}
