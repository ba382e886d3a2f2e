//! Sampling decisions.
//!
//! A [`Sampler`] answers the raw accept/reject question; a [`TraceSampler`]
//! layers the new-vs-continue distinction on top and feeds the sampling
//! counters reported with agent statistics. Rebuilding on config reload
//! swaps the whole object; live spans keep the decision they were born
//! with.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::stats::AgentStats;
use crate::util;

/// Raw sampling decision, shared by new-trace and continue-trace paths.
pub trait Sampler: Send + Sync {
    fn is_sampled(&self) -> bool;
}

/// Accepts every `rate`-th call.
///
/// `rate == 0` never accepts, `rate == 1` always accepts, otherwise the
/// N-th call (1-indexed) is accepted iff `N % rate == 0`.
pub struct CounterSampler {
    rate: u64,
    counter: AtomicU64,
}

impl CounterSampler {
    pub fn new(rate: i32) -> CounterSampler {
        CounterSampler {
            rate: rate.max(0) as u64,
            counter: AtomicU64::new(0),
        }
    }
}

impl Sampler for CounterSampler {
    fn is_sampled(&self) -> bool {
        match self.rate {
            0 => false,
            1 => true,
            rate => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
                n % rate == 0
            }
        }
    }
}

const PERCENT_SAMPLE_SCALE: u64 = 10_000;

/// Accepts an even `rate` percent of calls without randomness.
///
/// The rate is scaled by 100 and added to an accumulator on every call;
/// each time the accumulator crosses a multiple of 10 000 the call is
/// accepted.
pub struct PercentSampler {
    rate: u64,
    accumulator: AtomicU64,
}

impl PercentSampler {
    pub fn new(percent: f64) -> PercentSampler {
        PercentSampler {
            rate: (percent * 100.0).round().max(0.0) as u64,
            accumulator: AtomicU64::new(0),
        }
    }
}

impl Sampler for PercentSampler {
    fn is_sampled(&self) -> bool {
        if self.rate == 0 {
            return false;
        }
        let prev = self.accumulator.fetch_add(self.rate, Ordering::Relaxed);
        (prev + self.rate) / PERCENT_SAMPLE_SCALE > prev / PERCENT_SAMPLE_SCALE
    }
}

struct TokenBucketState {
    tokens: i64,
    last_refill: i64,
}

/// Lazily refilled token bucket: capacity = tps, one token per 1/tps
/// seconds, one token consumed per accepted event.
pub struct TokenBucket {
    capacity: i64,
    refill_interval_ms: i64,
    state: Mutex<TokenBucketState>,
}

impl TokenBucket {
    pub fn new(tps: i64) -> TokenBucket {
        let capacity = tps.max(1);
        TokenBucket {
            capacity,
            refill_interval_ms: 1000 / capacity,
            state: Mutex::new(TokenBucketState {
                tokens: capacity,
                last_refill: util::now_millis(),
            }),
        }
    }

    pub fn check(&self) -> bool {
        self.check_at(util::now_millis())
    }

    fn check_at(&self, now: i64) -> bool {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(_) => return false,
        };

        if self.refill_interval_ms > 0 && now > state.last_refill {
            let refill = (now - state.last_refill) / self.refill_interval_ms;
            if refill > 0 {
                state.tokens = (state.tokens + refill).min(self.capacity);
                state.last_refill += refill * self.refill_interval_ms;
            }
        }

        if state.tokens > 0 {
            state.tokens -= 1;
            true
        } else {
            false
        }
    }
}

/// Sampling decision for whole traces: new roots consult the inner
/// sampler, continuations honor the upstream decision.
pub trait TraceSampler: Send + Sync {
    fn is_new_sampled(&self) -> bool;
    fn is_continue_sampled(&self) -> bool;
}

pub struct BasicTraceSampler {
    sampler: Box<dyn Sampler>,
    stats: Arc<AgentStats>,
}

impl BasicTraceSampler {
    pub fn new(sampler: Box<dyn Sampler>, stats: Arc<AgentStats>) -> BasicTraceSampler {
        BasicTraceSampler { sampler, stats }
    }
}

impl TraceSampler for BasicTraceSampler {
    fn is_new_sampled(&self) -> bool {
        if self.sampler.is_sampled() {
            self.stats.incr_sample_new();
            true
        } else {
            self.stats.incr_unsample_new();
            false
        }
    }

    fn is_continue_sampled(&self) -> bool {
        // A continuation was sampled upstream; the decision is sticky.
        self.stats.incr_sample_cont();
        true
    }
}

/// Gates accepted traces through per-second token buckets; a throughput of
/// 0 means unlimited.
pub struct ThroughputLimitTraceSampler {
    sampler: Box<dyn Sampler>,
    new_bucket: Option<TokenBucket>,
    cont_bucket: Option<TokenBucket>,
    stats: Arc<AgentStats>,
}

impl ThroughputLimitTraceSampler {
    pub fn new(
        sampler: Box<dyn Sampler>,
        new_tps: i64,
        cont_tps: i64,
        stats: Arc<AgentStats>,
    ) -> ThroughputLimitTraceSampler {
        ThroughputLimitTraceSampler {
            sampler,
            new_bucket: (new_tps > 0).then(|| TokenBucket::new(new_tps)),
            cont_bucket: (cont_tps > 0).then(|| TokenBucket::new(cont_tps)),
            stats,
        }
    }
}

impl TraceSampler for ThroughputLimitTraceSampler {
    fn is_new_sampled(&self) -> bool {
        if !self.sampler.is_sampled() {
            self.stats.incr_unsample_new();
            return false;
        }
        if let Some(bucket) = &self.new_bucket {
            if !bucket.check() {
                self.stats.incr_skip_new();
                return false;
            }
        }
        self.stats.incr_sample_new();
        true
    }

    fn is_continue_sampled(&self) -> bool {
        if let Some(bucket) = &self.cont_bucket {
            if !bucket.check() {
                self.stats.incr_skip_cont();
                return false;
            }
        }
        self.stats.incr_sample_cont();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Arc<AgentStats> {
        Arc::new(AgentStats::new())
    }

    #[test]
    fn counter_sampler_rate_zero_never_accepts() {
        let sampler = CounterSampler::new(0);
        for _ in 0..100 {
            assert!(!sampler.is_sampled());
        }
    }

    #[test]
    fn counter_sampler_rate_one_always_accepts() {
        let sampler = CounterSampler::new(1);
        for _ in 0..100 {
            assert!(sampler.is_sampled());
        }
    }

    #[test]
    fn counter_sampler_accepts_every_nth() {
        let sampler = CounterSampler::new(3);
        let decisions: Vec<bool> = (0..9).map(|_| sampler.is_sampled()).collect();
        assert_eq!(
            decisions,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn counter_sampler_accept_count_is_exact() {
        let rate = 7;
        let total = 1000;
        let sampler = CounterSampler::new(rate);
        let accepted = (0..total).filter(|_| sampler.is_sampled()).count();
        assert_eq!(accepted, total / rate as usize);
    }

    #[test]
    fn percent_sampler_zero_and_hundred() {
        let never = PercentSampler::new(0.0);
        let always = PercentSampler::new(100.0);
        for _ in 0..100 {
            assert!(!never.is_sampled());
            assert!(always.is_sampled());
        }
    }

    #[test]
    fn percent_sampler_distribution_is_within_one() {
        for &(percent, total) in &[(25.0, 1000usize), (0.5, 10_000), (66.0, 3000)] {
            let sampler = PercentSampler::new(percent);
            let accepted = (0..total).filter(|_| sampler.is_sampled()).count() as i64;
            let expected = ((total as f64) * percent / 100.0).floor() as i64;
            assert!(
                (accepted - expected).abs() <= 1,
                "percent {} accepted {} expected {}",
                percent,
                accepted,
                expected
            );
        }
    }

    #[test]
    fn token_bucket_consumes_capacity_then_rejects() {
        let bucket = TokenBucket::new(5);
        let now = util::now_millis();
        for _ in 0..5 {
            assert!(bucket.check_at(now));
        }
        assert!(!bucket.check_at(now));
    }

    #[test]
    fn token_bucket_refills_over_time() {
        let bucket = TokenBucket::new(10);
        let now = util::now_millis();
        for _ in 0..10 {
            assert!(bucket.check_at(now));
        }
        assert!(!bucket.check_at(now));
        // 100ms per token at 10 tps; 250ms buys two tokens.
        assert!(bucket.check_at(now + 250));
        assert!(bucket.check_at(now + 250));
        assert!(!bucket.check_at(now + 250));
    }

    #[test]
    fn basic_trace_sampler_counts_decisions() {
        let stats = stats();
        let sampler = BasicTraceSampler::new(Box::new(CounterSampler::new(2)), stats.clone());

        assert!(!sampler.is_new_sampled());
        assert!(sampler.is_new_sampled());
        assert!(sampler.is_continue_sampled());

        let snapshot = stats.counters_for_test();
        assert_eq!(snapshot.sample_new, 1);
        assert_eq!(snapshot.unsample_new, 1);
        assert_eq!(snapshot.sample_cont, 1);
    }

    #[test]
    fn continue_is_always_accepted_without_limiter() {
        let sampler = BasicTraceSampler::new(Box::new(CounterSampler::new(0)), stats());
        for _ in 0..10 {
            assert!(sampler.is_continue_sampled());
        }
    }

    #[test]
    fn throughput_limiter_skips_over_budget_traces() {
        let stats = stats();
        let sampler = ThroughputLimitTraceSampler::new(
            Box::new(CounterSampler::new(1)),
            2,
            0,
            stats.clone(),
        );

        let mut accepted = 0;
        for _ in 0..10 {
            if sampler.is_new_sampled() {
                accepted += 1;
            }
        }
        // Bucket capacity is 2; refill within the same instant is nil.
        assert_eq!(accepted, 2);
        let snapshot = stats.counters_for_test();
        assert_eq!(snapshot.sample_new, 2);
        assert_eq!(snapshot.skip_new, 8);
    }

    #[test]
    fn throughput_limiter_gates_continuations_independently() {
        let stats = stats();
        let sampler = ThroughputLimitTraceSampler::new(
            Box::new(CounterSampler::new(1)),
            0,
            1,
            stats.clone(),
        );

        assert!(sampler.is_continue_sampled());
        assert!(!sampler.is_continue_sampled());
        let snapshot = stats.counters_for_test();
        assert_eq!(snapshot.sample_cont, 1);
        assert_eq!(snapshot.skip_cont, 1);
    }

    #[test]
    fn throughput_limiter_respects_base_sampler() {
        let stats = stats();
        let sampler = ThroughputLimitTraceSampler::new(
            Box::new(CounterSampler::new(0)),
            10,
            10,
            stats.clone(),
        );
        for _ in 0..5 {
            assert!(!sampler.is_new_sampled());
        }
        assert_eq!(stats.counters_for_test().unsample_new, 5);
    }
}
