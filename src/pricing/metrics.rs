// Performance Metrics for the availability engine
//
// Tracks quote latency, outcomes, default-rate fallbacks and tier cache
// efficiency so configuration gaps and slow stores show up in operations.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Performance threshold for slow quotes (100ms)
const SLOW_OPERATION_THRESHOLD_MS: u64 = 100;

/// Shared counters for the availability engine
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    // Tier cache
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,

    // Quote outcomes
    quotes: AtomicU64,
    conflicts: AtomicU64,
    rejections: AtomicU64,
    default_rate_fallbacks: AtomicU64,

    // Timing (microseconds)
    total_quote_time_us: AtomicU64,
    slow_quotes: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.inner.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conflict(&self) {
        self.inner.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.inner.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_default_rate_fallback(&self) {
        self.inner.default_rate_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Get cache hit rate (0.0 to 1.0)
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.inner.cache_hits.load(Ordering::Relaxed);
        let misses = self.inner.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;

        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Start timing a quote; the duration is recorded when the timer drops
    pub fn start_quote(&self) -> QuoteTimer {
        QuoteTimer {
            start: Instant::now(),
            metrics: self.clone(),
        }
    }

    fn record_quote(&self, duration: Duration) {
        self.inner.quotes.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_quote_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        if duration.as_millis() as u64 > SLOW_OPERATION_THRESHOLD_MS {
            self.inner.slow_quotes.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Slow availability quote: {}ms", duration.as_millis());
        }
    }

    /// Get average quote time in milliseconds
    pub fn avg_quote_time_ms(&self) -> f64 {
        let count = self.inner.quotes.load(Ordering::Relaxed);
        let total_us = self.inner.total_quote_time_us.load(Ordering::Relaxed);

        if count == 0 {
            0.0
        } else {
            (total_us as f64 / count as f64) / 1000.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            quotes: self.inner.quotes.load(Ordering::Relaxed),
            avg_quote_time_ms: self.avg_quote_time_ms(),
            slow_quotes: self.inner.slow_quotes.load(Ordering::Relaxed),
            conflicts: self.inner.conflicts.load(Ordering::Relaxed),
            rejections: self.inner.rejections.load(Ordering::Relaxed),
            default_rate_fallbacks: self.inner.default_rate_fallbacks.load(Ordering::Relaxed),
            cache_hits: self.inner.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.inner.cache_misses.load(Ordering::Relaxed),
            cache_hit_rate: self.cache_hit_rate(),
        }
    }

    pub fn log_summary(&self) {
        let summary = self.summary();
        tracing::info!(
            "Availability engine metrics: {} quotes (avg {:.2}ms, {} slow), {} conflicts, \
             {} rejections, {} default-rate fallbacks, tier cache {:.1}% hit rate",
            summary.quotes,
            summary.avg_quote_time_ms,
            summary.slow_quotes,
            summary.conflicts,
            summary.rejections,
            summary.default_rate_fallbacks,
            summary.cache_hit_rate * 100.0,
        );
    }
}

/// Timer for tracking quote duration
pub struct QuoteTimer {
    start: Instant,
    metrics: EngineMetrics,
}

impl Drop for QuoteTimer {
    fn drop(&mut self) {
        self.metrics.record_quote(self.start.elapsed());
    }
}

/// Point-in-time snapshot of the engine metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub quotes: u64,
    pub avg_quote_time_ms: f64,
    pub slow_quotes: u64,
    pub conflicts: u64,
    pub rejections: u64,
    pub default_rate_fallbacks: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
}
