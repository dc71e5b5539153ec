//! Observability and Metrics
//!
//! Counters for the receive loop and the key-exchange primitives.
//!
//! Uses atomic counters so readers on different threads can share the global
//! instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Global metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Reads that completed synchronously
    pub reads_sync: AtomicU64,
    /// Reads that went pending on the socket
    pub reads_async: AtomicU64,
    /// Read results deferred to the task runner
    pub read_yields: AtomicU64,
    /// Datagrams handed to visitors
    pub packets_received: AtomicU64,
    /// Payload bytes handed to visitors
    pub bytes_received: AtomicU64,
    /// Terminal read errors
    pub read_errors: AtomicU64,
    /// Key exchanges constructed
    pub key_exchanges_created: AtomicU64,
    /// Shared secrets computed
    pub shared_keys_computed: AtomicU64,
    /// Rejected private keys or peer values
    pub key_exchange_failures: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            reads_sync: AtomicU64::new(0),
            reads_async: AtomicU64::new(0),
            read_yields: AtomicU64::new(0),
            packets_received: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            read_errors: AtomicU64::new(0),
            key_exchanges_created: AtomicU64::new(0),
            shared_keys_computed: AtomicU64::new(0),
            key_exchange_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn sync_read(&self) {
        self.reads_sync.fetch_add(1, Ordering::Relaxed);
    }

    pub fn async_read(&self) {
        self.reads_async.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read_yield(&self) {
        self.read_yields.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a datagram delivered to a visitor
    pub fn packet_received(&self, byte_count: u64) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn key_exchange_created(&self) {
        self.key_exchanges_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn shared_key_computed(&self) {
        self.shared_keys_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn key_exchange_failed(&self) {
        self.key_exchange_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reads_sync: self.reads_sync.load(Ordering::Relaxed),
            reads_async: self.reads_async.load(Ordering::Relaxed),
            read_yields: self.read_yields.load(Ordering::Relaxed),
            packets_received: self.packets_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            key_exchanges_created: self.key_exchanges_created.load(Ordering::Relaxed),
            shared_keys_computed: self.shared_keys_computed.load(Ordering::Relaxed),
            key_exchange_failures: self.key_exchange_failures.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub reads_sync: u64,
    pub reads_async: u64,
    pub read_yields: u64,
    pub packets_received: u64,
    pub bytes_received: u64,
    pub read_errors: u64,
    pub key_exchanges_created: u64,
    pub shared_keys_computed: u64,
    pub key_exchange_failures: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// Fraction of reads that had to wait on the socket
    pub fn async_read_ratio(&self) -> f64 {
        let total = self.reads_sync + self.reads_async;
        if total == 0 {
            0.0
        } else {
            self.reads_async as f64 / total as f64
        }
    }
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}
