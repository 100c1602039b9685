//! Thread-safe counters recording gateway flow outcomes during dispatch.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for gateway flow outcomes.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	rate_limit_waits: AtomicU64,
	refreshes: AtomicU64,
}
impl DispatchMetrics {
	/// Returns the total number of dispatched requests.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that completed successfully.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that surfaced an error.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of backoff sleeps performed after rate-limit responses.
	pub fn rate_limit_waits(&self) -> u64 {
		self.rate_limit_waits.load(Ordering::Relaxed)
	}

	/// Returns the number of transparent token renewals performed during dispatch.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rate_limit_wait(&self) {
		self.rate_limit_waits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}
}
