// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for committed lifecycle transitions.
#[derive(Debug, Default)]
pub struct LifecycleMetrics {
	provisioned: AtomicU64,
	deprovisioned: AtomicU64,
	updated: AtomicU64,
	bound: AtomicU64,
	unbound: AtomicU64,
	conflicts: AtomicU64,
}
impl LifecycleMetrics {
	/// Returns the number of instances created (identical repeats excluded).
	pub fn provisioned(&self) -> u64 {
		self.provisioned.load(Ordering::Relaxed)
	}

	/// Returns the number of instances erased.
	pub fn deprovisioned(&self) -> u64 {
		self.deprovisioned.load(Ordering::Relaxed)
	}

	/// Returns the number of applied updates.
	pub fn updated(&self) -> u64 {
		self.updated.load(Ordering::Relaxed)
	}

	/// Returns the number of bindings created (identical repeats excluded).
	pub fn bound(&self) -> u64 {
		self.bound.load(Ordering::Relaxed)
	}

	/// Returns the number of bindings erased.
	pub fn unbound(&self) -> u64 {
		self.unbound.load(Ordering::Relaxed)
	}

	/// Returns the number of rejected re-creations.
	pub fn conflicts(&self) -> u64 {
		self.conflicts.load(Ordering::Relaxed)
	}

	pub(crate) fn record_provisioned(&self) {
		self.provisioned.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_deprovisioned(&self) {
		self.deprovisioned.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_updated(&self) {
		self.updated.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_bound(&self) {
		self.bound.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_unbound(&self) {
		self.unbound.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_conflict(&self) {
		self.conflicts.fetch_add(1, Ordering::Relaxed);
	}
}
