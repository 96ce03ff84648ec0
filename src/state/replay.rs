//! Single-use ledger for accepted state values.

// self
use crate::_prelude::*;

/// Ledger of state values that have already been accepted.
pub trait ReplayGuard: Send + Sync {
	/// Records `id` until `expires_at`; returns false when it was already recorded.
	fn claim(&self, id: &str, expires_at: OffsetDateTime) -> bool;
}

/// Process-local [`ReplayGuard`].
///
/// Entries are dropped once their state could no longer pass the expiry check anyway.
#[derive(Debug, Default)]
pub struct MemoryReplayGuard {
	seen: Mutex<HashMap<String, OffsetDateTime>>,
}
impl MemoryReplayGuard {
	/// Number of tracked entries, including ones not yet purged.
	pub fn len(&self) -> usize {
		self.seen.lock().len()
	}

	/// Returns true when nothing is tracked.
	pub fn is_empty(&self) -> bool {
		self.seen.lock().is_empty()
	}
}
impl ReplayGuard for MemoryReplayGuard {
	fn claim(&self, id: &str, expires_at: OffsetDateTime) -> bool {
		let now = OffsetDateTime::now_utc();
		let mut seen = self.seen.lock();

		seen.retain(|_, until| *until > now);

		if seen.contains_key(id) {
			return false;
		}

		seen.insert(id.to_owned(), expires_at);

		true
	}
}
