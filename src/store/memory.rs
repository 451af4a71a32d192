//! Thread-safe in-memory [`ConsentStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::ConsentState,
	store::{ConsentStore, PendingConsent},
};

type ConsentMap = Arc<Mutex<HashMap<ConsentState, PendingConsent>>>;

/// Process-local consent store; expired flows are purged on every insert.
#[derive(Clone, Debug, Default)]
pub struct MemoryConsentStore(ConsentMap);
impl MemoryConsentStore {
	/// Number of flows currently held, expired or not.
	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	/// Returns true when no flow is held.
	pub fn is_empty(&self) -> bool {
		self.0.lock().is_empty()
	}
}
impl ConsentStore for MemoryConsentStore {
	fn put(&self, state: ConsentState, consent: PendingConsent) {
		let now = OffsetDateTime::now_utc();
		let mut guard = self.0.lock();

		guard.retain(|_, pending| !pending.is_expired(now));
		guard.insert(state, consent);
	}

	fn take(&self, state: &str, now: OffsetDateTime) -> Option<PendingConsent> {
		self.0.lock().remove(state).filter(|pending| !pending.is_expired(now))
	}

	fn purge_expired(&self, now: OffsetDateTime) -> usize {
		let mut guard = self.0.lock();
		let before = guard.len();

		guard.retain(|_, pending| !pending.is_expired(now));

		before - guard.len()
	}
}
