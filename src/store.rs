//! Pending consent flows keyed by OAuth `state`.
//!
//! `GET /oauth/authorize` records where the browser wants to land after consent; the matching
//! `GET /oauth/callback` consumes that record exactly once. Records expire after the configured
//! consent TTL.

pub mod memory;

pub use memory::MemoryConsentStore;

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{_prelude::*, auth::ConsentState};

/// Storage contract for pending consent flows.
///
/// Implementations are touched synchronously from request handlers and must never block on
/// I/O while holding a lock.
pub trait ConsentStore
where
	Self: Send + Sync,
{
	/// Records a pending flow under `state`, replacing any previous entry.
	fn put(&self, state: ConsentState, consent: PendingConsent);

	/// Removes and returns the flow stored under `state` if it has not expired at `now`.
	///
	/// Expired entries are removed as well, so a state can never be redeemed twice.
	fn take(&self, state: &str, now: OffsetDateTime) -> Option<PendingConsent>;

	/// Drops every entry expired at `now` and returns how many were removed.
	fn purge_expired(&self, now: OffsetDateTime) -> usize;
}

/// A consent redirect awaiting its callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingConsent {
	/// Where the browser is sent once the provider returns an authorization code.
	pub redirect_uri: String,
	/// Instant after which the callback is refused.
	pub expires_at: OffsetDateTime,
}
impl PendingConsent {
	/// Creates a flow that expires `ttl` after `now`.
	///
	/// A TTL reaching past the largest representable instant saturates there.
	pub fn new(redirect_uri: impl Into<String>, now: OffsetDateTime, ttl: Duration) -> Self {
		let expires_at = now.checked_add(ttl).unwrap_or(PrimitiveDateTime::MAX.assume_utc());

		Self { redirect_uri: redirect_uri.into(), expires_at }
	}

	/// Returns true once `now` reaches the expiry instant.
	pub fn is_expired(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}
}
