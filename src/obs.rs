//! Observability helpers for DHS flows.
//!
//! Every flow runs inside a `dhs.flow` span carrying `flow` (operation) and `stage` (call site)
//! fields. Enable the `metrics` feature to increment the `dhs_flow_total` counter for every
//! attempt/success/failure, labeled by `flow` + `outcome`. [`init_tracing`] installs the
//! subscriber used by the binary.

mod logging;
mod metrics;
mod tracing;

pub use logging::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the DHS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Access token issuance.
	AccessToken,
	/// Refresh token exchange.
	RefreshToken,
	/// E911 identifier creation.
	E911Id,
	/// Consent URL construction.
	UserConsent,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AccessToken => "access_token",
			FlowKind::RefreshToken => "refresh_token",
			FlowKind::E911Id => "e911_id",
			FlowKind::UserConsent => "user_consent",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a DHS operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
