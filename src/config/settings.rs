//! TOML settings file layout for the `webrtc-dhs` binary.

// std
use std::{net::SocketAddr, path::Path};
// self
use crate::{_prelude::*, config::DhsConfigBuilder, error::ConfigError};

/// Process settings loaded from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	/// HTTP server settings.
	pub server: ServerSettings,
	/// DHS options passed to `configure`.
	pub dhs: DhsConfigBuilder,
}
impl Settings {
	/// Reads and parses a settings file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::SettingsRead { path: path.to_owned(), source })?;

		Self::parse(&text, path)
	}

	/// Parses settings from TOML text; `origin` is only used in error reports.
	pub fn parse(text: &str, origin: impl AsRef<Path>) -> Result<Self, ConfigError> {
		toml::from_str(text).map_err(|source| ConfigError::SettingsParse {
			path: origin.as_ref().to_owned(),
			source,
		})
	}
}

/// HTTP server settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
	/// Socket address the server listens on.
	pub bind: SocketAddr,
	/// Origins allowed to call the DHS from a browser; `*` allows any.
	pub cors_origins: Vec<String>,
	/// Lifetime of a pending consent flow, in seconds.
	pub consent_ttl_secs: u64,
	/// Upper bound for a single provider call, in seconds.
	pub request_timeout_secs: u64,
}
impl ServerSettings {
	const DEFAULT_CONSENT_TTL_SECS: u64 = 600;
	const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = crate::http::DEFAULT_REQUEST_TIMEOUT.as_secs();

	/// Pending consent flow lifetime.
	pub fn consent_ttl(&self) -> Duration {
		Duration::seconds(i64::try_from(self.consent_ttl_secs).unwrap_or(i64::MAX))
	}

	/// Provider call timeout.
	pub fn request_timeout(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.request_timeout_secs)
	}
}
impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			bind: SocketAddr::from(([0, 0, 0, 0], 9001)),
			cors_origins: vec!["*".into()],
			consent_ttl_secs: Self::DEFAULT_CONSENT_TTL_SECS,
			request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
		}
	}
}
