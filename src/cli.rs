//! Command-line interface for the `webrtc-dhs` binary.

// std
use std::{net::SocketAddr, path::PathBuf};
// crates.io
use clap::Parser;
// self
use crate::{
	config::{DhsConfigBuilder, Settings},
	error::ConfigError,
};

/// Delegated hosting server for WebRTC apps.
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct Cli {
	/// TOML settings file.
	#[arg(short, long, env = "DHS_CONFIG")]
	pub config: Option<PathBuf>,
	/// Socket address to listen on; overrides `server.bind`.
	#[arg(long, env = "DHS_BIND")]
	pub bind: Option<SocketAddr>,
	/// Application key; overrides `dhs.app_key`.
	#[arg(long, env = "DHS_APP_KEY")]
	pub app_key: Option<String>,
	/// Application secret; overrides `dhs.app_secret`.
	#[arg(long, env = "DHS_APP_SECRET", hide_env_values = true)]
	pub app_secret: Option<String>,
	/// Provider API host; overrides `dhs.api_endpoint`.
	#[arg(long, env = "DHS_API_ENDPOINT")]
	pub api_endpoint: Option<String>,
	/// Log filter directives (`tracing_subscriber::EnvFilter` syntax); overrides `RUST_LOG`.
	#[arg(long, env = "RUST_LOG", default_value = "info")]
	pub log: String,
}
impl Cli {
	/// Loads the settings file (if any) and overlays command-line values.
	pub fn settings(&self) -> Result<Settings, ConfigError> {
		let mut settings = match &self.config {
			Some(path) => Settings::load(path)?,
			None => Settings::default(),
		};

		if let Some(bind) = self.bind {
			settings.server.bind = bind;
		}

		settings.dhs = settings.dhs.merge(self.overrides());

		Ok(settings)
	}

	fn overrides(&self) -> DhsConfigBuilder {
		let mut overrides = DhsConfigBuilder::new();

		if let Some(key) = &self.app_key {
			overrides = overrides.app_key(key);
		}
		if let Some(secret) = &self.app_secret {
			overrides = overrides.app_secret(secret);
		}
		if let Some(endpoint) = &self.api_endpoint {
			overrides = overrides.api_endpoint(endpoint);
		}

		overrides
	}
}
