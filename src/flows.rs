//! DHS operations: access tokens, refresh exchanges, user consent, and E911 identifiers.

pub mod consent;
pub mod e911;
pub mod token;

pub use consent::*;
pub use e911::*;
pub use token::*;

// self
use crate::{
	_prelude::*,
	config::{DhsConfig, DhsConfigBuilder},
	error::ConfigError,
	http::ProviderHttpClient,
	provider::TransportErrorMapper,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, provider::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// DHS specialized for the crate's default reqwest transport stack.
pub type ReqwestDhs = Dhs<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Credential-holding service that talks to the provider on behalf of browser clients.
///
/// A `Dhs` starts unconfigured. [`Dhs::configure`] validates the options once and freezes
/// them; every operation reads that snapshot and fails with [`Error::NotConfigured`] until it
/// exists. Individual operations live in the [`token`], [`consent`], and [`e911`] modules.
pub struct Dhs<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	config: OnceLock<DhsConfig>,
}
impl<C, M> Dhs<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an unconfigured DHS that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(http_client: impl Into<Arc<C>>, mapper: impl Into<Arc<M>>) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config: OnceLock::new(),
		}
	}

	/// Attaches an already validated configuration.
	pub fn configured(self, config: DhsConfig) -> Self {
		// A fresh `OnceLock` cannot be occupied yet.
		let _ = self.config.set(config);

		self
	}

	/// Validates `options` and stores the result.
	///
	/// Validation runs in order: empty options, `app_key`, `app_secret`, then endpoint and
	/// paths. A second call fails with [`ConfigError::AlreadyConfigured`] and leaves the
	/// first configuration in place.
	pub fn configure(&self, options: DhsConfigBuilder) -> Result<(), ConfigError> {
		if self.is_configured() {
			return Err(ConfigError::AlreadyConfigured);
		}

		let config = options.build()?;

		self.config.set(config).map_err(|_| ConfigError::AlreadyConfigured)?;

		tracing::info!("DHS configured.");

		Ok(())
	}

	/// Returns the active configuration.
	pub fn config(&self) -> Result<&DhsConfig> {
		self.config.get().ok_or(Error::NotConfigured)
	}

	/// Returns true once [`Dhs::configure`] succeeded.
	pub fn is_configured(&self) -> bool {
		self.config.get().is_some()
	}
}
#[cfg(feature = "reqwest")]
impl Dhs<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an unconfigured DHS backed by a default reqwest transport.
	pub fn new() -> Self {
		Self::with_http_client(ReqwestHttpClient::default(), ReqwestTransportErrorMapper)
	}

	/// Creates a reqwest-backed DHS holding `config`.
	pub fn with_config(config: DhsConfig) -> Self {
		Self::new().configured(config)
	}
}
#[cfg(feature = "reqwest")]
impl Default for Dhs<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	fn default() -> Self {
		Self::new()
	}
}
impl<C, M> Debug for Dhs<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let config = self.config.get();

		f.debug_struct("Dhs")
			.field("configured", &config.is_some())
			.field("app_key", &config.map(|config| &config.app_key))
			.field("api_endpoint", &config.map(|config| config.api_endpoint.as_str()))
			.finish()
	}
}

/// Treats blank strings as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|value| !value.trim().is_empty())
}
