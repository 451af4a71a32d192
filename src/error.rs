//! DHS-level error types shared across flows, transports, and routes.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// DHS-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical DHS error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller supplied an invalid request; fix the input and retry.
	#[error(transparent)]
	Request(#[from] RequestError),

	/// An operation ran before [`Dhs::configure`](crate::flows::Dhs::configure).
	#[error("DHS not configured. Invoke configure with your app_key and app_secret.")]
	NotConfigured,
	/// Token endpoint call failed.
	#[error("Token endpoint call failed: {0}")]
	RemoteToken(#[source] RemoteError),
	/// E911 endpoint call failed.
	#[error("E911 endpoint call failed: {0}")]
	RemoteE911(#[source] RemoteError),
}
impl Error {
	/// Returns the remote failure when the error originated at the provider.
	pub fn remote(&self) -> Option<&RemoteError> {
		match self {
			Self::RemoteToken(e) | Self::RemoteE911(e) => Some(e),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised while setting up the DHS.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Outbound HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Settings file could not be read.
	#[error("Unable to read settings file {}.", path.display())]
	SettingsRead {
		/// File that failed to load.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},
	/// Settings file is not valid TOML for the expected layout.
	#[error("Settings file {} is malformed.", path.display())]
	SettingsParse {
		/// File that failed to parse.
		path: PathBuf,
		/// Underlying parse failure.
		#[source]
		source: toml::de::Error,
	},

	/// `configure` was invoked without any options.
	#[error("No options provided.")]
	NoOptions,
	/// `app_key` is absent or blank.
	#[error("No app_key provided.")]
	MissingAppKey,
	/// `app_secret` is absent or blank.
	#[error("No app_secret provided.")]
	MissingAppSecret,
	/// `app_key` failed identifier validation.
	#[error("The app_key is invalid.")]
	InvalidAppKey(#[from] crate::auth::IdentifierError),
	/// API endpoint cannot be parsed or uses an unsupported scheme.
	#[error("The api_endpoint `{endpoint}` must be an absolute http(s) URL.")]
	InvalidEndpoint {
		/// Offending endpoint value.
		endpoint: String,
	},
	/// Endpoint path does not start with `/`.
	#[error("The {name} `{path}` must start with `/`.")]
	InvalidPath {
		/// Which path failed validation.
		name: &'static str,
		/// Offending path value.
		path: String,
	},
	/// The DHS instance already holds a configuration.
	#[error("DHS is already configured.")]
	AlreadyConfigured,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Caller input errors, always raised before any network call.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RequestError {
	/// Token request carried no `app_scope`.
	#[error("No app scope provided.")]
	MissingScope,
	/// `app_scope` is unknown or not directly requestable.
	#[error("Invalid app scope provided: {scope}.")]
	InvalidScope {
		/// Scope string supplied by the caller.
		scope: String,
	},
	/// `MOBILE_NUMBER` requests need the consent flow's authorization code.
	#[error("No auth code provided.")]
	MissingAuthCode,
	/// Refresh request carried no refresh token.
	#[error("No refresh token provided.")]
	MissingRefreshToken,
	/// E911 request is missing its token, address, or address fields.
	#[error("Invalid E911 request: {reason}.")]
	InvalidE911Request {
		/// What was missing.
		reason: String,
	},
}

/// Provider-side failures surfaced through [`Error::RemoteToken`] and [`Error::RemoteE911`].
#[derive(Debug, ThisError)]
pub enum RemoteError {
	/// Provider answered with a non-2xx status.
	#[error("Provider responded with HTTP {status}.")]
	Rejected {
		/// HTTP status returned by the provider.
		status: u16,
		/// Raw provider body (JSON when parseable, otherwise a string).
		body: Value,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Provider did not answer within the configured timeout.
	#[error("Request timed out while calling the provider.")]
	Timeout,
	/// Network or I/O failure.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Any other HTTP client failure.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
