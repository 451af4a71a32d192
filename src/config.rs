//! Configuration holder data and settings loading.
//!
//! [`DhsConfig`] is the validated, immutable configuration owned by a
//! [`Dhs`](crate::flows::Dhs) instance. It is produced by [`DhsConfigBuilder`], which doubles
//! as the `configure` options object and as the `[dhs]` table of the settings file loaded by
//! [`Settings`].

pub mod builder;
pub mod settings;

pub use builder::*;
pub use settings::*;

// self
use crate::{
	_prelude::*,
	auth::{AppKey, AppScope, Secret},
};

/// Provider API host used when the settings omit `api_endpoint`.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.att.com";
/// Token endpoint path used when the settings omit `token_path`.
pub const DEFAULT_TOKEN_PATH: &str = "/oauth/v4/token";
/// Consent endpoint path used when the settings omit `authorize_path`.
pub const DEFAULT_AUTHORIZE_PATH: &str = "/oauth/v4/authorize";
/// E911 endpoint path used when the settings omit `e911_path`.
pub const DEFAULT_E911_PATH: &str = "/RTC/v1/e911ids";
/// Enhanced WebRTC resource path advertised to browsers by default.
pub const DEFAULT_EWEBRTC_URI: &str = "/RTC/v1";

/// Browser-facing environment values served by `GET /config`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
	/// Enhanced WebRTC resource path on the API host.
	pub ewebrtc_uri: String,
	/// Domain used for account ID users.
	pub ewebrtc_domain: Option<String>,
	/// Virtual numbers the app may hand out.
	pub virtual_numbers_pool: Vec<String>,
}
impl Default for EnvironmentConfig {
	fn default() -> Self {
		Self {
			ewebrtc_uri: DEFAULT_EWEBRTC_URI.into(),
			ewebrtc_domain: None,
			virtual_numbers_pool: Vec::new(),
		}
	}
}

/// Public subset of the configuration safe to hand to browsers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicConfig {
	/// Provider API host.
	pub api_endpoint: String,
	/// Enhanced WebRTC resource path.
	pub ewebrtc_uri: String,
	/// Virtual numbers the app may hand out.
	pub virtual_numbers_pool: Vec<String>,
	/// Domain used for account ID users.
	pub ewebrtc_domain: Option<String>,
}

/// Immutable, validated DHS configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DhsConfig {
	/// Application key, sent as the OAuth `client_id`.
	pub app_key: AppKey,
	/// Application secret, sent as the OAuth `client_secret`.
	pub app_secret: Secret,
	/// Provider API host without a trailing slash.
	pub api_endpoint: String,
	/// Token endpoint path.
	pub token_path: String,
	/// User-consent endpoint path.
	pub authorize_path: String,
	/// E911 identifier endpoint path.
	pub e911_path: String,
	/// Endpoint path for refresh exchanges (the token path unless overridden).
	pub refresh_path: String,
	/// Browser-facing environment values.
	pub environment: EnvironmentConfig,
}
impl DhsConfig {
	/// Creates an empty builder.
	pub fn builder() -> DhsConfigBuilder {
		DhsConfigBuilder::new()
	}

	/// Full token endpoint URL.
	pub fn token_url(&self) -> String {
		self.endpoint(&self.token_path)
	}

	/// Full refresh endpoint URL.
	pub fn refresh_url(&self) -> String {
		self.endpoint(&self.refresh_path)
	}

	/// Full E911 identifier endpoint URL.
	pub fn e911_url(&self) -> String {
		self.endpoint(&self.e911_path)
	}

	/// User-consent page URL for mobile-number subscribers.
	///
	/// The value is plain concatenation of endpoint, path, app key, and the `MOBILE_NUMBER`
	/// OAuth scope, matching what the provider registered for the app.
	pub fn user_consent_url(&self) -> String {
		let scope = AppScope::MobileNumber.oauth_scope().unwrap_or_default();

		format!("{}?client_id={}&scope={scope}", self.endpoint(&self.authorize_path), self.app_key)
	}

	/// Returns the public view served to browsers.
	pub fn public_view(&self) -> PublicConfig {
		PublicConfig {
			api_endpoint: self.api_endpoint.clone(),
			ewebrtc_uri: self.environment.ewebrtc_uri.clone(),
			virtual_numbers_pool: self.environment.virtual_numbers_pool.clone(),
			ewebrtc_domain: self.environment.ewebrtc_domain.clone(),
		}
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}{path}", self.api_endpoint)
	}
}
