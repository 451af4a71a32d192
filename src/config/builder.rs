//! Options accepted by `configure` and their validation.

// self
use crate::{
	_prelude::*,
	auth::{AppKey, Secret},
	config::{
		DEFAULT_API_ENDPOINT, DEFAULT_AUTHORIZE_PATH, DEFAULT_E911_PATH, DEFAULT_TOKEN_PATH,
		DhsConfig, EnvironmentConfig,
	},
	error::ConfigError,
};

/// Options accepted by `configure`; every field is optional until [`build`](Self::build).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DhsConfigBuilder {
	/// Application key assigned on the developer portal.
	pub app_key: Option<String>,
	/// Application secret assigned on the developer portal.
	pub app_secret: Option<Secret>,
	/// Provider API host.
	pub api_endpoint: Option<String>,
	/// Token endpoint path.
	pub token_path: Option<String>,
	/// User-consent endpoint path.
	pub authorize_path: Option<String>,
	/// E911 identifier endpoint path.
	pub e911_path: Option<String>,
	/// Refresh endpoint path; falls back to the token path.
	pub refresh_path: Option<String>,
	/// Browser-facing environment values.
	pub environment: Option<EnvironmentConfig>,
}
impl DhsConfigBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the application key.
	pub fn app_key(mut self, value: impl Into<String>) -> Self {
		self.app_key = Some(value.into());

		self
	}

	/// Sets the application secret.
	pub fn app_secret(mut self, value: impl Into<String>) -> Self {
		self.app_secret = Some(Secret::new(value));

		self
	}

	/// Sets the provider API host.
	pub fn api_endpoint(mut self, value: impl Into<String>) -> Self {
		self.api_endpoint = Some(value.into());

		self
	}

	/// Sets the token endpoint path.
	pub fn token_path(mut self, value: impl Into<String>) -> Self {
		self.token_path = Some(value.into());

		self
	}

	/// Sets the user-consent endpoint path.
	pub fn authorize_path(mut self, value: impl Into<String>) -> Self {
		self.authorize_path = Some(value.into());

		self
	}

	/// Sets the E911 identifier endpoint path.
	pub fn e911_path(mut self, value: impl Into<String>) -> Self {
		self.e911_path = Some(value.into());

		self
	}

	/// Sets the refresh endpoint path.
	pub fn refresh_path(mut self, value: impl Into<String>) -> Self {
		self.refresh_path = Some(value.into());

		self
	}

	/// Sets the browser-facing environment values.
	pub fn environment(mut self, environment: EnvironmentConfig) -> Self {
		self.environment = Some(environment);

		self
	}

	/// Overlays every field set on `overrides` onto `self`.
	pub fn merge(self, overrides: Self) -> Self {
		Self {
			app_key: overrides.app_key.or(self.app_key),
			app_secret: overrides.app_secret.or(self.app_secret),
			api_endpoint: overrides.api_endpoint.or(self.api_endpoint),
			token_path: overrides.token_path.or(self.token_path),
			authorize_path: overrides.authorize_path.or(self.authorize_path),
			e911_path: overrides.e911_path.or(self.e911_path),
			refresh_path: overrides.refresh_path.or(self.refresh_path),
			environment: overrides.environment.or(self.environment),
		}
	}

	/// Returns true when no option is set.
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<DhsConfig, ConfigError> {
		if self.is_empty() {
			return Err(ConfigError::NoOptions);
		}

		let app_key = self
			.app_key
			.filter(|value| !value.trim().is_empty())
			.ok_or(ConfigError::MissingAppKey)?;
		let app_key = AppKey::new(app_key)?;
		let app_secret = self
			.app_secret
			.filter(|value| !value.expose().trim().is_empty())
			.ok_or(ConfigError::MissingAppSecret)?;
		let api_endpoint =
			validate_endpoint(self.api_endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT))?;
		let token_path = validate_path("token_path", self.token_path, DEFAULT_TOKEN_PATH)?;
		let authorize_path =
			validate_path("authorize_path", self.authorize_path, DEFAULT_AUTHORIZE_PATH)?;
		let e911_path = validate_path("e911_path", self.e911_path, DEFAULT_E911_PATH)?;
		let refresh_path = validate_path("refresh_path", self.refresh_path, &token_path)?;

		Ok(DhsConfig {
			app_key,
			app_secret,
			api_endpoint,
			token_path,
			authorize_path,
			e911_path,
			refresh_path,
			environment: self.environment.unwrap_or_default(),
		})
	}
}

fn validate_endpoint(raw: &str) -> Result<String, ConfigError> {
	let trimmed = raw.trim().trim_end_matches('/');
	let invalid = || ConfigError::InvalidEndpoint { endpoint: raw.to_owned() };
	let url = Url::parse(trimmed).map_err(|_| invalid())?;

	if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
		return Err(invalid());
	}

	Ok(trimmed.to_owned())
}

fn validate_path(
	name: &'static str,
	value: Option<String>,
	default: &str,
) -> Result<String, ConfigError> {
	let path = value.unwrap_or_else(|| default.to_owned());

	if path.starts_with('/') && !path.chars().any(char::is_whitespace) {
		Ok(path)
	} else {
		Err(ConfigError::InvalidPath { name, path })
	}
}
