//! Access token issuance and refresh exchanges.
//!
//! [`Dhs::create_access_token`] resolves the requested [`AppScope`] to its OAuth grant and
//! provider scope, then performs exactly one form-encoded `POST` to the token endpoint with the
//! app's credentials. [`Dhs::refresh_access_token`] does the same for the `refresh_token`
//! grant. Input validation always completes before any network call, and provider bodies come
//! back unmodified.

// self
use crate::{
	_prelude::*,
	auth::{AppScope, GrantType},
	error::RequestError,
	flows::{Dhs, non_blank},
	http::ProviderHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{self, ProviderPayload, RemoteOperation, TransportErrorMapper},
};

/// Browser request for a new access token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccessTokenRequest {
	/// Requested application scope, as its wire name (for example `ACCOUNT_ID`).
	#[serde(alias = "scope")]
	pub app_scope: Option<String>,
	/// Authorization code returned by the consent flow; required for `MOBILE_NUMBER`.
	#[serde(alias = "code")]
	pub auth_code: Option<String>,
}
impl AccessTokenRequest {
	/// Creates a request for `scope`.
	pub fn for_scope(scope: AppScope) -> Self {
		Self { app_scope: Some(scope.as_str().into()), auth_code: None }
	}

	/// Attaches the consent flow's authorization code.
	pub fn with_auth_code(mut self, code: impl Into<String>) -> Self {
		self.auth_code = Some(code.into());

		self
	}

	/// Resolves and validates the scope, then checks the auth code requirement.
	///
	/// Returns the scope together with the code that should be forwarded, if any.
	pub fn validate(&self) -> Result<(AppScope, Option<&str>), RequestError> {
		let raw = non_blank(self.app_scope.as_deref()).ok_or(RequestError::MissingScope)?;
		let scope = raw
			.parse::<AppScope>()
			.ok()
			.filter(|scope| scope.is_requestable())
			.ok_or_else(|| RequestError::InvalidScope { scope: raw.to_owned() })?;
		let code = non_blank(self.auth_code.as_deref());

		if scope.requires_auth_code() && code.is_none() {
			return Err(RequestError::MissingAuthCode);
		}

		Ok((scope, code))
	}
}

/// Browser request to exchange a refresh token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefreshTokenRequest {
	/// Refresh token previously issued for a `MOBILE_NUMBER` consent.
	pub refresh_token: Option<String>,
}
impl RefreshTokenRequest {
	/// Creates a refresh request for `token`.
	pub fn new(token: impl Into<String>) -> Self {
		Self { refresh_token: Some(token.into()) }
	}
}

impl<C, M> Dhs<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the app credentials for an access token covering `request.app_scope`.
	///
	/// Validation order (first failure wins): configuration, scope presence, scope validity,
	/// auth code presence for `MOBILE_NUMBER`. `REFRESH` is rejected as an invalid scope here;
	/// use [`Dhs::refresh_access_token`] instead.
	pub async fn create_access_token(&self, request: AccessTokenRequest) -> Result<ProviderPayload> {
		const KIND: FlowKind = FlowKind::AccessToken;

		let span = FlowSpan::new(KIND, "create_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.config()?;
				let (scope, code) = request.validate()?;
				let mut form: Vec<(&str, &str)> = vec![
					("client_id", config.app_key.as_ref()),
					("client_secret", config.app_secret.expose()),
					("grant_type", scope.grant_type().as_str()),
				];

				if let Some(oauth_scope) = scope.oauth_scope() {
					form.push(("scope", oauth_scope));
				}
				if let Some(code) = code {
					form.push(("code", code));
				}

				tracing::debug!(scope = %scope, "Requesting access token.");

				let http_request = provider::form_request(&config.token_url(), &form)?;

				provider::dispatch(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					RemoteOperation::AccessToken,
					http_request,
				)
				.await
			})
			.await;

		record(KIND, &result);

		result
	}

	/// Exchanges a refresh token for a new access token.
	///
	/// The request carries no scope; the provider keeps the one granted at consent time.
	pub async fn refresh_access_token(
		&self,
		request: RefreshTokenRequest,
	) -> Result<ProviderPayload> {
		const KIND: FlowKind = FlowKind::RefreshToken;

		let span = FlowSpan::new(KIND, "refresh_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.config()?;
				let refresh_token = non_blank(request.refresh_token.as_deref())
					.ok_or(RequestError::MissingRefreshToken)?;
				let form: [(&str, &str); 4] = [
					("client_id", config.app_key.as_ref()),
					("client_secret", config.app_secret.expose()),
					("grant_type", GrantType::RefreshToken.as_str()),
					("refresh_token", refresh_token),
				];
				let http_request = provider::form_request(&config.refresh_url(), &form)?;

				provider::dispatch(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					RemoteOperation::AccessToken,
					http_request,
				)
				.await
			})
			.await;

		record(KIND, &result);

		result
	}
}

pub(super) fn record<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(e) => {
			tracing::warn!(flow = %kind, error = %e, "DHS flow failed.");

			obs::record_flow_outcome(kind, FlowOutcome::Failure);
		},
	}
}
