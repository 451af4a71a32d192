// crates.io
use axum::{
	Json,
	body::Bytes,
	extract::{RawQuery, State},
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::Map;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::ConsentState,
	config::PublicConfig,
	flows::{AccessTokenRequest, E911IdRequest, RefreshTokenRequest},
	provider::ProviderPayload,
	server::{ApiError, AppState},
	store::PendingConsent,
};

const NO_REDIRECT_URI: &str = "No redirect URI provided. Authorize requires a redirect URI";
const NO_PENDING_REDIRECT: &str = "No redirect URI. Unable to redirect";
const NO_AUTH_CODE: &str = "Unable to retrieve authorization code";
const NOT_CONFIGURED: &str = "Environment not configured";

pub(super) async fn config(State(state): State<AppState>) -> Result<Json<PublicConfig>, ApiError> {
	let config = state.dhs.config().map_err(|_| ApiError::local(NOT_CONFIGURED))?;

	Ok(Json(config.public_view()))
}

pub(super) async fn authorize(
	State(state): State<AppState>,
	RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
	let redirect_uri = query_param(query.as_deref(), "redirect_uri").ok_or_else(|| {
		tracing::warn!("Authorize request without a redirect URI.");

		ApiError::local(NO_REDIRECT_URI)
	})?;
	let url = begin_consent(&state, redirect_uri)?;

	tracing::info!(target_url = %url, "Redirecting to consent page.");

	Ok(found(url))
}

pub(super) async fn authorize_url(
	State(state): State<AppState>,
	RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
	let url = consent_target(&state, query.as_deref())?;

	Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], url).into_response())
}

pub(super) async fn consent_redirect(
	State(state): State<AppState>,
	RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
	let url = consent_target(&state, query.as_deref())?;

	tracing::info!(target_url = %url, "Redirecting to consent page.");

	Ok(found(url))
}

pub(super) async fn callback(
	State(state): State<AppState>,
	RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
	let query = query.as_deref();
	let code = query_param(query, "code").ok_or_else(|| {
		let provider_error = query_param(query, "error");

		tracing::warn!(error = provider_error.as_deref(), "Callback without an authorization code.");

		ApiError::local(NO_AUTH_CODE)
	})?;
	let pending = query_param(query, "state")
		.and_then(|flow| state.consent.take(&flow, OffsetDateTime::now_utc()))
		.ok_or_else(|| {
			tracing::warn!("Callback without a pending consent flow.");

			ApiError::local(NO_PENDING_REDIRECT)
		})?;
	let url = redirect_with_code(&pending.redirect_uri, &code);

	tracing::info!(target_url = %pending.redirect_uri, "Redirecting back to the app.");

	Ok(found(url))
}

pub(super) async fn create_token(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<ProviderPayload>, ApiError> {
	let request: AccessTokenRequest = parse_body(&headers, &body)?;

	tracing::info!(app_scope = request.app_scope.as_deref(), "Got token request.");

	Ok(Json(state.dhs.create_access_token(request).await?))
}

pub(super) async fn refresh_token(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<ProviderPayload>, ApiError> {
	let request: RefreshTokenRequest = parse_body(&headers, &body)?;

	tracing::info!("Got refresh request.");

	Ok(Json(state.dhs.refresh_access_token(request).await?))
}

pub(super) async fn create_e911_id(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<ProviderPayload>, ApiError> {
	let request: E911IdRequest = parse_body(&headers, &body)?;

	tracing::info!(is_confirmed = request.is_confirmed, "Got e911id request.");

	Ok(Json(state.dhs.create_e911_id(request).await?))
}

/// Returns the consent URL, tracking a pending flow only when the query names a `redirect_uri`.
fn consent_target(state: &AppState, query: Option<&str>) -> Result<String, ApiError> {
	match query_param(query, "redirect_uri") {
		Some(redirect_uri) => begin_consent(state, redirect_uri),
		None => Ok(state.dhs.user_consent_url()?),
	}
}

/// Registers a pending flow for `redirect_uri` and returns the consent URL carrying its state.
fn begin_consent(state: &AppState, redirect_uri: String) -> Result<String, ApiError> {
	let flow = ConsentState::generate();
	let url = state.dhs.consent_url_with_state(&flow)?;

	state.consent.put(
		flow,
		PendingConsent::new(redirect_uri, OffsetDateTime::now_utc(), state.consent_ttl),
	);

	Ok(url)
}

fn found(location: String) -> Response {
	(StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Returns the first non-blank value of `name` in a raw query string.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
	form_urlencoded::parse(query?.as_bytes())
		.find(|(key, _)| key == name)
		.map(|(_, value)| value.into_owned())
		.filter(|value| !value.trim().is_empty())
}

/// Appends `code` to `redirect_uri`, keeping any query the app already put there.
fn redirect_with_code(redirect_uri: &str, code: &str) -> String {
	if let Ok(mut url) = Url::parse(redirect_uri) {
		url.query_pairs_mut().append_pair("code", code);

		return url.into();
	}

	let separator = if redirect_uri.contains('?') { '&' } else { '?' };
	let code = form_urlencoded::byte_serialize(code.as_bytes()).collect::<String>();

	format!("{redirect_uri}{separator}code={code}")
}

/// Decodes a JSON or form-encoded body; an empty body reads as `{}`.
fn parse_body<T>(headers: &HeaderMap, body: &[u8]) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	let is_form = headers
		.get(header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

	if is_form {
		let object = form_urlencoded::parse(body)
			.map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
			.collect::<Map<_, _>>();

		return serde_path_to_error::deserialize(Value::Object(object)).map_err(malformed);
	}
	if body.iter().all(u8::is_ascii_whitespace) {
		return serde_path_to_error::deserialize(Value::Object(Map::new())).map_err(malformed);
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(malformed)
}

fn malformed<E>(e: serde_path_to_error::Error<E>) -> ApiError
where
	E: Display,
{
	ApiError::local(format!("Malformed request body at `{}`: {}.", e.path(), e.inner()))
}
