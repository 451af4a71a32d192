//! Provider API plumbing: outbound request shapes, response classification, and transport
//! error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
	},
};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, RemoteError, TransportError},
	http::{self, ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

const APPLICATION_JSON: &str = "application/json";
const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";

/// Maps HTTP transport failures into DHS [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a DHS error.
	fn map_transport_error(
		&self,
		operation: RemoteOperation,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: RemoteOperation,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(operation, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => operation.failure(TransportError::Io(inner).into()),
			HttpClientError::Other(message) =>
				operation.failure(TransportError::Other { message }.into()),
			_ => operation
				.failure(TransportError::Other { message: "unknown transport failure".into() }.into()),
		}
	}
}

/// Provider endpoint a request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
	/// Token endpoint (authorization code, client credentials, or refresh).
	AccessToken,
	/// E911 identifier endpoint.
	E911Id,
}
impl RemoteOperation {
	/// Wraps a provider failure in the [`Error`] variant for this endpoint.
	pub fn failure(self, error: RemoteError) -> Error {
		match self {
			Self::AccessToken => Error::RemoteToken(error),
			Self::E911Id => Error::RemoteE911(error),
		}
	}
}

/// Provider response body handed back to callers unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderPayload(Value);
impl ProviderPayload {
	/// Wraps a raw provider body.
	pub fn new(value: Value) -> Self {
		Self(value)
	}

	/// Returns the `access_token` field when the provider included one.
	///
	/// The DHS never requires this field; it only reads it for logging decisions and tests.
	pub fn access_token(&self) -> Option<&str> {
		self.0.get("access_token").and_then(Value::as_str)
	}

	/// Borrows the raw body.
	pub fn as_value(&self) -> &Value {
		&self.0
	}

	/// Consumes the payload and returns the raw body.
	pub fn into_inner(self) -> Value {
		self.0
	}
}

/// Builds a form-encoded `POST` to `url`.
pub(crate) fn form_request(url: &str, params: &[(&str, &str)]) -> Result<HttpRequest, ConfigError> {
	let body = Serializer::new(String::new()).extend_pairs(params).finish();

	Ok(base_request(url)
		.header(CONTENT_TYPE, APPLICATION_FORM)
		.body(body.into_bytes())?)
}

/// Builds a JSON `POST` to `url`, optionally authorized with a bearer token.
pub(crate) fn json_request(
	url: &str,
	bearer: Option<&str>,
	body: &Value,
) -> Result<HttpRequest, ConfigError> {
	let mut builder = base_request(url).header(CONTENT_TYPE, APPLICATION_JSON);

	if let Some(token) = bearer {
		builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
	}

	Ok(builder.body(body.to_string().into_bytes())?)
}

/// Sends `request` and classifies the provider's answer.
///
/// Any 2xx response yields the parsed body. Every other status becomes
/// [`RemoteError::Rejected`] carrying the provider body verbatim.
pub(crate) async fn dispatch<C, M>(
	client: &C,
	mapper: &M,
	operation: RemoteOperation,
	request: HttpRequest,
) -> Result<ProviderPayload>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let slot = ResponseMetadataSlot::default();
	let handle = client.with_metadata(slot.clone());
	let response = handle
		.call(request)
		.await
		.map_err(|e| mapper.map_transport_error(operation, slot.take().as_ref(), e))?;

	classify_response(operation, response, slot.take())
}

fn base_request(url: &str) -> oauth2::http::request::Builder {
	Request::builder()
		.method(Method::POST)
		.uri(url)
		.header(ACCEPT, APPLICATION_JSON)
		.header(USER_AGENT, http::USER_AGENT)
}

fn classify_response(
	operation: RemoteOperation,
	response: HttpResponse,
	meta: Option<ResponseMetadata>,
) -> Result<ProviderPayload> {
	let status = response.status();
	let body = parse_body(response.body());

	if status.is_success() {
		return Ok(ProviderPayload(body));
	}

	Err(operation.failure(RemoteError::Rejected {
		status: status.as_u16(),
		body,
		retry_after: meta.and_then(|meta| meta.retry_after),
	}))
}

fn parse_body(bytes: &[u8]) -> Value {
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Value::Null;
	}

	serde_json::from_slice(bytes)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(operation: RemoteOperation, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return operation.failure(RemoteError::Timeout);
	}

	operation.failure(TransportError::from(err).into())
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	use serde_json::json;
	// self
	use super::*;

	fn response(status: StatusCode, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = status;

		response
	}

	#[test]
	fn success_bodies_pass_through() {
		let payload = classify_response(
			RemoteOperation::AccessToken,
			response(StatusCode::OK, r#"{"access_token":"abc","extra":1}"#),
			None,
		)
		.expect("2xx responses should succeed.");

		assert_eq!(payload.access_token(), Some("abc"));
		assert_eq!(payload.into_inner(), json!({ "access_token": "abc", "extra": 1 }));
	}

	#[test]
	fn non_json_and_empty_bodies_are_kept() {
		let payload =
			classify_response(RemoteOperation::E911Id, response(StatusCode::CREATED, ""), None)
				.expect("Empty 2xx body should succeed.");

		assert_eq!(payload.as_value(), &Value::Null);

		let err = classify_response(
			RemoteOperation::E911Id,
			response(StatusCode::BAD_GATEWAY, "upstream down"),
			Some(ResponseMetadata { status: Some(502), retry_after: Some(Duration::seconds(5)) }),
		)
		.expect_err("5xx responses should fail.");

		match err {
			Error::RemoteE911(RemoteError::Rejected { status, body, retry_after }) => {
				assert_eq!(status, 502);
				assert_eq!(body, json!("upstream down"));
				assert_eq!(retry_after, Some(Duration::seconds(5)));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn form_request_carries_headers_and_body() {
		let request = form_request("https://x/token", &[("grant_type", "client_credentials")])
			.expect("Form request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.headers()[CONTENT_TYPE], APPLICATION_FORM);
		assert_eq!(request.headers()[ACCEPT], APPLICATION_JSON);
		assert_eq!(request.body().as_slice(), b"grant_type=client_credentials");
	}

	#[test]
	fn json_request_sets_bearer() {
		let request = json_request("https://x/e911", Some("tok"), &json!({ "token": "tok" }))
			.expect("JSON request should build.");

		assert_eq!(request.headers()[AUTHORIZATION], "Bearer tok");
		assert_eq!(request.headers()[CONTENT_TYPE], APPLICATION_JSON);
	}
}
