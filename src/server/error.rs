// crates.io
use axum::{
	Json,
	http::{HeaderName, HeaderValue, StatusCode},
	response::{IntoResponse, Response},
};
use serde_json::json;
// self
use crate::{_prelude::*, error::RemoteError};

/// Response header naming where an error body came from: `local` or `provider`.
pub const ERROR_SOURCE_HEADER: &str = "x-dhs-error-source";

/// Route failure rendered as HTTP 400.
///
/// Local failures answer `{"message": ...}`. Provider rejections answer the provider's body
/// verbatim. [`ERROR_SOURCE_HEADER`] tells the two apart.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiError {
	/// Validation, configuration, or transport failure raised by the DHS itself.
	Local(String),
	/// Non-2xx provider response body.
	Provider(Value),
}
impl ApiError {
	/// Builds a local error from any message.
	pub fn local(message: impl Into<String>) -> Self {
		Self::Local(message.into())
	}

	/// Returns the [`ERROR_SOURCE_HEADER`] value for this error.
	pub const fn source_label(&self) -> &'static str {
		match self {
			Self::Local(_) => "local",
			Self::Provider(_) => "provider",
		}
	}
}
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		match e {
			Error::RemoteToken(RemoteError::Rejected { body, .. })
			| Error::RemoteE911(RemoteError::Rejected { body, .. }) => Self::Provider(body),
			other => Self::Local(other.to_string()),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let source = HeaderValue::from_static(self.source_label());
		let body = match self {
			Self::Local(message) => json!({ "message": message }),
			Self::Provider(body) => body,
		};

		(StatusCode::BAD_REQUEST, [(HeaderName::from_static(ERROR_SOURCE_HEADER), source)], Json(body))
			.into_response()
	}
}
