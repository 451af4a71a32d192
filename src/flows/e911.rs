//! E911 address identifier creation.
//!
//! An E911 identifier binds a caller's physical address to their WebRTC session so emergency
//! calls can be routed. The DHS validates the address shape locally, then forwards the request
//! to the provider with the E911-scoped access token as a bearer credential.

// crates.io
use serde::{
	Deserializer,
	de::{Error as DeError, Unexpected},
};
use serde_json::Map;
// self
use crate::{
	_prelude::*,
	error::RequestError,
	flows::{Dhs, non_blank, token},
	http::ProviderHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{self, ProviderPayload, RemoteOperation, TransportErrorMapper},
};

/// Postal address attached to an E911 identifier.
///
/// Known fields are typed; any other field is kept in [`E911Address::extra`] and forwarded to
/// the provider untouched. Numbers are accepted where strings are expected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct E911Address {
	/// Subscriber first name.
	#[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Subscriber last name.
	#[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// House number.
	#[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
	pub house_number: Option<String>,
	/// Street name.
	#[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
	pub street: Option<String>,
	/// Apartment or suite.
	#[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
	pub unit: Option<String>,
	/// City.
	#[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	/// State or province code.
	#[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	/// Postal code.
	#[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
	pub zip: Option<String>,
	/// Fields the DHS does not interpret.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl E911Address {
	/// Returns the names of required fields that are absent or blank.
	pub fn missing_fields(&self) -> Vec<&'static str> {
		[
			("first_name", &self.first_name),
			("last_name", &self.last_name),
			("house_number", &self.house_number),
			("street", &self.street),
			("city", &self.city),
			("state", &self.state),
			("zip", &self.zip),
		]
		.into_iter()
		.filter(|(_, value)| non_blank(value.as_deref()).is_none())
		.map(|(name, _)| name)
		.collect()
	}

	/// Converts the address into the JSON object sent to the provider.
	pub fn to_value(&self) -> Value {
		let mut object = Map::new();
		let known = [
			("first_name", &self.first_name),
			("last_name", &self.last_name),
			("house_number", &self.house_number),
			("street", &self.street),
			("unit", &self.unit),
			("city", &self.city),
			("state", &self.state),
			("zip", &self.zip),
		];

		for (name, value) in known {
			if let Some(value) = value {
				object.insert(name.into(), Value::String(value.clone()));
			}
		}
		for (name, value) in &self.extra {
			object.entry(name.clone()).or_insert_with(|| value.clone());
		}

		Value::Object(object)
	}
}

/// Browser request for a new E911 identifier.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct E911IdRequest {
	/// Access token minted for the `E911` scope.
	pub token: Option<String>,
	/// Address to register.
	pub address: Option<E911Address>,
	/// Whether the caller confirmed the address as entered.
	#[serde(deserialize_with = "flexible_bool")]
	pub is_confirmed: bool,
}
impl E911IdRequest {
	/// Creates a request for `address` authorized by `token`.
	pub fn new(token: impl Into<String>, address: E911Address) -> Self {
		Self { token: Some(token.into()), address: Some(address), is_confirmed: false }
	}

	/// Marks the address as confirmed by the caller.
	pub fn confirmed(mut self, is_confirmed: bool) -> Self {
		self.is_confirmed = is_confirmed;

		self
	}

	/// Checks that the token, the address, and every required address field are present.
	pub fn validate(&self) -> Result<(&str, &E911Address), RequestError> {
		let invalid = |reason: String| RequestError::InvalidE911Request { reason };
		let token =
			non_blank(self.token.as_deref()).ok_or_else(|| invalid("No token provided".into()))?;
		let address = self.address.as_ref().ok_or_else(|| invalid("No address provided".into()))?;
		let missing = address.missing_fields();

		if !missing.is_empty() {
			return Err(invalid(format!("Address is missing {}", missing.join(", "))));
		}

		Ok((token, address))
	}
}

impl<C, M> Dhs<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Registers `request.address` with the provider and returns the new E911 identifier body.
	pub async fn create_e911_id(&self, request: E911IdRequest) -> Result<ProviderPayload> {
		const KIND: FlowKind = FlowKind::E911Id;

		let span = FlowSpan::new(KIND, "create_e911_id");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.config()?;
				let (token, address) = request.validate()?;
				let mut body = Map::new();

				body.insert("token".into(), Value::String(token.to_owned()));
				body.insert("address".into(), address.to_value());
				body.insert("is_confirmed".into(), Value::Bool(request.is_confirmed));

				let http_request =
					provider::json_request(&config.e911_url(), Some(token), &Value::Object(body))?;

				provider::dispatch(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					RemoteOperation::E911Id,
					http_request,
				)
				.await
			})
			.await;

		token::record(KIND, &result);

		result
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
	Bool(bool),
	Number(serde_json::Number),
	String(String),
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Scalar>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Scalar::String(value)) => Ok(Some(value)),
		Some(Scalar::Number(value)) => Ok(Some(value.to_string())),
		Some(Scalar::Bool(value)) =>
			Err(D::Error::invalid_type(Unexpected::Bool(value), &"a string or a number")),
	}
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Scalar>::deserialize(deserializer)? {
		None => Ok(false),
		Some(Scalar::Bool(value)) => Ok(value),
		Some(Scalar::String(value)) => match value.trim() {
			"true" => Ok(true),
			"false" | "" => Ok(false),
			other => Err(D::Error::invalid_value(Unexpected::Str(other), &"a boolean")),
		},
		Some(Scalar::Number(value)) =>
			Err(D::Error::invalid_type(Unexpected::Other(&value.to_string()), &"a boolean")),
	}
}
