#![cfg(all(feature = "reqwest", feature = "test"))]

// self
use webrtc_dhs::{
	_preludet::*,
	auth::AppScope,
	config::DhsConfig,
	error::{ConfigError, Error, RemoteError, Result, TransportError},
	flows::{AccessTokenRequest, Dhs, E911Address, E911IdRequest},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{
		RemoteOperation, TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	retry_after: Duration,
}
impl FakeHttpClient {
	fn throttled(retry_after: Duration) -> Self {
		Self { retry_after }
	}
}
impl ProviderHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, retry_after: self.retry_after }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	retry_after: Duration,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let retry_after = self.retry_after;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			slot.store(ResponseMetadata { status: Some(429), retry_after: Some(retry_after) });

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	calls: Arc<Mutex<Vec<(RemoteOperation, Option<ResponseMetadata>)>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded(&self) -> Vec<(RemoteOperation, Option<ResponseMetadata>)> {
		self.calls.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: RemoteOperation,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		self.calls.lock().push((operation, meta.cloned()));

		match err {
			HttpClientError::Reqwest(inner) => operation.failure(
				TransportError::Other { message: format!("Fake transport error: {inner}") }.into(),
			),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => operation.failure(TransportError::Io(inner).into()),
			HttpClientError::Other(message) =>
				operation.failure(TransportError::Other { message }.into()),
			other => operation.failure(
				TransportError::Other { message: format!("Unhandled variant: {other:?}") }.into(),
			),
		}
	}
}

fn config() -> DhsConfig {
	test_config_builder("https://mock.example.com")
		.build()
		.expect("Failed to build mock DHS configuration.")
}

fn build_dhs(
	retry_after: Duration,
	mapper: Arc<RecordingTransportErrorMapper>,
) -> Dhs<FakeHttpClient, RecordingTransportErrorMapper> {
	Dhs::with_http_client(FakeHttpClient::throttled(retry_after), mapper).configured(config())
}

#[tokio::test]
async fn fake_client_failures_are_token_errors() {
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let dhs = build_dhs(Duration::seconds(5), mapper.clone());
	let err = dhs
		.create_access_token(AccessTokenRequest::for_scope(AppScope::AccountId))
		.await
		.expect_err("Throttled transport should fail the request.");

	match err {
		Error::RemoteToken(RemoteError::Transport(TransportError::Other { message })) => {
			assert!(message.contains("Transport throttled."));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn fake_mapper_captures_operation_and_metadata() {
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let dhs = build_dhs(Duration::seconds(30), mapper.clone());
	let address: E911Address = serde_json::from_value(serde_json::json!({
		"first_name": "Ada",
		"last_name": "Lovelace",
		"house_number": "1",
		"street": "Main St",
		"city": "Dallas",
		"state": "TX",
		"zip": "75001",
	}))
	.expect("Address fixture should deserialize.");
	let err = dhs
		.create_e911_id(E911IdRequest::new("token", address))
		.await
		.expect_err("Throttled transport should fail the request.");

	assert!(matches!(err, Error::RemoteE911(RemoteError::Transport(_))));

	let recorded = mapper.recorded();

	assert_eq!(recorded.len(), 1);

	let (operation, meta) = &recorded[0];
	let meta = meta.as_ref().expect("Mapper should receive response metadata.");

	assert_eq!(*operation, RemoteOperation::E911Id);
	assert_eq!(meta.status, Some(429));
	assert_eq!(meta.retry_after, Some(Duration::seconds(30)));
}
