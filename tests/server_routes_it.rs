#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use axum::{
	Router,
	body::{Body, to_bytes},
	http::{Request, StatusCode, header},
	response::Response,
};
use httpmock::prelude::*;
use serde_json::json;
use tower::ServiceExt;
// self
use webrtc_dhs::{
	_preludet::*,
	flows::ReqwestDhs,
	server::{self, AppState, ERROR_SOURCE_HEADER},
	store::MemoryConsentStore,
};

fn app(api_endpoint: &str) -> Router {
	server::router(AppState::new(build_reqwest_test_dhs(api_endpoint)))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
	app.clone().oneshot(request).await.expect("Router should answer every request.")
}

fn get(uri: &str) -> Request<Body> {
	Request::get(uri).body(Body::empty()).expect("GET request should build.")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
	Request::post(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.expect("POST request should build.")
}

async fn json_body(response: Response) -> Value {
	let bytes = to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Response body should be readable.");

	serde_json::from_slice(&bytes).expect("Response body should be JSON.")
}

fn location(response: &Response) -> String {
	response.headers()[header::LOCATION]
		.to_str()
		.expect("Location header should be ASCII.")
		.to_owned()
}

#[tokio::test]
async fn authorize_requires_redirect_uri() {
	let app = app("https://api.example.com");
	let response = send(&app, get("/oauth/authorize")).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(response.headers()[ERROR_SOURCE_HEADER], "local");
	assert_eq!(
		json_body(response).await,
		json!({ "message": "No redirect URI provided. Authorize requires a redirect URI" })
	);
}

#[tokio::test]
async fn authorize_then_callback_round_trips_to_redirect_uri() {
	let app = app("https://api.example.com");
	let response =
		send(&app, get("/oauth/authorize?redirect_uri=https%3A%2F%2Fapp.example.com%2Fhome")).await;

	assert_eq!(response.status(), StatusCode::FOUND);

	let consent = Url::parse(&location(&response)).expect("Consent URL should parse.");
	let query = consent.query_pairs().into_owned().collect::<HashMap<String, String>>();

	assert_eq!(consent.path(), "/oauth/v4/authorize");
	assert_eq!(query.get("client_id").map(String::as_str), Some(TEST_APP_KEY));
	assert_eq!(query.get("scope").map(String::as_str), Some("WEBRTCMOBILE"));

	let state = query.get("state").expect("Consent URL should carry a state.");
	let response = send(&app, get(&format!("/oauth/callback?code=abc123&state={state}"))).await;

	assert_eq!(response.status(), StatusCode::FOUND);
	assert_eq!(location(&response), "https://app.example.com/home?code=abc123");

	let replay = send(&app, get(&format!("/oauth/callback?code=abc123&state={state}"))).await;

	assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(replay).await,
		json!({ "message": "No redirect URI. Unable to redirect" })
	);
}

#[tokio::test]
async fn callback_without_code_is_rejected() {
	let app = app("https://api.example.com");
	let response = send(&app, get("/oauth/callback?error=access_denied&state=abc")).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(response).await,
		json!({ "message": "Unable to retrieve authorization code" })
	);
}

#[tokio::test]
async fn expired_consent_flow_is_rejected() {
	let state = AppState::new(build_reqwest_test_dhs("https://api.example.com"))
		.with_consent_ttl(Duration::ZERO);
	let app = server::router(state);
	let response = send(&app, get("/oauth/authorize?redirect_uri=https%3A%2F%2Fapp%2F")).await;
	let consent = Url::parse(&location(&response)).expect("Consent URL should parse.");
	let state = consent
		.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Consent URL should carry a state.");
	let response = send(&app, get(&format!("/oauth/callback?code=c&state={state}"))).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_consent_ttl_still_redirects() {
	let state = AppState::new(build_reqwest_test_dhs("https://api.example.com"))
		.with_consent_ttl(Duration::seconds(i64::MAX));
	let app = server::router(state);
	let response = send(&app, get("/oauth/authorize?redirect_uri=https%3A%2F%2Fapp%2F")).await;

	assert_eq!(response.status(), StatusCode::FOUND);

	let consent = Url::parse(&location(&response)).expect("Consent URL should parse.");
	let state = consent
		.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Consent URL should carry a state.");
	let response = send(&app, get(&format!("/oauth/callback?code=c&state={state}"))).await;

	assert_eq!(response.status(), StatusCode::FOUND);
	assert_eq!(location(&response), "https://app/?code=c");
}

#[tokio::test]
async fn authorize_records_one_pending_flow_per_redirect() {
	let store = Arc::new(MemoryConsentStore::default());
	let state = AppState::new(build_reqwest_test_dhs("https://api.example.com"))
		.with_consent_store(store.clone());
	let app = server::router(state);

	for _ in 0..2 {
		let response = send(&app, get("/oauth/authorize?redirect_uri=https%3A%2F%2Fapp%2F")).await;

		assert_eq!(response.status(), StatusCode::FOUND);
	}

	assert_eq!(store.len(), 2);

	let response = send(&app, get("/oauth/authurl?redirect_uri=https%3A%2F%2Fapp%2F")).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn authurl_returns_plain_consent_url() {
	let app = app("https://api.example.com");
	let response = send(&app, get("/oauth/authurl")).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert!(
		response.headers()[header::CONTENT_TYPE]
			.to_str()
			.expect("Content type should be ASCII.")
			.starts_with("text/plain")
	);

	let body = to_bytes(response.into_body(), usize::MAX).await.expect("Body should be readable.");

	let expected = format!(
		"https://api.example.com/oauth/v4/authorize?client_id={TEST_APP_KEY}&scope=WEBRTCMOBILE"
	);

	assert_eq!(String::from_utf8_lossy(&body), expected);
}

#[tokio::test]
async fn config_reports_environment_or_not_configured() {
	let app = app("https://api.example.com");
	let response = send(&app, get("/config")).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		json_body(response).await,
		json!({
			"api_endpoint": "https://api.example.com",
			"ewebrtc_uri": "/RTC/v1",
			"virtual_numbers_pool": [],
			"ewebrtc_domain": null,
		})
	);

	let unconfigured = server::router(AppState::new(ReqwestDhs::new()));
	let response = send(&unconfigured, get("/config")).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await, json!({ "message": "Environment not configured" }));
}

#[tokio::test]
async fn tokens_route_passes_provider_json_through() {
	let provider = MockServer::start_async().await;
	let mock = provider
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v4/token");
			then.status(200).json_body(json!({ "access_token": "abc", "expires_in": "3600" }));
		})
		.await;
	let app = app(&provider.base_url());

	for uri in ["/tokens", "/oauth/token"] {
		let response = send(&app, post_json(uri, json!({ "app_scope": "ACCOUNT_ID" }))).await;

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(
			json_body(response).await,
			json!({ "access_token": "abc", "expires_in": "3600" })
		);
	}

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn tokens_route_accepts_form_bodies() {
	let provider = MockServer::start_async().await;
	let mock = provider
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v4/token").body_includes("code=xyz");
			then.status(200).json_body(json!({ "access_token": "mobile" }));
		})
		.await;
	let app = app(&provider.base_url());
	let request = Request::post("/tokens")
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
		.body(Body::from("app_scope=MOBILE_NUMBER&auth_code=xyz"))
		.expect("Form request should build.");
	let response = send(&app, request).await;

	assert_eq!(response.status(), StatusCode::OK);

	mock.assert_async().await;
}

#[tokio::test]
async fn local_validation_errors_use_message_shape() {
	let app = app("https://api.example.com");
	let request = Request::post("/tokens").body(Body::empty()).expect("Request should build.");
	let response = send(&app, request).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(response.headers()[ERROR_SOURCE_HEADER], "local");
	assert_eq!(json_body(response).await, json!({ "message": "No app scope provided." }));
}

#[tokio::test]
async fn provider_errors_return_raw_body_with_header() {
	let provider = MockServer::start_async().await;
	let mock = provider
		.mock_async(|when, then| {
			when.method(POST).path("/RTC/v1/e911ids");
			then.status(401).json_body(json!({ "error": "invalid_token" }));
		})
		.await;
	let app = app(&provider.base_url());
	let response = send(
		&app,
		post_json(
			"/e911ids",
			json!({
				"token": "expired",
				"is_confirmed": "true",
				"address": {
					"first_name": "Ada",
					"last_name": "Lovelace",
					"house_number": "1",
					"street": "Main St",
					"city": "Dallas",
					"state": "TX",
					"zip": "75001",
				},
			}),
		),
	)
	.await;

	mock.assert_async().await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(response.headers()[ERROR_SOURCE_HEADER], "provider");
	assert_eq!(json_body(response).await, json!({ "error": "invalid_token" }));
}

#[tokio::test]
async fn refresh_route_reports_missing_token() {
	let app = app("https://api.example.com");
	let response = send(&app, post_json("/tokens/refresh", json!({}))).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await, json!({ "message": "No refresh token provided." }));
}

#[tokio::test]
async fn root_token_route_accepts_short_field_names() {
	let provider = MockServer::start_async().await;
	let mock = provider
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v4/token")
				.body_includes("scope=EMERGENCYSERVICES");
			then.status(200).json_body(json!({ "access_token": "e911" }));
		})
		.await;
	let app = app(&provider.base_url());
	let response = send(&app, post_json("/token", json!({ "scope": "E911" }))).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await, json!({ "access_token": "e911" }));

	mock.assert_async().await;
}

#[tokio::test]
async fn auth_redirects_to_consent_without_redirect_uri() {
	let app = app("https://api.example.com");
	let response = send(&app, get("/auth")).await;

	assert_eq!(response.status(), StatusCode::FOUND);
	assert_eq!(
		location(&response),
		format!(
			"https://api.example.com/oauth/v4/authorize?client_id={TEST_APP_KEY}&scope=WEBRTCMOBILE"
		)
	);

	let response = send(&app, get("/authurl")).await;

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn e911id_alias_forwards_to_provider() {
	let provider = MockServer::start_async().await;
	let mock = provider
		.mock_async(|when, then| {
			when.method(POST)
				.path("/RTC/v1/e911ids")
				.header("authorization", "Bearer e911-token");
			then.status(200).json_body(json!({ "e911Locations": { "addressIdentifier": "id-1" } }));
		})
		.await;
	let app = app(&provider.base_url());
	let response = send(
		&app,
		post_json(
			"/e911id",
			json!({
				"token": "e911-token",
				"is_confirmed": true,
				"address": {
					"first_name": "Ada",
					"last_name": "Lovelace",
					"house_number": "1",
					"street": "Main St",
					"city": "Dallas",
					"state": "TX",
					"zip": "75001",
				},
			}),
		),
	)
	.await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		json_body(response).await,
		json!({ "e911Locations": { "addressIdentifier": "id-1" } })
	);

	mock.assert_async().await;
}

#[tokio::test]
async fn refresh_route_returns_provider_tokens() {
	let provider = MockServer::start_async().await;
	let mock = provider
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v4/token")
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=rt-1");
			then.status(200).json_body(json!({ "access_token": "fresh", "refresh_token": "rt-2" }));
		})
		.await;
	let app = app(&provider.base_url());
	let response = send(&app, post_json("/tokens/refresh", json!({ "refresh_token": "rt-1" }))).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		json_body(response).await,
		json!({ "access_token": "fresh", "refresh_token": "rt-2" })
	);

	mock.assert_async().await;
}
