//! Browser-facing HTTP surface built on axum.
//!
//! | Route                  | Operation                               |
//! |------------------------|-----------------------------------------|
//! | `GET /config`          | public environment values               |
//! | `GET /oauth/authorize` | 302 to the consent page                 |
//! | `GET /oauth/authurl`   | consent page URL as `text/plain`        |
//! | `GET /authurl`         | alias of `GET /oauth/authurl`           |
//! | `GET /auth`            | 302 to consent, `redirect_uri` optional |
//! | `GET /oauth/callback`  | 302 back to the captured `redirect_uri` |
//! | `POST /tokens`         | [`Dhs::create_access_token`]            |
//! | `POST /oauth/token`    | alias of `POST /tokens`                 |
//! | `POST /token`          | alias of `POST /tokens`                 |
//! | `POST /tokens/refresh` | [`Dhs::refresh_access_token`]           |
//! | `POST /e911ids`        | [`Dhs::create_e911_id`]                 |
//! | `POST /e911id`         | alias of `POST /e911ids`                |
//!
//! Every failure answers HTTP 400; see [`ApiError`] for the body shapes.
//!
//! [`Dhs::create_access_token`]: crate::flows::Dhs::create_access_token
//! [`Dhs::refresh_access_token`]: crate::flows::Dhs::refresh_access_token
//! [`Dhs::create_e911_id`]: crate::flows::Dhs::create_e911_id

mod error;
mod routes;

pub use error::*;

// crates.io
use axum::{
	Router,
	http::{HeaderValue, Method, header},
	routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};
// self
use crate::{
	_prelude::*,
	flows::ReqwestDhs,
	store::{ConsentStore, MemoryConsentStore},
};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
	/// Configured DHS facade.
	pub dhs: Arc<ReqwestDhs>,
	/// Pending consent flows keyed by OAuth `state`.
	pub consent: Arc<dyn ConsentStore>,
	/// Lifetime of a pending consent flow.
	pub consent_ttl: Duration,
}
impl AppState {
	const DEFAULT_CONSENT_TTL: Duration = Duration::minutes(10);

	/// Creates state around `dhs` with an in-memory consent store.
	pub fn new(dhs: impl Into<Arc<ReqwestDhs>>) -> Self {
		Self {
			dhs: dhs.into(),
			consent: Arc::new(MemoryConsentStore::default()),
			consent_ttl: Self::DEFAULT_CONSENT_TTL,
		}
	}

	/// Replaces the consent store.
	pub fn with_consent_store(mut self, store: Arc<dyn ConsentStore>) -> Self {
		self.consent = store;

		self
	}

	/// Overrides the pending consent lifetime.
	pub fn with_consent_ttl(mut self, ttl: Duration) -> Self {
		self.consent_ttl = ttl;

		self
	}
}
impl Debug for AppState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppState")
			.field("dhs", &self.dhs)
			.field("consent_ttl", &self.consent_ttl)
			.finish()
	}
}

/// Builds the DHS router with HTTP tracing attached.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/config", get(routes::config))
		.route("/oauth/authorize", get(routes::authorize))
		.route("/oauth/authurl", get(routes::authorize_url))
		.route("/oauth/callback", get(routes::callback))
		.route("/auth", get(routes::consent_redirect))
		.route("/authurl", get(routes::authorize_url))
		.route("/oauth/token", post(routes::create_token))
		.route("/token", post(routes::create_token))
		.route("/tokens", post(routes::create_token))
		.route("/tokens/refresh", post(routes::refresh_token))
		.route("/e911ids", post(routes::create_e911_id))
		.route("/e911id", post(routes::create_e911_id))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
}

/// Builds a CORS layer for `origins`; `*` allows any origin.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
	let layer = CorsLayer::new()
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
		.expose_headers([header::HeaderName::from_static(ERROR_SOURCE_HEADER)]);

	if origins.iter().any(|origin| origin == "*") {
		return layer.allow_origin(Any);
	}

	let allowed = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(e) => {
				tracing::warn!(origin = %origin, error = %e, "Skipping invalid CORS origin.");

				None
			},
		})
		.collect::<Vec<_>>();

	layer.allow_origin(AllowOrigin::list(allowed))
}

/// Serves `app` on `listener` until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
	if let Ok(addr) = listener.local_addr() {
		tracing::info!(%addr, "DHS listening.");
	}

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	tracing::info!("DHS stopped.");

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "Unable to listen for Ctrl-C.");

			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::error!(error = %e, "Unable to listen for SIGTERM.");

				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("Shutdown signal received.");
}
