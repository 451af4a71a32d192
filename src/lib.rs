//! Delegated hosting server for WebRTC apps: keep the app secret on the server, mint OAuth access
//! tokens and E911 identifiers on behalf of browser clients, and expose them over a tiny HTTP
//! surface.

#![deny(clippy::all, missing_docs)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
#[cfg(feature = "reqwest")] pub mod server;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{config::DhsConfigBuilder, flows::ReqwestDhs};

	/// Application key used by integration tests.
	pub const TEST_APP_KEY: &str = "thirtytwocharacterapplicationkey";
	/// Application secret used by integration tests.
	pub const TEST_APP_SECRET: &str = "32_characters_application_secret";

	/// Returns a builder pointing at `api_endpoint` with the test key/secret pair.
	pub fn test_config_builder(api_endpoint: &str) -> DhsConfigBuilder {
		DhsConfigBuilder::new()
			.app_key(TEST_APP_KEY)
			.app_secret(TEST_APP_SECRET)
			.api_endpoint(api_endpoint)
			.token_path("/oauth/v4/token")
			.authorize_path("/oauth/v4/authorize")
			.e911_path("/RTC/v1/e911ids")
	}

	/// Constructs a reqwest-backed [`ReqwestDhs`] configured against `api_endpoint`.
	pub fn build_reqwest_test_dhs(api_endpoint: &str) -> ReqwestDhs {
		let config = test_config_builder(api_endpoint)
			.build()
			.expect("Test configuration should be valid.");

		ReqwestDhs::with_config(config)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{Arc, OnceLock},
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
