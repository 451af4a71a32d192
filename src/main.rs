//! `webrtc-dhs` binary: load settings, configure the DHS, and serve the browser-facing routes.

// std
use std::sync::Arc;
// crates.io
use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use tokio::net::TcpListener;
// self
use webrtc_dhs::{
	cli::Cli,
	flows::Dhs,
	http::ReqwestHttpClient,
	obs,
	provider::ReqwestTransportErrorMapper,
	server::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();

	obs::init_tracing(&cli.log)?;

	let settings = cli.settings()?;
	let http_client = ReqwestHttpClient::with_timeout(settings.server.request_timeout())?;
	let dhs = <Dhs<ReqwestHttpClient, ReqwestTransportErrorMapper>>::with_http_client(
		http_client,
		ReqwestTransportErrorMapper,
	);

	dhs.configure(settings.dhs.clone())
		.map_err(|e| eyre!("Unable to configure the DHS: {e}"))?;

	let state =
		AppState::new(Arc::new(dhs)).with_consent_ttl(settings.server.consent_ttl());
	let app = server::router(state).layer(server::cors_layer(&settings.server.cors_origins));
	let listener = TcpListener::bind(settings.server.bind).await?;

	server::serve(listener, app).await?;

	Ok(())
}
