// crates.io
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

/// Installs the global subscriber: an [`EnvFilter`] built from `directives` and a compact fmt
/// layer.
///
/// `directives` is used as given; the CLI resolves `--log` over `RUST_LOG` before calling this.
pub fn init_tracing(directives: &str) -> Result<(), TryInitError> {
	tracing_subscriber::registry()
		.with(env_filter(directives))
		.with(fmt::layer().with_target(true).with_thread_ids(false).compact())
		.try_init()
}

fn env_filter(directives: &str) -> EnvFilter {
	EnvFilter::new(directives)
}
