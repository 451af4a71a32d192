//! User-consent URL construction for `MOBILE_NUMBER` subscribers.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::ConsentState,
	flows::Dhs,
	http::ProviderHttpClient,
	obs::{FlowKind, FlowSpan},
	provider::TransportErrorMapper,
};

impl<C, M> Dhs<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns the provider's consent page URL for this app.
	///
	/// No network call is made. Fails with [`Error::NotConfigured`] before `configure`.
	pub fn user_consent_url(&self) -> Result<String> {
		let _span = FlowSpan::new(FlowKind::UserConsent, "user_consent_url").entered();
		let url = self.config()?.user_consent_url();

		Ok(url)
	}

	/// Returns [`Dhs::user_consent_url`] with `state` appended so the callback can be matched to
	/// its pending flow.
	pub fn consent_url_with_state(&self, state: &ConsentState) -> Result<String> {
		let url = self.user_consent_url()?;
		let state = form_urlencoded::byte_serialize(state.as_bytes()).collect::<String>();

		Ok(format!("{url}&state={state}"))
	}
}
