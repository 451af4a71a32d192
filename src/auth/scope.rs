//! Application scopes and their OAuth grant/scope resolution.
//!
//! Each [`AppScope`] names a use case of the WebRTC SDK. The resolver maps it onto the OAuth
//! grant type and provider scope string used at the token endpoint:
//!
//! | scope            | grant                | oauth scope         |
//! |------------------|----------------------|---------------------|
//! | `MOBILE_NUMBER`  | `authorization_code` | `WEBRTCMOBILE`      |
//! | `VIRTUAL_NUMBER` | `client_credentials` | `WEBRTC`            |
//! | `ACCOUNT_ID`     | `client_credentials` | `WEBRTC`            |
//! | `E911`           | `client_credentials` | `EMERGENCYSERVICES` |
//! | `REFRESH`        | `refresh_token`      | none                |

// self
use crate::{_prelude::*, auth::GrantType};

/// Error emitted when parsing an unknown scope name.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown app scope: {scope}.")]
pub struct ScopeParseError {
	/// The offending scope string.
	pub scope: String,
}

/// Application scope requested by a browser client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppScope {
	/// AT&T mobile subscriber; requires user consent.
	MobileNumber,
	/// Virtual number drawn from the app's pool.
	VirtualNumber,
	/// Account ID user of the app's own domain.
	AccountId,
	/// Token used to create E911 identifiers.
	E911,
	/// Refresh of a previously consented token.
	Refresh,
}
impl AppScope {
	/// Every scope, in declaration order.
	pub const ALL: [AppScope; 5] = [
		AppScope::MobileNumber,
		AppScope::VirtualNumber,
		AppScope::AccountId,
		AppScope::E911,
		AppScope::Refresh,
	];

	/// Returns the wire name of the scope.
	pub const fn as_str(self) -> &'static str {
		match self {
			AppScope::MobileNumber => "MOBILE_NUMBER",
			AppScope::VirtualNumber => "VIRTUAL_NUMBER",
			AppScope::AccountId => "ACCOUNT_ID",
			AppScope::E911 => "E911",
			AppScope::Refresh => "REFRESH",
		}
	}

	/// OAuth grant type used to mint a token for this scope.
	pub const fn grant_type(self) -> GrantType {
		match self {
			AppScope::MobileNumber => GrantType::AuthorizationCode,
			AppScope::VirtualNumber | AppScope::AccountId | AppScope::E911 =>
				GrantType::ClientCredentials,
			AppScope::Refresh => GrantType::RefreshToken,
		}
	}

	/// Provider scope string sent in the token request, if the scope defines one.
	pub const fn oauth_scope(self) -> Option<&'static str> {
		match self {
			AppScope::MobileNumber => Some("WEBRTCMOBILE"),
			AppScope::VirtualNumber | AppScope::AccountId => Some("WEBRTC"),
			AppScope::E911 => Some("EMERGENCYSERVICES"),
			AppScope::Refresh => None,
		}
	}

	/// Returns true when the scope may be requested through the access-token entry point.
	pub const fn is_requestable(self) -> bool {
		!matches!(self, AppScope::Refresh)
	}

	/// Returns true when the token request must carry a consent authorization code.
	pub const fn requires_auth_code(self) -> bool {
		matches!(self, AppScope::MobileNumber)
	}
}
impl Display for AppScope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for AppScope {
	type Err = ScopeParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|scope| scope.as_str() == s)
			.ok_or_else(|| ScopeParseError { scope: s.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn resolver_table_holds_for_every_scope() {
		let table = AppScope::ALL.map(|scope| (scope.grant_type(), scope.oauth_scope()));

		assert_eq!(
			table,
			[
				(GrantType::AuthorizationCode, Some("WEBRTCMOBILE")),
				(GrantType::ClientCredentials, Some("WEBRTC")),
				(GrantType::ClientCredentials, Some("WEBRTC")),
				(GrantType::ClientCredentials, Some("EMERGENCYSERVICES")),
				(GrantType::RefreshToken, None),
			]
		);
	}

	#[test]
	fn parsing_is_exact_and_case_sensitive() {
		for scope in AppScope::ALL {
			assert_eq!(scope.as_str().parse::<AppScope>(), Ok(scope));
		}

		assert!("e911".parse::<AppScope>().is_err());
		assert!("MOBILE".parse::<AppScope>().is_err());
	}

	#[test]
	fn only_refresh_is_not_requestable() {
		assert!(!AppScope::Refresh.is_requestable());
		assert!(AppScope::ALL.iter().filter(|scope| scope.is_requestable()).count() == 4);
		assert!(AppScope::MobileNumber.requires_auth_code());
		assert!(!AppScope::E911.requires_auth_code());
	}

	#[test]
	fn serde_matches_wire_names() {
		let scope: AppScope =
			serde_json::from_str("\"VIRTUAL_NUMBER\"").expect("Scope should deserialize.");

		assert_eq!(scope, AppScope::VirtualNumber);
		assert_eq!(
			serde_json::to_string(&AppScope::E911).expect("Scope should serialize."),
			"\"E911\""
		);
	}
}
