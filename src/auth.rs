//! Auth-domain identifiers, app scopes, grant types, and secret wrappers.

pub mod grant;
pub mod id;
pub mod scope;
pub mod secret;

pub use grant::*;
pub use id::*;
pub use scope::*;
pub use secret::*;
