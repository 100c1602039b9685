//! Client-credential material used to establish and renew sessions.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// OAuth2 client-credentials pair plus the identity endpoint it authenticates against.
///
/// The gateway keeps these alongside the live token record so expired sessions can be
/// renewed without caller involvement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientCredentials {
	/// OAuth2 client identifier.
	pub client_id: String,
	/// OAuth2 client secret; redacted in Debug output.
	pub client_secret: TokenSecret,
	/// Identity token endpoint receiving the form-encoded grant request.
	pub token_endpoint: Url,
	/// Scope requested during the client-credentials grant.
	pub scope: String,
}
impl ClientCredentials {
	/// Scope requested when the caller does not override it.
	pub const DEFAULT_SCOPE: &'static str = "api.organization";

	/// Creates credentials with the default scope.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		token_endpoint: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			token_endpoint,
			scope: Self::DEFAULT_SCOPE.into(),
		}
	}

	/// Overrides the requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}
}
