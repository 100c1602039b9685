//! Token record model, lifecycle helpers, and builder.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Errors produced by [`TokenRecordBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenRecordBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Credential variant attached to a token record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TokenKind {
	/// Organization credential; carries no client-side key material.
	Organization,
	/// User credential; carries the key material returned by the identity endpoint for
	/// later client-side cryptographic operations. Both fields are opaque to the gateway.
	User {
		/// Encrypted private key returned alongside the access token.
		private_key: TokenSecret,
		/// Encrypted symmetric key returned alongside the access token.
		key: TokenSecret,
	},
}
impl TokenKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			TokenKind::Organization => "organization",
			TokenKind::User { .. } => "user",
		}
	}

	/// Returns `true` if the record carries user key material.
	pub const fn is_user(&self) -> bool {
		matches!(self, TokenKind::User { .. })
	}
}
impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// In-memory record describing the active authenticated session.
///
/// At most one record is live per gateway; a refresh replaces the record wholesale
/// instead of merging fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenRecord {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Credential variant and any key material attached to it.
	pub kind: TokenKind,
	/// Issued-at instant recorded when the identity response was received.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from issued_at plus the server-reported lifetime.
	pub expires_at: OffsetDateTime,
}
impl TokenRecord {
	/// Returns a builder for the provided credential variant.
	pub fn builder(kind: TokenKind) -> TokenRecordBuilder {
		TokenRecordBuilder::new(kind)
	}

	/// Returns `true` if the record has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant > self.expires_at
	}

	/// Returns `true` if the record is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Determines whether the record must be replaced before serving a request.
	///
	/// A zero `preemptive_window` reduces this to the plain expiry check; a positive
	/// window renews records whose remaining lifetime has shrunk below the window.
	pub fn should_refresh(&self, now: OffsetDateTime, preemptive_window: Duration) -> bool {
		if self.is_expired_at(now) {
			return true;
		}
		if preemptive_window.is_zero() || preemptive_window.is_negative() {
			return false;
		}

		self.expires_at - now <= preemptive_window
	}
}

/// Builder for [`TokenRecord`].
#[derive(Clone, Debug)]
pub struct TokenRecordBuilder {
	kind: TokenKind,
	access_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenRecordBuilder {
	fn new(kind: TokenKind) -> Self {
		Self { kind, access_token: None, issued_at: None, expires_at: None, expires_in: None }
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`TokenRecord`].
	pub fn build(self) -> Result<TokenRecord, TokenRecordBuilderError> {
		let access_token = self.access_token.ok_or(TokenRecordBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(TokenRecordBuilderError::MissingExpiry),
		};

		Ok(TokenRecord { access_token, kind: self.kind, issued_at, expires_at })
	}
}
