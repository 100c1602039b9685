//! Client-credentials exchange against the vendor's identity endpoint.
//!
//! The module owns the wire shapes for the token endpoint and the classification of
//! responses into session records. Credential variants are discriminated by the
//! response shape itself: key material present means a user credential, absent means
//! an organization credential, and a partial shape is surfaced raw as
//! [`AuthOutcome::Unrecognized`] without touching session state.

// crates.io
use uuid::Uuid;
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenKind, TokenRecord},
	error::ConfigError,
	http::{self, GatewayHttpClient},
};

/// Device-type code identifying non-interactive SDK clients to the identity endpoint.
pub const DEVICE_TYPE_SDK: &str = "21";

/// Raw identity response handed back when the token shape is not recognized.
pub type RawTokenResponse = serde_json::Value;

/// Wire shape consumed from the identity token endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct IdentityTokenResponse {
	/// Bearer token issued for the session.
	pub access_token: String,
	/// Token lifetime in seconds.
	pub expires_in: i64,
	/// Token type reported by the endpoint; informational only.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Encrypted private key, returned for user credentials only.
	#[serde(default)]
	pub private_key: Option<String>,
	/// Encrypted symmetric key, returned for user credentials only.
	#[serde(default)]
	pub key: Option<String>,
}

/// Outcome of a client-credentials exchange.
#[derive(Clone, Debug)]
pub enum AuthOutcome {
	/// The response matched a known credential shape and a session record was built.
	Session(TokenRecord),
	/// The response shape was not recognized; no session state was stored.
	Unrecognized(RawTokenResponse),
}

/// Performs the client-credentials grant against the credentials' token endpoint.
///
/// Every call sends a fresh random device identifier so the identity endpoint can
/// track grants individually; the device type is fixed to the non-interactive SDK
/// code. Transport failures and non-success statuses are both fatal for the calling
/// operation and surface as [`Error::Connection`].
pub(crate) async fn request_token(
	http_client: &GatewayHttpClient,
	credentials: &ClientCredentials,
	device_name: &str,
) -> Result<AuthOutcome> {
	let device_identifier = Uuid::new_v4().to_string();
	let form = [
		("grant_type", "client_credentials"),
		("scope", credentials.scope.as_str()),
		("client_id", credentials.client_id.as_str()),
		("client_secret", credentials.client_secret.expose()),
		("deviceIdentifier", device_identifier.as_str()),
		("deviceName", device_name),
		("deviceType", DEVICE_TYPE_SDK),
	];
	let response = http_client
		.post(credentials.token_endpoint.clone())
		.form(&form)
		.send()
		.await
		.map_err(|err| Error::connection(format!("token request failed: {err}"), err))?;
	let status = response.status();
	let bytes = response
		.bytes()
		.await
		.map_err(|err| Error::connection(format!("token response read failed: {err}"), err))?;

	if !status.is_success() {
		let preview = String::from_utf8_lossy(&bytes);

		return Err(Error::connection_message(format!(
			"identity endpoint returned HTTP {}: {}",
			status.as_u16(),
			preview.trim(),
		)));
	}

	let raw: RawTokenResponse = http::decode_json(&bytes)?;
	let parsed: IdentityTokenResponse =
		serde_path_to_error::deserialize(raw.clone()).map_err(Error::Decode)?;

	classify(parsed, raw, OffsetDateTime::now_utc())
}

/// Builds a session record from a recognized response shape, or hands the raw payload
/// back for the unrecognized case.
fn classify(
	parsed: IdentityTokenResponse,
	raw: RawTokenResponse,
	issued_at: OffsetDateTime,
) -> Result<AuthOutcome> {
	let kind = match (parsed.private_key, parsed.key) {
		(Some(private_key), Some(key)) =>
			TokenKind::User { private_key: private_key.into(), key: key.into() },
		(None, None) => TokenKind::Organization,
		_ => return Ok(AuthOutcome::Unrecognized(raw)),
	};
	let record = TokenRecord::builder(kind)
		.access_token(parsed.access_token)
		.issued_at(issued_at)
		.expires_in(Duration::seconds(parsed.expires_in))
		.build()
		.map_err(ConfigError::from)?;

	Ok(AuthOutcome::Session(record))
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;

	fn parse(value: &serde_json::Value) -> IdentityTokenResponse {
		serde_json::from_value(value.clone()).expect("Identity fixture should deserialize.")
	}

	#[test]
	fn organization_shape_builds_record_without_key_material() {
		let raw = json!({ "access_token": "org-token", "expires_in": 3600 });
		let issued = macros::datetime!(2025-06-01 12:00 UTC);
		let outcome = classify(parse(&raw), raw, issued)
			.expect("Organization shapes should classify successfully.");
		let AuthOutcome::Session(record) = outcome else {
			panic!("Organization shapes should produce a session record.");
		};

		assert!(!record.kind.is_user());
		assert_eq!(record.access_token.expose(), "org-token");
		assert_eq!(record.expires_at, issued + Duration::seconds(3600));
	}

	#[test]
	fn user_shape_carries_key_material() {
		let raw = json!({
			"access_token": "user-token",
			"expires_in": 1800,
			"private_key": "2.private",
			"key": "2.symmetric",
		});
		let issued = macros::datetime!(2025-06-01 12:00 UTC);
		let outcome =
			classify(parse(&raw), raw, issued).expect("User shapes should classify successfully.");
		let AuthOutcome::Session(record) = outcome else {
			panic!("User shapes should produce a session record.");
		};
		let TokenKind::User { private_key, key } = &record.kind else {
			panic!("User shapes should carry key material.");
		};

		assert_eq!(private_key.expose(), "2.private");
		assert_eq!(key.expose(), "2.symmetric");
	}

	#[test]
	fn partial_key_material_is_unrecognized() {
		let raw = json!({
			"access_token": "odd-token",
			"expires_in": 600,
			"private_key": "2.private",
		});
		let outcome = classify(parse(&raw), raw.clone(), OffsetDateTime::now_utc())
			.expect("Partial shapes should classify without error.");
		let AuthOutcome::Unrecognized(payload) = outcome else {
			panic!("Partial key material should be handed back raw.");
		};

		assert_eq!(payload, raw);
	}

	#[test]
	fn expiry_matches_reported_lifetime() {
		let raw = json!({ "access_token": "t", "expires_in": 7200 });
		let issued = macros::datetime!(2025-06-01 00:00 UTC);
		let AuthOutcome::Session(record) =
			classify(parse(&raw), raw, issued).expect("Fixture should classify.")
		else {
			panic!("Fixture should produce a session record.");
		};

		assert_eq!(record.expires_at - record.issued_at, Duration::seconds(7200));
	}
}
