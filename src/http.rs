//! Transport primitives shared by the authentication and dispatch flows.

// std
use std::ops::Deref;
// crates.io
use reqwest::{
	header::{HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::ConfigError};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Both the identity endpoint and the resource endpoints return results directly
/// instead of delegating to another URI, so redirect following stays disabled on the
/// bundled client. Configure any custom [`ReqwestClient`] the same way.
#[derive(Clone, Debug)]
pub struct GatewayHttpClient(ReqwestClient);
impl GatewayHttpClient {
	/// Builds the crate's default client with redirect following disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for GatewayHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for GatewayHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Decodes a JSON payload while preserving the path to any shape mismatch.
pub(crate) fn decode_json<T>(bytes: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer).map_err(Error::Decode)
}

/// Scans a structured error detail for the vendor's `Try again in N seconds` phrasing.
pub(crate) fn parse_retry_hint(detail: &str) -> Option<Duration> {
	const MARKER: &str = "Try again in ";

	let rest = &detail[detail.find(MARKER)? + MARKER.len()..];
	let digits: &str = {
		let end = rest.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(rest.len());

		&rest[..end]
	};
	let secs = digits.parse::<i64>().ok()?;

	rest[digits.len()..].trim_start().starts_with("second").then(|| Duration::seconds(secs))
}

/// Parses a `Retry-After` response header into a relative duration.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;

	#[test]
	fn retry_hint_parses_vendor_phrasing() {
		let detail = "Slow down! Too many requests. Try again in 5 seconds.";

		assert_eq!(parse_retry_hint(detail), Some(Duration::seconds(5)));
		assert_eq!(parse_retry_hint("Try again in 1 second."), Some(Duration::seconds(1)));
	}

	#[test]
	fn retry_hint_rejects_other_phrasings() {
		assert_eq!(parse_retry_hint("Too many requests."), None);
		assert_eq!(parse_retry_hint("Try again in a few seconds."), None);
		assert_eq!(parse_retry_hint("Try again in 5 minutes."), None);
	}

	#[test]
	fn retry_after_header_parses_integer_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(7)));
	}

	#[test]
	fn retry_after_header_ignores_garbage() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn decode_json_reports_mismatch_path() {
		#[derive(Debug, serde::Deserialize)]
		struct Probe {
			#[allow(dead_code)]
			access_token: String,
		}

		let err = decode_json::<Probe>(br#"{"access_token":42}"#)
			.expect_err("Numeric tokens should fail to decode.");

		assert!(
			err.to_string().contains("access_token"),
			"Decode errors should point at the failing path."
		);
	}
}
