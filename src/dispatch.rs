//! Resource-request construction and the rate-limit retry engine's data model.

// crates.io
use reqwest::Method;
// self
use crate::{_prelude::*, error::ConfigError};

/// Header carrying the subscription key on every resource request.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Typed list payload conventionally returned by collection endpoints as
/// `{ "data": [...] }`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListResponse<T> {
	/// Items wrapped by the vendor's `data` envelope.
	pub data: Vec<T>,
}

/// Structured error body returned by resource endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiErrorBody {
	/// Human-readable failure detail.
	#[serde(default)]
	pub detail: Option<String>,
}

/// Parameters for a single resource-endpoint call.
///
/// The endpoint is joined onto the gateway's base URL and therefore must not start
/// with `/`; a filter query is appended after `?` and must not supply its own
/// delimiter. Both contracts are validated before the first attempt.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method for the call.
	pub method: Method,
	/// Endpoint path relative to the base URL.
	pub endpoint: String,
	/// Optional filter query appended after `?`.
	pub filter_query: Option<String>,
	/// Optional JSON body attached verbatim.
	pub body: Option<serde_json::Value>,
}
impl ApiRequest {
	/// Creates a request for the provided method and endpoint.
	pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
		Self { method, endpoint: endpoint.into(), filter_query: None, body: None }
	}

	/// Creates a GET request.
	pub fn get(endpoint: impl Into<String>) -> Self {
		Self::new(Method::GET, endpoint)
	}

	/// Creates a POST request.
	pub fn post(endpoint: impl Into<String>) -> Self {
		Self::new(Method::POST, endpoint)
	}

	/// Creates a PATCH request.
	pub fn patch(endpoint: impl Into<String>) -> Self {
		Self::new(Method::PATCH, endpoint)
	}

	/// Creates a DELETE request.
	pub fn delete(endpoint: impl Into<String>) -> Self {
		Self::new(Method::DELETE, endpoint)
	}

	/// Attaches a filter query.
	pub fn with_filter_query(mut self, filter: impl Into<String>) -> Self {
		self.filter_query = Some(filter.into());

		self
	}

	/// Attaches a JSON body.
	pub fn with_body(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Validates the caller contract and resolves the final request URI.
	pub(crate) fn resolve_uri(&self, base_url: &Url) -> Result<Url, ConfigError> {
		if self.endpoint.starts_with('/') {
			return Err(ConfigError::LeadingSlashEndpoint { endpoint: self.endpoint.clone() });
		}
		if let Some(filter) = self.filter_query.as_deref()
			&& filter.starts_with('?')
		{
			return Err(ConfigError::LeadingQueryDelimiter { filter: filter.to_owned() });
		}

		let mut raw = format!("{}/{}", base_url.as_str().trim_end_matches('/'), self.endpoint);

		if let Some(filter) = self.filter_query.as_deref() {
			raw.push('?');
			raw.push_str(filter);
		}

		Url::parse(&raw).map_err(|source| ConfigError::InvalidRequestUri {
			endpoint: self.endpoint.clone(),
			source,
		})
	}
}

/// Verdict emitted by a single dispatch attempt.
#[derive(Debug)]
pub(crate) enum AttemptVerdict {
	/// 2xx response; carries the parsed body when one was present.
	Success(Option<serde_json::Value>),
	/// 429 response; the caller consults the retry budget before sleeping.
	RateLimited {
		/// Base delay hinted by the response, when one was present.
		hint: Option<Duration>,
		/// Message kept for budget-exhausted reporting.
		message: String,
	},
	/// Terminal failure; surfaced without retrying.
	Failed(Error),
}

/// Computes the exponential-backoff wait for the provided retry attempt.
///
/// The wait doubles per attempt relative to the base delay: `base × 2^(attempt − 1)`,
/// keyed off the current retry counter rather than a fixed base, so a server-provided
/// hint on a later attempt still escalates.
pub(crate) fn backoff_delay(base: Duration, attempt: u32) -> Duration {
	let exponent = attempt.saturating_sub(1);
	let Some(factor) = 2_i32.checked_pow(exponent) else {
		return Duration::MAX;
	};

	base.checked_mul(factor).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base_url() -> Url {
		Url::parse("https://api.bitwarden.com").expect("Base URL fixture should parse.")
	}

	#[test]
	fn resolve_uri_joins_endpoint_and_filter() {
		let uri = ApiRequest::get("public/members")
			.with_filter_query("limit=10")
			.resolve_uri(&base_url())
			.expect("Relative endpoints should resolve.");

		assert_eq!(uri.as_str(), "https://api.bitwarden.com/public/members?limit=10");
	}

	#[test]
	fn resolve_uri_rejects_boundary_violations() {
		let err = ApiRequest::get("/public/members")
			.resolve_uri(&base_url())
			.expect_err("Leading slashes should be rejected.");

		assert!(matches!(err, ConfigError::LeadingSlashEndpoint { .. }));

		let err = ApiRequest::get("public/members")
			.with_filter_query("?limit=10")
			.resolve_uri(&base_url())
			.expect_err("Leading query delimiters should be rejected.");

		assert!(matches!(err, ConfigError::LeadingQueryDelimiter { .. }));
	}

	#[test]
	fn backoff_doubles_per_attempt() {
		let base = Duration::seconds(3);

		assert_eq!(backoff_delay(base, 1), Duration::seconds(3));
		assert_eq!(backoff_delay(base, 2), Duration::seconds(6));
		assert_eq!(backoff_delay(base, 3), Duration::seconds(12));
		assert_eq!(backoff_delay(Duration::seconds(5), 2), Duration::seconds(10));
	}

	#[test]
	fn backoff_saturates_instead_of_overflowing() {
		assert_eq!(backoff_delay(Duration::seconds(3), 64), Duration::MAX);
	}

	#[test]
	fn list_response_unwraps_data_envelope() {
		#[derive(Debug, PartialEq, Eq, serde::Deserialize)]
		struct Member {
			id: String,
		}

		let parsed: ListResponse<Member> =
			serde_json::from_str(r#"{"data":[{"id":"m1"},{"id":"m2"}]}"#)
				.expect("List envelope should deserialize.");

		assert_eq!(parsed.data, [Member { id: "m1".into() }, Member { id: "m2".into() }]);
	}

	#[test]
	fn api_error_body_tolerates_missing_detail() {
		let parsed: ApiErrorBody =
			serde_json::from_str("{}").expect("Empty error bodies should deserialize.");

		assert!(parsed.detail.is_none());
	}
}
