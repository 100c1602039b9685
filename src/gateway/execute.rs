//! Rate-limit-aware dispatch flow.
//!
//! Each attempt resolves to an explicit [`AttemptVerdict`] instead of driving retries
//! through error propagation: success returns the parsed body, a 429 yields a
//! rate-limit verdict the bounded loop converts into a backoff sleep, and everything
//! else is terminal. Token validity is re-checked per attempt, so a record expiring
//! mid-backoff is renewed before the next try.

// crates.io
use reqwest::{StatusCode, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	dispatch::{self, ApiErrorBody, ApiRequest, AttemptVerdict, SUBSCRIPTION_KEY_HEADER},
	error::ConfigError,
	gateway::Gateway,
	http,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Gateway {
	/// Dispatches an authenticated request, retrying rate-limited attempts with
	/// exponential backoff.
	///
	/// Returns the parsed JSON body, or `None` for commands whose responses carry no
	/// content. Requires an established session; see [`Gateway::authenticate`].
	pub async fn execute(&self, request: ApiRequest) -> Result<Option<serde_json::Value>> {
		const KIND: FlowKind = FlowKind::Dispatch;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.execute_with_retries(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Convenience wrapper that decodes the response body into `T`.
	///
	/// Responses with no content decode as JSON `null`, so endpoints that may answer
	/// empty should pick a `T` that tolerates it.
	pub async fn execute_decoded<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: serde::de::DeserializeOwned,
	{
		let value = self.execute(request).await?.unwrap_or(serde_json::Value::Null);

		serde_path_to_error::deserialize(value).map_err(Error::Decode)
	}

	async fn execute_with_retries(&self, request: ApiRequest) -> Result<Option<serde_json::Value>> {
		self.metrics.record_attempt();

		let uri = request.resolve_uri(&self.config.base_url)?;
		let policy = self.config.retry;
		let mut retries = 0_u32;

		loop {
			let token = self.valid_token().await.inspect_err(|_| {
				self.metrics.record_failure();
			})?;

			match self.attempt(&request, uri.clone(), &token).await {
				AttemptVerdict::Success(value) => {
					self.metrics.record_success();

					return Ok(value);
				},
				AttemptVerdict::RateLimited { hint, message } => {
					retries += 1;

					if retries > policy.max_retries {
						self.metrics.record_failure();

						return Err(Error::RateLimit { retries: policy.max_retries, message });
					}

					let base = hint.unwrap_or(policy.initial_delay);
					let wait = dispatch::backoff_delay(base, retries);

					self.metrics.record_rate_limit_wait();
					obs::record_dispatch_retry(retries);
					sleep_for(wait).await;
				},
				AttemptVerdict::Failed(err) => {
					self.metrics.record_failure();

					return Err(err);
				},
			}
		}
	}

	async fn attempt(&self, request: &ApiRequest, uri: Url, token: &TokenRecord) -> AttemptVerdict {
		let subscription_key = self.config.subscription_key.as_deref().unwrap_or_default();
		let mut builder = self
			.http_client
			.request(request.method.clone(), uri)
			.bearer_auth(token.access_token.expose())
			.header(SUBSCRIPTION_KEY_HEADER, subscription_key)
			.header(CONTENT_TYPE, "application/json");

		if let Some(body) = &request.body {
			let bytes = match serde_json::to_vec(body) {
				Ok(bytes) => bytes,
				Err(err) => return AttemptVerdict::Failed(ConfigError::from(err).into()),
			};

			builder = builder.body(bytes);
		}

		let response = match builder.send().await {
			Ok(response) => response,
			Err(err) => return AttemptVerdict::Failed(err.into()),
		};
		let status = response.status();
		let headers = response.headers().to_owned();
		let bytes = match response.bytes().await {
			Ok(bytes) => bytes,
			Err(err) => return AttemptVerdict::Failed(err.into()),
		};

		if status == StatusCode::TOO_MANY_REQUESTS {
			let detail = error_detail(&bytes);
			let hint = detail
				.as_deref()
				.and_then(http::parse_retry_hint)
				.or_else(|| http::parse_retry_after(&headers));
			let message = detail.unwrap_or_else(|| error_message(status, &bytes));

			return AttemptVerdict::RateLimited { hint, message };
		}
		if !status.is_success() {
			let message = error_message(status, &bytes);

			return AttemptVerdict::Failed(Error::Api { status: status.as_u16(), message });
		}
		if bytes.is_empty() {
			return AttemptVerdict::Success(None);
		}

		match http::decode_json(&bytes) {
			Ok(value) => AttemptVerdict::Success(Some(value)),
			Err(err) => AttemptVerdict::Failed(err),
		}
	}
}

/// Extracts the structured `detail` field from an error body, when one is present.
fn error_detail(bytes: &[u8]) -> Option<String> {
	serde_json::from_slice::<ApiErrorBody>(bytes).ok().and_then(|body| body.detail)
}

/// Builds the error message for a non-success response: the structured detail when the
/// body carries one, else the raw response text, else the canonical status reason.
fn error_message(status: StatusCode, bytes: &[u8]) -> String {
	if let Some(detail) = error_detail(bytes) {
		return detail;
	}

	let raw = String::from_utf8_lossy(bytes);
	let trimmed = raw.trim();

	if !trimmed.is_empty() {
		return trimmed.to_owned();
	}

	status.canonical_reason().unwrap_or("unknown error").to_owned()
}

/// Blocks the calling task for the computed backoff wait.
async fn sleep_for(wait: Duration) {
	if wait.is_positive() {
		tokio::time::sleep(wait.unsigned_abs()).await;
	}
}
