//! Gateway configuration data structures and builder.

// self
use crate::_prelude::*;

/// Errors raised while constructing or validating gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum GatewayConfigError {
	/// The base URL failed to parse.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Device names are sent with every grant request and cannot be blank.
	#[error("Device name cannot be empty.")]
	EmptyDeviceName,
	/// A non-positive initial delay would collapse the backoff schedule.
	#[error("Initial retry delay must be positive.")]
	NonPositiveInitialDelay,
	/// Preemptive windows are subtracted from the expiry instant and cannot be negative.
	#[error("Preemptive refresh window cannot be negative.")]
	NegativePreemptiveWindow,
}

/// Retry policy applied when resource endpoints answer with HTTP 429.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
	/// Number of retries performed before the rate-limit failure surfaces.
	pub max_retries: u32,
	/// Base delay for the first retry when the response carries no hint.
	pub initial_delay: Duration,
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_retries: 3, initial_delay: Duration::seconds(3) }
	}
}

/// Immutable gateway configuration consumed by the session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
	/// Base URL that resource endpoints are joined onto.
	pub base_url: Url,
	/// Device name reported to the identity endpoint with every grant request.
	pub device_name: String,
	/// Subscription key forwarded with every resource request; sent empty when unset.
	pub subscription_key: Option<String>,
	/// Retry policy for rate-limited dispatch attempts.
	pub retry: RetryPolicy,
	/// Window before expiry in which the record is renewed early; zero disables it.
	pub preemptive_window: Duration,
}
impl GatewayConfig {
	/// Base URL used when the caller does not override it.
	pub const DEFAULT_BASE_URL: &'static str = "https://api.bitwarden.com";
	/// Device name used when the caller does not override it.
	pub const DEFAULT_DEVICE_NAME: &'static str = "secrets-gateway";

	/// Creates a new builder seeded with production defaults.
	pub fn builder() -> GatewayConfigBuilder {
		GatewayConfigBuilder::new()
	}
}

/// Builder for [`GatewayConfig`] values.
#[derive(Clone, Debug, Default)]
pub struct GatewayConfigBuilder {
	/// Optional base URL override.
	pub base_url: Option<Url>,
	/// Optional device name override.
	pub device_name: Option<String>,
	/// Optional subscription key.
	pub subscription_key: Option<String>,
	/// Optional retry policy override.
	pub retry: Option<RetryPolicy>,
	/// Optional preemptive refresh window override.
	pub preemptive_window: Option<Duration>,
}
impl GatewayConfigBuilder {
	fn new() -> Self {
		Self::default()
	}

	/// Sets the base URL for resource endpoints.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the device name reported during authentication.
	pub fn device_name(mut self, name: impl Into<String>) -> Self {
		self.device_name = Some(name.into());

		self
	}

	/// Sets the subscription key forwarded with resource requests.
	pub fn subscription_key(mut self, key: impl Into<String>) -> Self {
		self.subscription_key = Some(key.into());

		self
	}

	/// Overrides the retry policy.
	pub fn retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = Some(retry);

		self
	}

	/// Overrides the preemptive refresh window (defaults to zero).
	pub fn preemptive_window(mut self, window: Duration) -> Self {
		self.preemptive_window = Some(window);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, GatewayConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(GatewayConfig::DEFAULT_BASE_URL)
				.map_err(|source| GatewayConfigError::InvalidBaseUrl { source })?,
		};
		let device_name =
			self.device_name.unwrap_or_else(|| GatewayConfig::DEFAULT_DEVICE_NAME.into());
		let retry = self.retry.unwrap_or_default();
		let preemptive_window = self.preemptive_window.unwrap_or(Duration::ZERO);
		let config = GatewayConfig {
			base_url,
			device_name,
			subscription_key: self.subscription_key,
			retry,
			preemptive_window,
		};

		config.validate()?;

		Ok(config)
	}
}

impl GatewayConfig {
	/// Validates invariants for the configuration.
	fn validate(&self) -> Result<(), GatewayConfigError> {
		if self.device_name.trim().is_empty() {
			return Err(GatewayConfigError::EmptyDeviceName);
		}
		if self.retry.initial_delay.is_zero() || self.retry.initial_delay.is_negative() {
			return Err(GatewayConfigError::NonPositiveInitialDelay);
		}
		if self.preemptive_window.is_negative() {
			return Err(GatewayConfigError::NegativePreemptiveWindow);
		}

		Ok(())
	}
}
