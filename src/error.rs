//! Gateway-level error types shared across authentication, dispatch, and configuration.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The session holds no access token yet.
	#[error("No access token found. Authenticate before dispatching requests.")]
	Authentication,
	/// Transparent re-authentication produced a token shape the gateway does not recognize.
	#[error("Token response did not match a recognized credential shape.")]
	UnrecognizedCredential,
	/// Transport or HTTP failure while exchanging credentials with the identity endpoint,
	/// or a transport failure while dispatching a resource request.
	#[error("Connection failed: {reason}")]
	Connection {
		/// Underlying transport message.
		reason: String,
		/// Transport-specific failure, when one is available.
		#[source]
		source: Option<BoxError>,
	},
	/// Rate-limit responses exhausted the retry budget.
	#[error("Rate limit exceeded after {retries} retries: {message}")]
	RateLimit {
		/// Number of retries performed before giving up.
		retries: u32,
		/// Message extracted from the final rate-limit response.
		message: String,
	},
	/// Non-success HTTP status outside the rate-limit path; never retried.
	#[error("API request failed with status {status}: {message}")]
	Api {
		/// HTTP status code returned by the resource endpoint.
		status: u16,
		/// Structured error detail, or the raw response text when no detail is present.
		message: String,
	},
	/// Response payload did not match the expected shape.
	#[error("Failed to decode the response payload at `{}`.", .0.path())]
	Decode(#[source] serde_path_to_error::Error<serde_json::Error>),
}
impl Error {
	/// Wraps a transport failure into [`Error::Connection`], keeping the source chain.
	pub(crate) fn connection(
		reason: impl Into<String>,
		source: impl 'static + Send + Sync + StdError,
	) -> Self {
		Self::Connection { reason: reason.into(), source: Some(Box::new(source)) }
	}

	/// Builds an [`Error::Connection`] from a bare message.
	pub(crate) fn connection_message(reason: impl Into<String>) -> Self {
		Self::Connection { reason: reason.into(), source: None }
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		let reason = e.to_string();

		Self::connection(reason, e)
	}
}

/// Configuration and boundary-validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Resource endpoints are joined onto the base URL and must stay relative.
	#[error("Endpoint `{endpoint}` must not start with `/`.")]
	LeadingSlashEndpoint {
		/// Endpoint that violated the caller contract.
		endpoint: String,
	},
	/// Filter queries are appended after `?` and must not supply their own delimiter.
	#[error("Filter query `{filter}` must not start with `?`.")]
	LeadingQueryDelimiter {
		/// Filter query that violated the caller contract.
		filter: String,
	},
	/// The request URI could not be assembled from the base URL and endpoint.
	#[error("Unable to join `{endpoint}` onto the base URL.")]
	InvalidRequestUri {
		/// Endpoint that failed to join.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Unable to serialize the request body.")]
	BodySerialize(#[from] serde_json::Error),
	/// Token record builder validation failed.
	#[error("Unable to build token record.")]
	TokenBuild(#[from] crate::auth::TokenRecordBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn config_errors_surface_transparently() {
		let err: Error =
			ConfigError::LeadingSlashEndpoint { endpoint: "/public/members".into() }.into();

		assert_eq!(err.to_string(), "Endpoint `/public/members` must not start with `/`.");
	}

	#[test]
	fn connection_error_keeps_source_chain() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err = Error::connection("connect call failed", io);

		assert!(err.to_string().contains("connect call failed"));
		assert!(StdError::source(&err).is_some(), "Connection errors should expose a source.");
	}

	#[test]
	fn api_error_formats_status_and_message() {
		let err = Error::Api { status: 404, message: "Not Found".into() };

		assert_eq!(err.to_string(), "API request failed with status 404: Not Found");
	}
}
