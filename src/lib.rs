//! Client-side gateway for Bitwarden-shaped secret-management APIs—client-credentials
//! sessions, transparent token refresh, and rate-limit-aware dispatch in one crate built
//! for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod http;
pub mod identity;
pub mod obs;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientCredentials, TokenKind, TokenRecord},
		config::{GatewayConfig, GatewayConfigBuilder, RetryPolicy},
		gateway::Gateway,
	};

	/// Builds credentials pointing at a mock identity endpoint.
	pub fn test_credentials(token_endpoint: &str) -> ClientCredentials {
		let endpoint =
			Url::parse(token_endpoint).expect("Mock token endpoint should parse successfully.");

		ClientCredentials::new("client-test", "secret-test", endpoint)
	}

	/// Constructs a [`Gateway`] whose base and identity URLs both point at a mock server.
	///
	/// The retry policy defaults to a single retry with a sub-second initial delay so
	/// integration tests stay fast; override it through `configure` when a test needs
	/// different timings.
	pub fn build_test_gateway(
		server_base: &str,
		token_path: &str,
		configure: impl FnOnce(GatewayConfigBuilder) -> GatewayConfigBuilder,
	) -> Gateway {
		let base_url =
			Url::parse(server_base).expect("Mock server base URL should parse successfully.");
		let credentials = test_credentials(&format!("{server_base}{token_path}"));
		let builder = GatewayConfig::builder()
			.base_url(base_url)
			.retry(RetryPolicy { max_retries: 1, initial_delay: Duration::milliseconds(50) });
		let config = configure(builder).build().expect("Test gateway config should build.");

		Gateway::new(credentials, config).expect("Test gateway should construct successfully.")
	}

	/// Replaces the gateway's live token record, bypassing the identity endpoint.
	pub fn seed_token_record(gateway: &Gateway, record: TokenRecord) {
		gateway.store_record(record);
	}

	/// Builds an organization record that expired an hour ago.
	pub fn expired_record(access_token: &str) -> TokenRecord {
		let now = OffsetDateTime::now_utc();

		TokenRecord::builder(TokenKind::Organization)
			.access_token(access_token)
			.issued_at(now - Duration::hours(2))
			.expires_at(now - Duration::hours(1))
			.build()
			.expect("Expired record fixture should build.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, secrets_gateway as _};
