//! The session object coordinating authentication and dispatch flows.

pub mod metrics;

mod authenticate;
mod execute;

pub use metrics::DispatchMetrics;

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenRecord},
	config::GatewayConfig,
	http::GatewayHttpClient,
};

/// Coordinates a client-credentials session against a single secrets API.
///
/// The gateway owns the HTTP client, the credential material, the configuration, the
/// live token record, and the refresh guard so the flow implementations can focus on
/// grant and dispatch logic. At most one record is live at a time; a refresh replaces
/// it wholesale. Clones share all session state, so concurrent callers holding clones
/// observe each other's refreshes and piggy-back on a single in-flight renewal.
#[derive(Clone)]
pub struct Gateway {
	/// HTTP client wrapper used for every outbound request.
	pub http_client: GatewayHttpClient,
	/// Credential material used to establish and renew the session.
	pub credentials: ClientCredentials,
	/// Immutable configuration for the session.
	pub config: GatewayConfig,
	/// Shared metrics recorder for flow outcomes.
	pub metrics: Arc<DispatchMetrics>,
	token: Arc<RwLock<Option<TokenRecord>>>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl Gateway {
	/// Creates a gateway backed by the crate's default HTTP client.
	pub fn new(credentials: ClientCredentials, config: GatewayConfig) -> Result<Self> {
		Ok(Self::with_http_client(credentials, config, GatewayHttpClient::new()?))
	}

	/// Creates a gateway that reuses a caller-provided HTTP client.
	pub fn with_http_client(
		credentials: ClientCredentials,
		config: GatewayConfig,
		http_client: GatewayHttpClient,
	) -> Self {
		Self {
			http_client,
			credentials,
			config,
			metrics: Default::default(),
			token: Arc::new(RwLock::new(None)),
			refresh_guard: Default::default(),
		}
	}

	/// Returns a copy of the live token record, if one exists.
	pub fn token_record(&self) -> Option<TokenRecord> {
		self.token.read().clone()
	}

	/// Replaces the live token record wholesale.
	pub(crate) fn store_record(&self, record: TokenRecord) {
		*self.token.write() = Some(record);
	}
}
impl Debug for Gateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("client_id", &self.credentials.client_id)
			.field("base_url", &self.config.base_url.as_str())
			.field("token_present", &self.token.read().is_some())
			.finish()
	}
}
