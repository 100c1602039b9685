//! Client-credentials authentication flow and refresh-on-demand support.

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	gateway::Gateway,
	identity::{self, AuthOutcome},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Gateway {
	/// Performs the client-credentials grant and stores the resulting session record.
	///
	/// A recognized credential shape replaces the live token record wholesale. An
	/// unrecognized shape is handed back raw and leaves session state untouched; see
	/// [`AuthOutcome`].
	pub async fn authenticate(&self) -> Result<AuthOutcome> {
		const KIND: FlowKind = FlowKind::Authenticate;

		let span = FlowSpan::new(KIND, "authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;
				let outcome = identity::request_token(
					&self.http_client,
					&self.credentials,
					&self.config.device_name,
				)
				.await?;

				if let AuthOutcome::Session(record) = &outcome {
					self.store_record(record.clone());
				}

				Ok(outcome)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Returns a usable record, renewing an expired one under the refresh guard.
	///
	/// Concurrent callers racing over an expired record serialize on the guard, so the
	/// second caller finds the fresh record and skips the redundant renewal.
	pub(crate) async fn valid_token(&self) -> Result<TokenRecord> {
		let _singleflight = self.refresh_guard.lock().await;
		let now = OffsetDateTime::now_utc();
		let current = self.token_record().ok_or(Error::Authentication)?;

		if !current.should_refresh(now, self.config.preemptive_window) {
			return Ok(current);
		}

		self.metrics.record_refresh();

		let outcome = identity::request_token(
			&self.http_client,
			&self.credentials,
			&self.config.device_name,
		)
		.await?;

		match outcome {
			AuthOutcome::Session(record) => {
				self.store_record(record.clone());

				Ok(record)
			},
			AuthOutcome::Unrecognized(_) => Err(Error::UnrecognizedCredential),
		}
	}
}
