// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"secrets_gateway_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a rate-limit sleep before a dispatch retry (when enabled).
pub fn record_dispatch_retry(attempt: u32) {
	#[cfg(feature = "metrics")]
	{
		let _ = attempt;

		metrics::counter!("secrets_gateway_retry_total", "flow" => FlowKind::Dispatch.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = attempt;
	}
}
