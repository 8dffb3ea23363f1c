// self
use crate::{
	auth::ProviderId,
	obs::{FlowOutcome, FlowStage},
};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(provider: &ProviderId, stage: FlowStage, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_identity_flow_total",
			"provider" => provider.to_string(),
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (provider, stage, outcome);
	}
}
