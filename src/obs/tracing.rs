// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	obs::{self, FlowOutcome, FlowStage},
};

/// Instrumented future when tracing is enabled, the future itself otherwise.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Observation scope of one engine stage for one provider.
///
/// [`FlowSpan::begin`] counts the attempt and opens the `oauth2_identity.flow` span;
/// [`FlowSpan::finish`] counts the outcome and stores it in the span's `outcome` field.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	provider: ProviderId,
	stage: FlowStage,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens the scope for `stage` and records the attempt.
	pub fn begin(provider: &ProviderId, stage: FlowStage) -> Self {
		obs::record_flow_outcome(provider, stage, FlowOutcome::Attempt);

		Self {
			provider: provider.clone(),
			stage,
			#[cfg(feature = "tracing")]
			span: tracing::info_span!(
				"oauth2_identity.flow",
				provider = %provider,
				stage = stage.as_str(),
				outcome = tracing::field::Empty,
			),
		}
	}

	/// Stage observed by this scope.
	pub fn stage(&self) -> FlowStage {
		self.stage
	}

	/// Enters the span for synchronous sections.
	pub fn enter(&self) -> FlowSpanGuard {
		FlowSpanGuard {
			#[cfg(feature = "tracing")]
			guard: self.span.clone().entered(),
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Records how the stage ended and returns the outcome label.
	pub fn finish<T, E>(&self, result: &Result<T, E>) -> FlowOutcome {
		let outcome = match result {
			Ok(_) => FlowOutcome::Success,
			Err(_) => FlowOutcome::Failure,
		};

		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());
		}

		obs::record_flow_outcome(&self.provider, self.stage, outcome);

		outcome
	}
}

/// RAII guard returned by [`FlowSpan::enter`].
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn provider() -> ProviderId {
		ProviderId::new("nextcloud").expect("Provider fixture should be valid.")
	}

	#[test]
	fn finish_reports_the_outcome() {
		let span = FlowSpan::begin(&provider(), FlowStage::AuthorizationUrl);
		let _guard = span.enter();

		assert_eq!(span.stage(), FlowStage::AuthorizationUrl);
		assert_eq!(span.finish(&Ok::<_, ()>(())), FlowOutcome::Success);
		assert_eq!(span.finish(&Err::<(), _>("boom")), FlowOutcome::Failure);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::begin(&provider(), FlowStage::UserInfo);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
