//! Optional observability helpers for provider flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_identity.flow` with the `provider`
//!   and `stage` fields, plus an `outcome` field filled in when the stage ends.
//! - Enable `metrics` to increment the `oauth2_identity_flow_total` counter for every
//!   attempt/success/failure, labeled by `provider`, `stage`, and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of an authentication attempt that touch the engine.
///
/// An attempt walks `authorization_url → token_exchange → user_info → normalization`; errors
/// and spans report the stage that was in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Authorization URL and PKCE challenge construction.
	AuthorizationUrl,
	/// Authorization code exchange against the token endpoint.
	TokenExchange,
	/// Raw profile retrieval (endpoint call or token claims).
	UserInfo,
	/// Mapping the raw profile onto the canonical identity.
	Normalization,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::AuthorizationUrl => "authorization_url",
			FlowStage::TokenExchange => "token_exchange",
			FlowStage::UserInfo => "user_info",
			FlowStage::Normalization => "normalization",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an engine helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
