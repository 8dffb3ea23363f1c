//! Per-attempt execution context: transport, cancellation, and deadline.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::CancelReason,
	http::HttpTransport,
	obs::FlowStage,
};

/// Bundles the transport with the caller's cancellation token and timeout.
///
/// The timeout bounds each network call separately. Firing the token or exceeding the timeout
/// drops the in-flight request future and surfaces [`Error::Cancelled`]. Timeouts rely on the
/// tokio timer, so they need a tokio runtime with the time driver enabled; cancellation works on
/// any executor.
pub struct FlowContext<'a, C>
where
	C: ?Sized + HttpTransport,
{
	transport: &'a C,
	cancellation: Option<CancellationToken>,
	timeout: Option<StdDuration>,
}
impl<'a, C> FlowContext<'a, C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a context that never cancels and never times out.
	pub fn new(transport: &'a C) -> Self {
		Self { transport, cancellation: None, timeout: None }
	}

	/// Aborts in-flight calls once `token` is cancelled.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);

		self
	}

	/// Bounds every network call by `timeout`.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Transport used for provider calls.
	pub fn transport(&self) -> &'a C {
		self.transport
	}

	/// Configured per-call timeout.
	pub fn timeout(&self) -> Option<StdDuration> {
		self.timeout
	}

	/// Configured cancellation token.
	pub fn cancellation(&self) -> Option<&CancellationToken> {
		self.cancellation.as_ref()
	}

	/// Runs `fut` under the context's cancellation token and timeout.
	pub(crate) async fn guard<T, F>(&self, provider: &ProviderId, stage: FlowStage, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		let cancelled =
			|reason| Error::Cancelled { provider: provider.to_owned(), stage, reason };
		let bounded = async {
			match self.timeout {
				Some(limit) => tokio::time::timeout(limit, fut)
					.await
					.map_err(|_| cancelled(CancelReason::DeadlineExceeded))?,
				None => fut.await,
			}
		};

		match &self.cancellation {
			Some(token) => {
				tokio::select! {
					biased;
					_ = token.cancelled() => Err(cancelled(CancelReason::Requested)),
					result = bounded => result,
				}
			},
			None => bounded.await,
		}
	}
}
impl<C> Clone for FlowContext<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport,
			cancellation: self.cancellation.clone(),
			timeout: self.timeout,
		}
	}
}
impl<C> Debug for FlowContext<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FlowContext")
			.field("cancellable", &self.cancellation.is_some())
			.field("timeout", &self.timeout)
			.finish()
	}
}
