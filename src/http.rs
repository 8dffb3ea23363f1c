//! Transport primitives for provider calls.
//!
//! The engine issues exactly two kinds of requests: a form-encoded `POST` to the token
//! endpoint and an authenticated call to the profile endpoint. Both go through
//! [`HttpTransport`], so hosts can plug any HTTP stack (or a fake in tests) by handing out
//! [`AsyncHttpClient`] handles.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::{_prelude::*, error::TransportError};

/// Abstraction over HTTP transports used for token and profile requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can serve every
/// concurrent attempt, and the handles they return must own whatever state their request
/// futures need so those futures remain `Send`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	fn handle(&self) -> Self::Handle;
}

/// Dispatches `request` through `transport`, flattening client failures into
/// [`TransportError`].
pub(crate) async fn send<C>(transport: &C, request: HttpRequest) -> Result<HttpResponse, TransportError>
where
	C: ?Sized + HttpTransport,
{
	let handle = transport.handle();

	handle.call(request).await.map_err(map_client_error)
}

fn map_client_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner),
		HttpClientError::Http(inner) => TransportError::Http(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		_ => TransportError::Other { message: "unrecognized HTTP client failure".into() },
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token and profile endpoints answer directly, so [`ReqwestHttpClient::new`] and
/// [`ReqwestHttpClient::from_builder`] never follow redirects; a custom [`ReqwestClient`] passed
/// to [`ReqwestHttpClient::with_client`] should disable them as well. There is no `Default`
/// because reqwest's default client follows redirects.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that does not follow redirects.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		Self::from_builder(ReqwestClient::builder())
	}

	/// Finishes `builder` (TLS roots, proxies, timeouts, ...) with redirect following disabled.
	pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self, crate::error::ConfigError> {
		let client = builder.redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Per-request handle returned by [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::io::{Error as IoError, ErrorKind as IoErrorKind};
	// self
	use super::*;

	#[derive(Debug, ThisError)]
	#[error("Connection refused.")]
	struct Refused;

	#[test]
	fn client_errors_flatten_into_transport_errors() {
		let err = map_client_error(HttpClientError::Reqwest(Box::new(Refused)));

		assert!(matches!(err, TransportError::Network { .. }));

		let err = map_client_error::<Refused>(HttpClientError::Io(IoError::new(
			IoErrorKind::TimedOut,
			"timed out",
		)));

		assert!(matches!(err, TransportError::Io(_)));

		let err = map_client_error::<Refused>(HttpClientError::Other("boom".into()));

		assert!(matches!(err, TransportError::Other { ref message } if message == "boom"));
	}
}
