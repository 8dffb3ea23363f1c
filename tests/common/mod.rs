#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use oauth2_identity::{
	HttpTransport, Provider,
	oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
	},
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const REDIRECT_URL: &str = "https://app.example.test/callback";

/// Canned behavior for the next request handled by [`FakeTransport`].
#[derive(Clone, Debug)]
pub enum Reply {
	Json(u16, &'static str),
	Fail(&'static str),
	Hang,
}

#[derive(Debug)]
pub struct FakeTransportError(pub &'static str);
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Fake transport failed: {}.", self.0)
	}
}
impl StdError for FakeTransportError {}

/// Request as observed by the fake transport.
#[derive(Clone, Debug)]
pub struct Recorded {
	pub method: String,
	pub uri: String,
	pub headers: Vec<(String, String)>,
	pub body: Vec<u8>,
}
impl Recorded {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}

	pub fn form(&self) -> Vec<(String, String)> {
		oauth2_identity::url::form_urlencoded::parse(&self.body).into_owned().collect()
	}
}

#[derive(Default)]
struct Inner {
	replies: Mutex<VecDeque<Reply>>,
	requests: Mutex<Vec<Recorded>>,
}

/// Scripted transport that records every request it sees.
#[derive(Clone, Default)]
pub struct FakeTransport(Arc<Inner>);
impl FakeTransport {
	pub fn new<I>(replies: I) -> Self
	where
		I: IntoIterator<Item = Reply>,
	{
		let transport = Self::default();

		transport.0.replies.lock().extend(replies);

		transport
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.0.requests.lock().clone()
	}
}
impl HttpTransport for FakeTransport {
	type Handle = FakeHandle;
	type TransportError = FakeTransportError;

	fn handle(&self) -> Self::Handle {
		FakeHandle(self.0.clone())
	}
}

pub struct FakeHandle(Arc<Inner>);
impl<'c> AsyncHttpClient<'c> for FakeHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		self.0.requests.lock().push(Recorded {
			method: request.method().to_string(),
			uri: request.uri().to_string(),
			headers: request
				.headers()
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_owned()))
				.collect(),
			body: request.body().clone(),
		});

		let reply = self.0.replies.lock().pop_front().unwrap_or(Reply::Fail("no reply scripted"));

		Box::pin(async move {
			match reply {
				Reply::Json(status, body) => {
					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");
					response
						.headers_mut()
						.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

					Ok(response)
				},
				Reply::Fail(reason) => Err(HttpClientError::Reqwest(Box::new(FakeTransportError(reason)))),
				Reply::Hang => std::future::pending().await,
			}
		})
	}
}

/// Reqwest transport that accepts the self-signed certificates served by `httpmock`.
#[cfg(feature = "reqwest")]
pub fn insecure_reqwest_client() -> oauth2_identity::ReqwestHttpClient {
	let builder = oauth2_identity::reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true);

	oauth2_identity::ReqwestHttpClient::from_builder(builder)
		.expect("Failed to build insecure Reqwest client for tests.")
}

/// Nextcloud provider pointed at `base`, with PKCE and client credentials.
pub fn nextcloud_at(base: &str) -> Provider {
	oauth2_identity::providers::nextcloud::provider()
		.with_client_credentials(CLIENT_ID, CLIENT_SECRET)
		.with_redirect_url(REDIRECT_URL)
		.with_auth_url(format!("{base}/apps/oauth2/authorize"))
		.with_token_url(format!("{base}/apps/oauth2/api/v1/token"))
		.with_user_info_url(format!("{base}/ocs/v2.php/cloud/user?format=json"))
}

/// OpenID Connect provider pointed at `base`, configured as a confidential client.
pub fn oidc_at(base: &str) -> Provider {
	oauth2_identity::providers::oidc::provider()
		.with_client_credentials(CLIENT_ID, CLIENT_SECRET)
		.with_redirect_url(REDIRECT_URL)
		.with_auth_url(format!("{base}/authorize"))
		.with_token_url(format!("{base}/token"))
}
