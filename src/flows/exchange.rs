//! Authorization code exchange against the token endpoint.

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::Token,
	error::{ConfigError, TokenExchangeError},
	flows::{FlowContext, PkceVerifier},
	http::{self, HttpTransport},
	oauth,
	obs::{FlowSpan, FlowStage},
	provider::Provider,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

impl Provider {
	/// Exchanges an authorization code for a [`Token`].
	///
	/// The client secret is always sent; `verifier` is mandatory when the provider uses PKCE. Non-2xx answers are classified into
	/// [`TokenErrorKind`](crate::error::TokenErrorKind) so hosts can choose between retrying and
	/// restarting the login.
	pub async fn exchange<C>(
		&self,
		cx: &FlowContext<'_, C>,
		code: &str,
		verifier: Option<&PkceVerifier>,
	) -> Result<Token>
	where
		C: ?Sized + HttpTransport,
	{
		const STAGE: FlowStage = FlowStage::TokenExchange;

		let span = FlowSpan::begin(self.id(), STAGE);
		let result = span
			.instrument(async move {
				let request = self.token_request(code, verifier)?;
				let response = cx
					.guard(self.id(), STAGE, async {
						http::send(cx.transport(), request).await.map_err(|e| {
							Error::token_exchange(self.id(), TokenExchangeError::Transport(e))
						})
					})
					.await?;

				self.token_from_response(response)
			})
			.await;

		span.finish(&result);

		result
	}

	fn token_request(&self, code: &str, verifier: Option<&PkceVerifier>) -> Result<HttpRequest> {
		let id = self.id();
		let config = self.config();

		config.ensure_ready(id, FlowStage::TokenExchange)?;

		let token_url = config.token_endpoint(id)?;
		let client_id = config.ready_client_id(id)?;
		let client_secret = config.ready_client_secret(id)?;
		let redirect_uri = config.ready_redirect_url(id)?;
		let mut form = vec![
			("grant_type", "authorization_code"),
			("code", code),
			("redirect_uri", redirect_uri),
			("client_id", client_id),
			("client_secret", client_secret),
		];

		if config.pkce() {
			let verifier = verifier
				.ok_or_else(|| ConfigError::MissingPkceVerifier { provider: id.clone() })?;

			form.push(("code_verifier", verifier.secret()));
		}

		let request = Request::builder()
			.method(Method::POST)
			.uri(token_url.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, JSON_CONTENT_TYPE)
			.body(oauth::encode_form(form).into_bytes())
			.map_err(ConfigError::from)?;

		Ok(request)
	}

	fn token_from_response(&self, response: HttpResponse) -> Result<Token> {
		let status = response.status();
		let body = response.body();

		if !status.is_success() {
			return Err(Error::token_exchange(
				self.id(),
				oauth::token_error_from_response(status.as_u16(), body),
			));
		}

		oauth::parse_token_response(status.as_u16(), body, OffsetDateTime::now_utc())
			.map_err(|e| Error::token_exchange(self.id(), e))
	}
}
