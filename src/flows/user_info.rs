//! Profile retrieval, normalization, and the end-to-end callback helper.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AuthUser, Token},
	error::{ConfigError, NormalizationError, UserInfoFetchError},
	flows::{AuthorizationSession, FlowContext},
	http::{self, HttpTransport},
	oauth,
	obs::{FlowSpan, FlowStage},
	provider::{Normalizer, Provider, UserInfoMethod},
};

impl Provider {
	/// Returns the raw profile payload for `token`.
	///
	/// With a profile endpoint configured this is one authenticated request. Without one, no
	/// request is made: the claims of the token's ID token are returned, or the extra token
	/// response fields when no ID token was issued.
	pub async fn fetch_raw_user_info<C>(
		&self,
		cx: &FlowContext<'_, C>,
		token: &Token,
	) -> Result<Vec<u8>>
	where
		C: ?Sized + HttpTransport,
	{
		const STAGE: FlowStage = FlowStage::UserInfo;

		let span = FlowSpan::begin(self.id(), STAGE);
		let result = span
			.instrument(async move {
				let Some(request) = self.user_info_request(token)? else {
					return self.token_profile(token);
				};
				let response = cx
					.guard(self.id(), STAGE, async {
						http::send(cx.transport(), request).await.map_err(|e| {
							Error::user_info_fetch(self.id(), UserInfoFetchError::Transport(e))
						})
					})
					.await?;
				let status = response.status();

				if !status.is_success() {
					return Err(Error::user_info_fetch(
						self.id(),
						UserInfoFetchError::Status {
							status: status.as_u16(),
							body: oauth::preview(response.body()),
						},
					));
				}

				Ok(response.into_body())
			})
			.await;

		span.finish(&result);

		result
	}

	/// Fetches the profile for `token` and normalizes it into an [`AuthUser`].
	pub async fn fetch_auth_user<C>(&self, cx: &FlowContext<'_, C>, token: &Token) -> Result<AuthUser>
	where
		C: ?Sized + HttpTransport,
	{
		let raw = self.fetch_raw_user_info(cx, token).await?;

		self.normalize(&raw, token)
	}

	/// Turns a raw profile payload into an [`AuthUser`] without any I/O.
	///
	/// The payload must be a JSON object; it is kept verbatim as
	/// [`AuthUser::raw_user`]. Calling this twice with the same input yields equal records.
	pub fn normalize(&self, raw: &[u8], token: &Token) -> Result<AuthUser> {
		const STAGE: FlowStage = FlowStage::Normalization;

		let span = FlowSpan::begin(self.id(), STAGE);
		let _guard = span.enter();
		let result = normalize_with(self.normalizer(), raw, token)
			.map_err(|e| Error::normalization(self.id(), e));

		span.finish(&result);

		result
	}

	/// Completes a login from the provider's redirect.
	///
	/// The returned `state` is checked against `session` first; on success the code is exchanged
	/// with the session's PKCE verifier and the profile is fetched. The session is consumed so
	/// the verifier cannot be replayed.
	pub async fn authenticate<C>(
		&self,
		cx: &FlowContext<'_, C>,
		session: AuthorizationSession,
		returned_state: &str,
		code: &str,
	) -> Result<AuthUser>
	where
		C: ?Sized + HttpTransport,
	{
		if session.provider() != self.id() {
			return Err(Error::StateMismatch { provider: self.id().clone() });
		}

		session.validate_state(returned_state)?;

		let verifier = session.into_verifier();
		let token = self.exchange(cx, code, verifier.as_ref()).await?;

		self.fetch_auth_user(cx, &token).await
	}

	fn user_info_request(&self, token: &Token) -> Result<Option<HttpRequest>> {
		let config = self.config();
		let Some(url) = config.user_info_endpoint(self.id())? else {
			return Ok(None);
		};
		let quirks = config.quirks();
		let method = match quirks.user_info_method {
			UserInfoMethod::Get => Method::GET,
			UserInfoMethod::Post => Method::POST,
		};
		let mut builder = Request::builder()
			.method(method)
			.uri(url.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", token.access_token.expose()))
			.header(ACCEPT, "application/json");

		for (name, value) in &quirks.user_info_headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		let request = builder.body(Vec::new()).map_err(ConfigError::from)?;

		Ok(Some(request))
	}

	fn token_profile(&self, token: &Token) -> Result<Vec<u8>> {
		match &token.id_token {
			Some(id_token) => oauth::decode_id_token_claims(id_token.expose())
				.map_err(|e| Error::normalization(self.id(), e)),
			None => Ok(JsonValue::Object(token.extra.clone()).to_string().into_bytes()),
		}
	}
}

fn normalize_with(
	normalizer: Normalizer,
	raw: &[u8],
	token: &Token,
) -> Result<AuthUser, NormalizationError> {
	let JsonValue::Object(raw_user) = oauth::decode_json::<JsonValue>(raw)? else {
		return Err(NormalizationError::NotAnObject);
	};
	let profile = normalizer(raw)?;

	if profile.id.is_empty() {
		return Err(NormalizationError::MissingIdentifier { field: "id" });
	}

	Ok(AuthUser::assemble(profile, raw_user, token))
}
