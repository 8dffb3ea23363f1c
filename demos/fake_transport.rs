//! Plugs a custom [`HttpTransport`] into the engine: an in-process OpenID Connect issuer whose
//! token endpoint returns an ID token, so the profile is read from its claims without a second
//! request. Also shows a cancelled attempt.

// std
use std::{future::Future, pin::Pin, time::Duration};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
// self
use oauth2_identity::{
	CancellationToken, Error, FlowContext, HttpTransport, Registry,
	oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
};

#[derive(Debug, thiserror::Error)]
#[error("The in-process issuer is offline.")]
struct IssuerOffline;

#[derive(Clone)]
struct InProcessIssuer {
	id_token: String,
	stall: bool,
}
impl HttpTransport for InProcessIssuer {
	type Handle = InProcessHandle;
	type TransportError = IssuerOffline;

	fn handle(&self) -> Self::Handle {
		InProcessHandle(self.clone())
	}
}

struct InProcessHandle(InProcessIssuer);
impl<'c> AsyncHttpClient<'c> for InProcessHandle {
	type Error = HttpClientError<IssuerOffline>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let issuer = self.0.clone();

		Box::pin(async move {
			if issuer.stall {
				tokio::time::sleep(Duration::from_secs(3600)).await;

				return Err(HttpClientError::Reqwest(Box::new(IssuerOffline)));
			}

			println!("Issuer received {} {}.", request.method(), request.uri());

			let body = format!(
				"{{\"access_token\":\"opaque-access\",\"token_type\":\"Bearer\",\"expires_in\":600,\"id_token\":\"{}\"}}",
				issuer.id_token
			);

			Ok(HttpResponse::new(body.into_bytes()))
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let claims = URL_SAFE_NO_PAD.encode(
		br#"{"sub":"5f3c","name":"Ada Lovelace","preferred_username":"ada","email":"ada@example.test"}"#,
	);
	let issuer = InProcessIssuer { id_token: format!("eyJhbGciOiJub25lIn0.{claims}."), stall: false };
	let provider = Registry::with_builtin_providers()
		.get("oidc")?
		.with_client_credentials("demo-client", "demo-secret")
		.with_redirect_url("https://app.example.test/callback")
		.with_auth_url("https://issuer.example.test/authorize")
		.with_token_url("https://issuer.example.test/token");
	let session = provider.build_auth_url("", [("nonce", "n-0S6_WzA2Mj")])?;
	let state = session.state().to_owned();
	let user = provider.authenticate(&FlowContext::new(&issuer), session, &state, "code").await?;

	println!("Claims normalized into {} <{}> as `{}`.", user.name(), user.email(), user.username());

	let stalled = InProcessIssuer { stall: true, ..issuer };
	let cancel = CancellationToken::new();
	let cx = FlowContext::new(&stalled).with_cancellation(cancel.clone());
	let session = provider.build_auth_url("", [("nonce", "n-1")])?;
	let state = session.state().to_owned();

	cancel.cancel();

	match provider.authenticate(&cx, session, &state, "code").await {
		Err(e @ Error::Cancelled { .. }) => println!("Attempt stopped as requested: {e}"),
		other => println!("Unexpected outcome: {other:?}."),
	}

	Ok(())
}
