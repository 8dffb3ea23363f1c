//! Walks a Nextcloud login end to end against a local mock server using the default reqwest
//! transport: authorization URL, callback handling, and the normalized user.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_identity::{FlowContext, ProviderOverrides, Registry, ReqwestHttpClient};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/apps/oauth2/api/v1/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/ocs/v2.php/cloud/user").header("ocs-apirequest", "true");
			then.status(200).header("content-type", "application/json").body(
				"{\"ocs\":{\"data\":{\"id\":\"jane\",\"displayname\":\"Jane Doe\",\"email\":\"jane@example.test\"}}}",
			);
		})
		.await;
	// A host would deserialize this from its own configuration file.
	let overrides = ProviderOverrides {
		client_id: Some("demo-client".into()),
		client_secret: Some(oauth2_identity::TokenSecret::new("demo-secret")),
		redirect_url: Some("http://localhost:8080/auth/nextcloud/callback".into()),
		auth_url: Some(server.url("/apps/oauth2/authorize")),
		token_url: Some(server.url("/apps/oauth2/api/v1/token")),
		user_info_url: Some(server.url("/ocs/v2.php/cloud/user?format=json")),
		..Default::default()
	};
	let registry = Registry::with_builtin_providers();
	let provider = registry.get("nextcloud")?.apply(overrides);
	let session = provider.build_auth_url("", [("prompt", "consent")])?;

	println!("Send the user to: {}.", session.authorize_url());

	// The provider redirects back with `code` and the `state` we issued.
	let returned_state = session.state().to_owned();
	// The mock server uses a self-signed certificate; production code calls
	// `ReqwestHttpClient::new()`.
	let transport = ReqwestHttpClient::from_builder(
		oauth2_identity::reqwest::Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true),
	)?;
	let cx = FlowContext::new(&transport).with_timeout(std::time::Duration::from_secs(10));
	let user = provider.authenticate(&cx, session, &returned_state, "demo-code").await?;

	println!(
		"Signed in {} ({}) <{}>; token expires at {:?}.",
		user.name(),
		user.id(),
		user.email(),
		user.expiry()
	);

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	Ok(())
}
