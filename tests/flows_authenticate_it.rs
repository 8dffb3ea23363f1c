mod common;

// std
use std::time::Duration as StdDuration;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use common::{CLIENT_ID, FakeTransport, REDIRECT_URL, Reply};
use oauth2_identity::{
	CancelReason, CancellationToken, Error, ErrorKind, FlowContext, NormalizationError,
	PkceVerifier, Token, TokenExchangeError, UserInfoFetchError, obs::FlowStage,
};

const BASE: &str = "https://cloud.example.test";
const NO_EXTRA: [(&str, &str); 0] = [];
const TOKEN_OK: &str =
	r#"{"access_token":"tok123","refresh_token":"ref456","token_type":"Bearer","expires_in":3600}"#;
const PROFILE_OK: &str = r#"{"ocs":{"meta":{"status":"ok","statuscode":200},"data":{"id":"u1","displayname":"Jane Doe","email":"jane@example.test"}}}"#;

#[tokio::test]
async fn nextcloud_login_produces_the_canonical_user() {
	let transport =
		FakeTransport::new([Reply::Json(200, TOKEN_OK), Reply::Json(200, PROFILE_OK)]);
	let cx = FlowContext::new(&transport);
	let provider = common::nextcloud_at(BASE);
	let session = provider.build_auth_url("state-1", NO_EXTRA).expect("URL should build.");
	let challenge = session.code_challenge().expect("Nextcloud uses PKCE.");
	let user = provider
		.authenticate(&cx, session, "state-1", "code-1")
		.await
		.expect("Login should succeed.");

	assert_eq!(user.id(), "u1");
	assert_eq!(user.name(), "Jane Doe");
	assert_eq!(user.username(), "u1");
	assert_eq!(user.email(), "jane@example.test");
	assert_eq!(user.access_token().expose(), "tok123");
	assert_eq!(user.refresh_token().map(|t| t.expose()), Some("ref456"));
	assert!(user.avatar_url().is_none());
	assert!(user.expiry().is_some());

	let requests = transport.requests();

	assert_eq!(requests.len(), 2);

	let exchange = &requests[0];
	let form = exchange.form();
	let verifier = form
		.iter()
		.find(|(key, _)| key == "code_verifier")
		.map(|(_, value)| value.clone())
		.expect("Verifier should be sent.");

	assert_eq!(exchange.method, "POST");
	assert_eq!(exchange.uri, format!("{BASE}/apps/oauth2/api/v1/token"));
	assert_eq!(exchange.header("content-type"), Some("application/x-www-form-urlencoded"));
	assert!(form.contains(&("grant_type".into(), "authorization_code".into())));
	assert!(form.contains(&("code".into(), "code-1".into())));
	assert!(form.contains(&("client_id".into(), CLIENT_ID.into())));
	assert!(form.contains(&("redirect_uri".into(), REDIRECT_URL.into())));
	assert!(form.contains(&("client_secret".into(), common::CLIENT_SECRET.into())));
	assert_eq!(PkceVerifier::new(verifier).challenge(), challenge);

	let profile = &requests[1];

	assert_eq!(profile.method, "GET");
	assert_eq!(profile.uri, format!("{BASE}/ocs/v2.php/cloud/user?format=json"));
	assert_eq!(profile.header("authorization"), Some("Bearer tok123"));
	assert_eq!(profile.header("ocs-apirequest"), Some("true"));
}

#[tokio::test]
async fn exchanged_token_fields_reach_the_user_unchanged() {
	let transport =
		FakeTransport::new([Reply::Json(200, TOKEN_OK), Reply::Json(200, PROFILE_OK)]);
	let cx = FlowContext::new(&transport);
	let provider = common::nextcloud_at(BASE);
	let session = provider.build_auth_url("state-2", NO_EXTRA).expect("URL should build.");
	let token = provider
		.exchange(&cx, "code-2", session.pkce_verifier())
		.await
		.expect("Exchange should succeed.");
	let user = provider.fetch_auth_user(&cx, &token).await.expect("Profile should normalize.");

	assert!(token.expiry.is_some());
	assert_eq!(user.expiry(), token.expiry);
	assert_eq!(user.access_token(), &token.access_token);
	assert_eq!(user.refresh_token(), token.refresh_token.as_ref());
}

#[tokio::test]
async fn auth_user_copies_token_fields_verbatim() {
	let transport = FakeTransport::new([Reply::Json(200, PROFILE_OK)]);
	let cx = FlowContext::new(&transport);
	let token = Token::new("tok123").with_refresh_token("ref456");
	let user = common::nextcloud_at(BASE)
		.fetch_auth_user(&cx, &token)
		.await
		.expect("Profile should normalize.");

	assert_eq!(user.access_token(), &token.access_token);
	assert_eq!(user.refresh_token(), token.refresh_token.as_ref());
	assert_eq!(user.expiry(), None);
	assert_eq!(
		user.raw_user().get("ocs").and_then(|ocs| ocs.pointer("/meta/statuscode")),
		Some(&serde_json::json!(200))
	);
}

#[tokio::test]
async fn rejected_profile_requests_surface_as_user_info_errors() {
	let transport = FakeTransport::new([Reply::Json(401, r#"{"message":"unauthorized"}"#)]);
	let cx = FlowContext::new(&transport);
	let err = common::nextcloud_at(BASE)
		.fetch_auth_user(&cx, &Token::new("expired"))
		.await
		.expect_err("401 should fail.");

	assert_eq!(err.kind(), ErrorKind::UserInfoFetch);
	assert!(matches!(
		err,
		Error::UserInfoFetch { source: UserInfoFetchError::Status { status: 401, ref body }, .. }
			if body.contains("unauthorized")
	));
}

#[tokio::test]
async fn profiles_without_identifier_are_rejected() {
	let transport =
		FakeTransport::new([Reply::Json(200, r#"{"ocs":{"data":{"displayname":"Jane"}}}"#)]);
	let cx = FlowContext::new(&transport);
	let err = common::nextcloud_at(BASE)
		.fetch_auth_user(&cx, &Token::new("tok"))
		.await
		.expect_err("Missing id should fail.");

	assert_eq!(err.stage(), Some(FlowStage::Normalization));
	assert!(matches!(
		err,
		Error::Normalization { source: NormalizationError::MissingIdentifier { .. }, .. }
	));
}

#[tokio::test]
async fn empty_profile_endpoint_reads_id_token_claims_without_requests() {
	let transport = FakeTransport::default();
	let cx = FlowContext::new(&transport);
	let claims = URL_SAFE_NO_PAD.encode(
		br#"{"sub":"248289761001","name":"Jane Doe","preferred_username":"j.doe","email":"janedoe@example.test","picture":"https://example.test/janedoe/me.jpg"}"#,
	);
	let token = Token::new("tok").with_id_token(format!("eyJhbGciOiJSUzI1NiJ9.{claims}.c2ln"));
	let user = common::oidc_at("https://id.example.test")
		.fetch_auth_user(&cx, &token)
		.await
		.expect("Claims should normalize.");

	assert!(transport.requests().is_empty());
	assert_eq!(user.id(), "248289761001");
	assert_eq!(user.username(), "j.doe");
	assert_eq!(
		user.avatar_url().map(|url| url.as_str()),
		Some("https://example.test/janedoe/me.jpg")
	);
}

#[tokio::test]
async fn confidential_exchange_sends_the_secret() {
	let transport = FakeTransport::new([Reply::Json(
		200,
		r#"{"access_token":"a","token_type":"bearer","id_token":"h.e30.s","expires_in":"0"}"#,
	)]);
	let cx = FlowContext::new(&transport);
	let provider = common::oidc_at("https://id.example.test");
	let session = provider.build_auth_url("s", NO_EXTRA).expect("URL should build.");
	let token = provider
		.exchange(&cx, "code", session.pkce_verifier())
		.await
		.expect("Exchange should succeed.");

	assert!(token.expiry.is_none());
	assert_eq!(token.id_token.as_ref().map(|t| t.expose()), Some("h.e30.s"));
	assert!(
		transport.requests()[0]
			.form()
			.contains(&("client_secret".into(), common::CLIENT_SECRET.into()))
	);
}

#[tokio::test]
async fn oauth_errors_are_classified() {
	let transport = FakeTransport::new([Reply::Json(
		400,
		r#"{"error":"invalid_grant","error_description":"already used"}"#,
	)]);
	let cx = FlowContext::new(&transport);
	let verifier = PkceVerifier::new("v");
	let err = common::nextcloud_at(BASE)
		.exchange(&cx, "stale", Some(&verifier))
		.await
		.expect_err("Stale code should fail.");

	assert_eq!(err.kind(), ErrorKind::TokenExchange);
	assert!(matches!(
		err,
		Error::TokenExchange {
			source: TokenExchangeError::Status {
				status: 400,
				kind: oauth2_identity::TokenErrorKind::InvalidGrant,
				ref message,
				..
			},
			..
		} if message == "already used"
	));
}

#[tokio::test]
async fn transport_failures_are_reported_per_stage() {
	let transport = FakeTransport::new([Reply::Fail("connection reset")]);
	let cx = FlowContext::new(&transport);
	let verifier = PkceVerifier::new("v");
	let err = common::nextcloud_at(BASE)
		.exchange(&cx, "code", Some(&verifier))
		.await
		.expect_err("Transport failures should surface.");

	assert!(matches!(
		err,
		Error::TokenExchange { source: TokenExchangeError::Transport(_), .. }
	));
}

#[tokio::test]
async fn mismatched_state_stops_before_any_request() {
	let transport = FakeTransport::default();
	let cx = FlowContext::new(&transport);
	let provider = common::nextcloud_at(BASE);
	let session = provider.build_auth_url("expected", NO_EXTRA).expect("URL should build.");
	let err = provider
		.authenticate(&cx, session, "forged", "code")
		.await
		.expect_err("Forged state should fail.");

	assert_eq!(err.kind(), ErrorKind::StateMismatch);
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn cancellation_aborts_in_flight_requests() {
	let transport = FakeTransport::new([Reply::Hang]);
	let token = CancellationToken::new();
	let cx = FlowContext::new(&transport).with_cancellation(token.clone());
	let provider = common::nextcloud_at(BASE);
	let access = Token::new("tok");
	let (result, ()) = tokio::join!(provider.fetch_auth_user(&cx, &access), async {
		tokio::time::sleep(StdDuration::from_millis(20)).await;
		token.cancel();
	});
	let err = result.expect_err("Cancelled attempts should fail.");

	assert!(matches!(
		err,
		Error::Cancelled { stage: FlowStage::UserInfo, reason: CancelReason::Requested, .. }
	));
	assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn deadlines_abort_hanging_exchanges() {
	let transport = FakeTransport::new([Reply::Hang]);
	let cx = FlowContext::new(&transport).with_timeout(StdDuration::from_millis(30));
	let verifier = PkceVerifier::new("v");
	let err = common::nextcloud_at(BASE)
		.exchange(&cx, "code", Some(&verifier))
		.await
		.expect_err("Hanging exchanges should time out.");

	assert_eq!(err.kind(), ErrorKind::Cancelled);
	assert!(matches!(
		err,
		Error::Cancelled {
			stage: FlowStage::TokenExchange,
			reason: CancelReason::DeadlineExceeded,
			..
		}
	));
}
