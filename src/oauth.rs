//! Token endpoint wire format: request forms, response decoding, error classification, and
//! ID token claim extraction.

// std
use std::num::IntErrorKind;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use oauth2::basic::BasicErrorResponse;
use serde::de::{DeserializeOwned, IgnoredAny};
// self
use crate::{
	_prelude::*,
	auth::Token,
	error::{NormalizationError, TokenErrorKind, TokenExchangeError},
};

/// Maximum number of characters of a provider body kept in error values.
pub const BODY_PREVIEW_LIMIT: usize = 256;

/// Standard token endpoint fields; everything else lands in `extra`.
#[derive(Debug, Deserialize)]
struct TokenResponseBody {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	expires_in: Option<ExpiresIn>,
	#[serde(default)]
	id_token: Option<String>,
	#[serde(flatten)]
	extra: JsonMap<String, JsonValue>,
}

/// Some providers send `expires_in` as a JSON string; values of any other type are ignored.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
	Seconds(i64),
	Fractional(f64),
	Text(String),
	Other(IgnoredAny),
}
impl ExpiresIn {
	/// `Ok(None)` means unknown; overflowing values are errors so they never pass as unknown.
	fn seconds(&self) -> Result<Option<i64>, TokenExchangeError> {
		match self {
			Self::Seconds(value) => Ok(Some(*value)),
			// Saturating cast; out-of-range values are caught by the overflow check.
			Self::Fractional(value) if value.is_finite() => Ok(Some(*value as i64)),
			Self::Fractional(_) | Self::Other(_) => Ok(None),
			Self::Text(value) => match value.trim().parse::<i64>() {
				Ok(seconds) => Ok(Some(seconds)),
				Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow) =>
					Err(TokenExchangeError::ExpiresInOutOfRange),
				Err(_) => Ok(None),
			},
		}
	}
}

/// Encodes `pairs` as an `application/x-www-form-urlencoded` body, preserving order.
pub fn encode_form<'a, I>(pairs: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut serializer = url::form_urlencoded::Serializer::new(String::new());

	for (key, value) in pairs {
		serializer.append_pair(key, value);
	}

	serializer.finish()
}

/// Decodes a successful token endpoint response.
///
/// `now` anchors the relative `expires_in`; non-positive or absent lifetimes yield an unknown
/// expiry.
pub fn parse_token_response(
	status: u16,
	body: &[u8],
	now: OffsetDateTime,
) -> Result<Token, TokenExchangeError> {
	let parsed: TokenResponseBody = decode_json(body)
		.map_err(|source| TokenExchangeError::Parse { status, source, body: preview(body) })?;
	let access_token = parsed
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or(TokenExchangeError::MissingAccessToken)?;
	let lifetime = match &parsed.expires_in {
		Some(expires_in) => expires_in.seconds()?,
		None => None,
	};
	let expiry = match lifetime {
		Some(seconds) if seconds > 0 => Some(
			now.checked_add(Duration::seconds(seconds))
				.ok_or(TokenExchangeError::ExpiresInOutOfRange)?,
		),
		_ => None,
	};
	let mut token = Token::new(access_token);

	token.token_type = parsed.token_type.filter(|value| !value.is_empty());
	token.expiry = expiry;
	token.extra = parsed.extra;

	if let Some(refresh) = parsed.refresh_token.filter(|value| !value.is_empty()) {
		token = token.with_refresh_token(refresh);
	}
	if let Some(id_token) = parsed.id_token.filter(|value| !value.is_empty()) {
		token = token.with_id_token(id_token);
	}

	Ok(token)
}

/// Builds the error for a non-2xx token endpoint response.
///
/// Structured OAuth fields win over body heuristics, which win over the HTTP status.
pub fn token_error_from_response(status: u16, body: &[u8]) -> TokenExchangeError {
	let body_preview = preview(body);
	let (oauth_error, description) = match serde_json::from_slice::<BasicErrorResponse>(body) {
		Ok(document) => (
			Some(document.error().to_string()),
			document.error_description().cloned(),
		),
		Err(_) => (None, None),
	};
	let kind = oauth_error
		.as_deref()
		.and_then(match_exact_value)
		.or_else(|| description.as_deref().and_then(match_exact_value))
		.or_else(|| classify_body(description.as_deref()))
		.or_else(|| classify_body(Some(&body_preview)))
		.unwrap_or_else(|| classify_status(status));
	let message = description
		.clone()
		.or_else(|| oauth_error.clone())
		.unwrap_or_else(|| "unexpected response".into());

	TokenExchangeError::Status { status, kind, oauth_error, message, body: body_preview }
}

/// Extracts the claims segment of a compact JWS ID token.
///
/// The signature is not verified; the token was received directly from the token endpoint
/// over the transport the host configured.
pub fn decode_id_token_claims(id_token: &str) -> Result<Vec<u8>, NormalizationError> {
	let mut segments = id_token.split('.');
	let (Some(_header), Some(payload), Some(_signature), None) =
		(segments.next(), segments.next(), segments.next(), segments.next())
	else {
		return Err(NormalizationError::InvalidIdToken {
			reason: "expected three dot-separated segments".into(),
		});
	};

	if payload.is_empty() {
		return Err(NormalizationError::InvalidIdToken { reason: "empty claims segment".into() });
	}

	URL_SAFE_NO_PAD
		.decode(payload.trim_end_matches('='))
		.map_err(|e| NormalizationError::InvalidIdToken { reason: e.to_string() })
}

/// Deserializes JSON while tracking the path of the failing field.
pub(crate) fn decode_json<T>(body: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
}

/// Lossy UTF-8 rendering of `body`, truncated to [`BODY_PREVIEW_LIMIT`] characters.
pub(crate) fn preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf: String = text.chars().take(BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}

fn match_exact_value(value: &str) -> Option<TokenErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(TokenErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(TokenErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(TokenErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(TokenErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<TokenErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(TokenErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(TokenErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(TokenErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(TokenErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: u16) -> TokenErrorKind {
	match status {
		400 | 404 | 410 => TokenErrorKind::InvalidGrant,
		401 => TokenErrorKind::InvalidClient,
		403 => TokenErrorKind::InsufficientScope,
		_ => TokenErrorKind::Transient,
	}
}
