//! Error types shared across providers, flows, and transports.

// self
use crate::{_prelude::*, auth::ProviderId, obs::FlowStage};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every failure reaching the host carries enough context (provider, stage, cause) to be
/// logged and to pick between retrying, failing hard, or offering another provider; see
/// [`Error::kind`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint rejected the exchange or could not be reached.
	#[error("Authorization code exchange with `{provider}` failed.")]
	TokenExchange {
		/// Provider that was being contacted.
		provider: ProviderId,
		/// Underlying failure.
		#[source]
		source: TokenExchangeError,
	},
	/// Profile endpoint rejected the request or could not be reached.
	#[error("Fetching the user profile from `{provider}` failed.")]
	UserInfoFetch {
		/// Provider that was being contacted.
		provider: ProviderId,
		/// Underlying failure.
		#[source]
		source: UserInfoFetchError,
	},
	/// Provider returned a payload that cannot be turned into an identity.
	#[error("Profile returned by `{provider}` could not be normalized.")]
	Normalization {
		/// Provider whose payload was rejected.
		provider: ProviderId,
		/// Underlying failure.
		#[source]
		source: NormalizationError,
	},
	/// Requested provider name is not registered.
	#[error("Provider `{name}` is not registered.")]
	NotFound {
		/// Name that was looked up.
		name: String,
	},
	/// Caller aborted the attempt or its deadline elapsed.
	#[error("Authentication with `{provider}` was cancelled during {stage}: {reason}.")]
	Cancelled {
		/// Provider that was being contacted.
		provider: ProviderId,
		/// Stage that was in flight.
		stage: FlowStage,
		/// Why the attempt stopped.
		reason: CancelReason,
	},
	/// The `state` returned through the redirect does not match the session.
	#[error("Authorization state returned to `{provider}` does not match the session.")]
	StateMismatch {
		/// Provider the session was started for.
		provider: ProviderId,
	},
}
impl Error {
	/// Coarse classification used by hosts to decide how to react.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Configuration,
			Self::TokenExchange { .. } => ErrorKind::TokenExchange,
			Self::UserInfoFetch { .. } => ErrorKind::UserInfoFetch,
			Self::Normalization { .. } => ErrorKind::Normalization,
			Self::NotFound { .. } => ErrorKind::NotFound,
			Self::Cancelled { .. } => ErrorKind::Cancelled,
			Self::StateMismatch { .. } => ErrorKind::StateMismatch,
		}
	}

	/// Provider involved in the failure, when one was resolved.
	pub fn provider(&self) -> Option<&ProviderId> {
		match self {
			Self::Config(err) => err.provider(),
			Self::TokenExchange { provider, .. }
			| Self::UserInfoFetch { provider, .. }
			| Self::Normalization { provider, .. }
			| Self::Cancelled { provider, .. }
			| Self::StateMismatch { provider } => Some(provider),
			Self::NotFound { .. } => None,
		}
	}

	/// Flow stage that failed, when the failure happened inside an attempt.
	pub fn stage(&self) -> Option<FlowStage> {
		match self {
			Self::TokenExchange { .. } => Some(FlowStage::TokenExchange),
			Self::UserInfoFetch { .. } => Some(FlowStage::UserInfo),
			Self::Normalization { .. } => Some(FlowStage::Normalization),
			Self::Cancelled { stage, .. } => Some(*stage),
			Self::StateMismatch { .. } => Some(FlowStage::TokenExchange),
			Self::Config(_) | Self::NotFound { .. } => None,
		}
	}

	pub(crate) fn token_exchange(provider: &ProviderId, source: TokenExchangeError) -> Self {
		Self::TokenExchange { provider: provider.clone(), source }
	}

	pub(crate) fn user_info_fetch(provider: &ProviderId, source: UserInfoFetchError) -> Self {
		Self::UserInfoFetch { provider: provider.clone(), source }
	}

	pub(crate) fn normalization(provider: &ProviderId, source: NormalizationError) -> Self {
		Self::Normalization { provider: provider.clone(), source }
	}
}

/// Error categories surfaced by [`Error::kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Missing or invalid local configuration; never retried.
	Configuration,
	/// Token endpoint failure.
	TokenExchange,
	/// Profile endpoint failure.
	UserInfoFetch,
	/// Malformed or incomplete provider payload.
	Normalization,
	/// Unknown provider name.
	NotFound,
	/// Caller-initiated abort or elapsed deadline.
	Cancelled,
	/// Redirect `state` mismatch.
	StateMismatch,
}

/// Reason attached to [`Error::Cancelled`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CancelReason {
	/// The caller's cancellation token fired.
	Requested,
	/// The caller-supplied timeout elapsed.
	DeadlineExceeded,
}
impl Display for CancelReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Requested => f.write_str("cancellation requested"),
			Self::DeadlineExceeded => f.write_str("deadline exceeded"),
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// An endpoint URL cannot be parsed.
	#[error("The {endpoint} endpoint of `{provider}` is invalid: {url}.")]
	InvalidEndpoint {
		/// Provider whose configuration is broken.
		provider: ProviderId,
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Offending value.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// No client identifier was injected.
	#[error("Provider `{provider}` has no client id configured.")]
	MissingClientId {
		/// Provider whose configuration is incomplete.
		provider: ProviderId,
	},
	/// No client secret was injected for a confidential client.
	#[error("Provider `{provider}` has no client secret configured.")]
	MissingClientSecret {
		/// Provider whose configuration is incomplete.
		provider: ProviderId,
	},
	/// No redirect URL was injected.
	#[error("Provider `{provider}` has no redirect URL configured.")]
	MissingRedirectUrl {
		/// Provider whose configuration is incomplete.
		provider: ProviderId,
	},
	/// PKCE is enabled but the exchange was attempted without the verifier.
	#[error("Provider `{provider}` requires the PKCE verifier issued with the authorization URL.")]
	MissingPkceVerifier {
		/// Provider that requires PKCE.
		provider: ProviderId,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Provider whose configuration caused the failure, if any.
	pub fn provider(&self) -> Option<&ProviderId> {
		match self {
			Self::InvalidEndpoint { provider, .. }
			| Self::MissingClientId { provider }
			| Self::MissingClientSecret { provider }
			| Self::MissingRedirectUrl { provider }
			| Self::MissingPkceVerifier { provider } => Some(provider),
			Self::HttpClientBuild { .. } | Self::HttpRequest(_) => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Classification of token endpoint rejections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenErrorKind {
	/// Provider rejected the authorization code or verifier (stale, replayed, mismatched).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes were refused.
	InsufficientScope,
	/// Failure is temporary on the provider side.
	Transient,
}

/// Token endpoint failures.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Token endpoint answered with a non-2xx status.
	#[error("Token endpoint returned HTTP {status}: {message}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Classification derived from the OAuth error fields, body, and status.
		kind: TokenErrorKind,
		/// OAuth `error` field, when the body is an OAuth error document.
		oauth_error: Option<String>,
		/// Human-readable summary.
		message: String,
		/// Truncated response body.
		body: String,
	},
	/// Token endpoint could not be reached.
	#[error("Transport failure while calling the token endpoint.")]
	Transport(#[source] TransportError),
	/// Token endpoint returned a body that is not a token response.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Truncated response body.
		body: String,
	},
	/// Token endpoint returned an empty access token.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl TokenExchangeError {
	/// HTTP status observed, when the provider answered.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::Parse { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Profile endpoint failures.
#[derive(Debug, ThisError)]
pub enum UserInfoFetchError {
	/// Profile endpoint answered with a non-2xx status.
	#[error("Profile endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Profile endpoint could not be reached.
	#[error("Transport failure while calling the profile endpoint.")]
	Transport(#[source] TransportError),
}

/// Failures turning a raw provider payload into an identity.
#[derive(Debug, ThisError)]
pub enum NormalizationError {
	/// Payload is not well-formed JSON or does not match the provider's envelope.
	#[error("Profile payload does not match the expected shape.")]
	Decode(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// Payload is JSON but not an object.
	#[error("Profile payload must be a JSON object.")]
	NotAnObject,
	/// Payload decoded but the mandatory identifier is absent or empty.
	#[error("Profile payload is missing the `{field}` identifier.")]
	MissingIdentifier {
		/// Provider-specific identifier field.
		field: &'static str,
	},
	/// The token's ID token cannot be decoded into claims.
	#[error("ID token is malformed: {reason}.")]
	InvalidIdToken {
		/// What was wrong with the token.
		reason: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request could not be converted by the HTTP client.
	#[error("HTTP request could not be dispatched.")]
	Http(#[from] oauth2::http::Error),
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Any other client failure.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
