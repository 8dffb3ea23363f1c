//! Pluggable OAuth 2.0 identity providers: authorization URLs with PKCE, code exchanges, and
//! provider-specific profile payloads normalized into one canonical user record.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod providers;

mod _prelude {
	#[cfg(feature = "reqwest")]
	pub use std::pin::Pin;
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, parking_lot as _};

pub use auth::{AuthUser, ProviderId, ProviderProfile, Scopes, Token, TokenSecret};
pub use error::{
	CancelReason, ConfigError, Error, ErrorKind, NormalizationError, TokenErrorKind,
	TokenExchangeError, TransportError, UserInfoFetchError,
};
pub use flows::{AuthorizationSession, FlowContext, PkceVerifier, generate_state};
#[cfg(feature = "reqwest")] pub use http::ReqwestHttpClient;
pub use http::HttpTransport;
pub use provider::{Provider, ProviderConfig, ProviderOverrides, Registry};
