//! Token values returned by the authorization code exchange.

pub mod record;
pub mod secret;
