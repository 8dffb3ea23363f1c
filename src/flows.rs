//! Engine operations shared by every provider.
//!
//! Each stage of an attempt is a method on [`Provider`](crate::Provider):
//! [`build_auth_url`](crate::Provider::build_auth_url) is synchronous, while
//! [`exchange`](crate::Provider::exchange), [`fetch_raw_user_info`](crate::Provider::fetch_raw_user_info),
//! [`fetch_auth_user`](crate::Provider::fetch_auth_user), and
//! [`authenticate`](crate::Provider::authenticate) take a [`FlowContext`] carrying the transport
//! plus optional cancellation and timeout.

pub mod authorization;
pub mod context;

mod exchange;
mod user_info;

pub use authorization::*;
pub use context::*;
