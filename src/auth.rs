//! Identity-domain identifiers, scopes, tokens, and the canonical user record.

pub mod id;
pub mod scope;
pub mod token;
pub mod user;

pub use id::*;
pub use scope::*;
pub use token::{record::*, secret::*};
pub use user::*;
