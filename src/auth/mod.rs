//! Authentication module
//!
//! Supports: static Bearer tokens and the OAuth2 client-credentials grant
//! used by the management API.
//!
//! The `Authenticator` applies credentials to outgoing requests and caches
//! exchanged tokens, together with the scopes they were granted, until
//! shortly before they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken};

#[cfg(test)]
mod tests;
