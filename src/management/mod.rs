//! Auth0 Management API
//!
//! A thin client over the two listings the ingestion needs (users and
//! applications) plus the wire types they return. The client implements the
//! pagination traits so the enumerators can drive it directly:
//!
//! - users are a [`SearchableCollection`](crate::pagination::SearchableCollection),
//!   searched by `user_id` suffix with totals
//! - applications are a [`PagedCollection`](crate::pagination::PagedCollection)

mod client;
mod types;

pub use client::ManagementClient;
pub use types::{
    Auth0Client, Auth0User, Auth0UserIdentity, EncryptionKey, JwtConfiguration,
    RefreshTokenSettings, UsersPage,
};

#[cfg(test)]
mod tests;
