// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # auth0-graph
//!
//! Ingests an Auth0 tenant into a security graph: the account, every user
//! and every application, linked by `HAS` relationships.
//!
//! ## Features
//!
//! - **Exhaustive user enumeration**: the user search never exposes more
//!   than 1000 matches per query, so large tenants are walked by splitting
//!   queries on the trailing characters of `user_id`
//! - **Client-credentials auth**: token cached until shortly before expiry,
//!   granted scopes checked before ingestion
//! - **Rate limiting**: governor-based limiter in front of every request
//! - **Graph snapshot**: entities and relationships persisted as JSON
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use auth0_graph::{IngestConfig, IngestionEngine, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = IngestConfig::new(
//!         "client-id",
//!         "client-secret",
//!         "tenant.us.auth0.com",
//!         "https://tenant.us.auth0.com/api/v2/",
//!     );
//!
//!     let engine = IngestionEngine::new(config)?;
//!     let stats = engine.run().await?;
//!     engine.state().save_to_file("graph.json").await?;
//!
//!     println!("{} users, {} clients", stats.users, stats.clients);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        IngestionEngine                          │
//! │   validate()   fetch-account → fetch-users / fetch-clients      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │   Graph   │   State     │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Client   │ GET/POST  │ Exhaustive    │ Entities  │ JobState    │
//! │ creds    │ Rate Limit│ (suffix split)│ Relations │ Snapshot    │
//! │ Scopes   │ Timeout   │ Page number   │ Weblinks  │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Integration configuration
pub mod config;

/// Client-credentials authentication
pub mod auth;

/// HTTP client with rate limiting
pub mod http;

/// Exhaustive and paged enumeration
pub mod pagination;

/// Management API client and wire types
pub mod management;

/// Entities, relationships and converters
pub mod graph;

/// Job state and persistence
pub mod state;

/// Ingestion engine and steps
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, IngestConfig};
pub use engine::{IngestStats, IngestionEngine};
pub use management::ManagementClient;
pub use state::JobState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
