//! Job state module
//!
//! Collects the graph produced by a run and persists it.
//!
//! # Overview
//!
//! The state module provides:
//! - `JobState` - Shared entity/relationship sink with step data
//! - `GraphSnapshot` - Serializable form of everything collected

mod manager;
mod types;

pub use manager::JobState;
pub use types::GraphSnapshot;
