//! Shared test utilities for the agentctl workspace.
//!
//! Dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`catalog`]: [`CatalogFixture`] builder for a repository with an
//!   `agents/` catalog and an isolated home directory

pub mod catalog;

pub use catalog::CatalogFixture;
