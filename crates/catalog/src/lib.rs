//! HTTP client for the online game catalog.
//!
//! [`CatalogClient`] implements [`gamedir_model::Catalog`] against a
//! Lutris-compatible API: batched game lookup by slug and installer scripts
//! per game.

pub mod client;
pub mod types;

pub use client::{CatalogClient, DEFAULT_BASE_URL};
