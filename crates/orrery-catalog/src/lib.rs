//! Async access to the celestial body catalog.
//!
//! This crate provides the catalog record types, a [`Catalog`] trait with an
//! HTTP implementation and an in-memory one, byte caches for offline use, a
//! store for downloaded model files and a persisted favorites set.
//!
//! # Design principles
//!
//! - **Runtime-agnostic**: Returns futures, works with any executor that can
//!   drive reqwest
//! - **Lenient decoding**: Malformed catalog fields never fail a whole record
//! - **Order-preserving**: Batched lookups come back in request order
//!
//! # Example
//!
//! ```ignore
//! use orrery_catalog::{Catalog, Client, MemoryCache};
//!
//! let client = Client::with_cache("https://catalog.example.com/", MemoryCache::new());
//! let planets = client.bodies_of_type("planet").await?;
//! ```

pub mod assets;
pub mod cache;
mod catalog;
mod client;
mod error;
pub mod favorites;
#[cfg(test)]
mod test_server;
pub mod types;

pub use assets::AssetStore;
pub use cache::{Cache, FilesystemCache, MemoryCache, NoCache};
pub use catalog::{Catalog, CatalogFuture, MAX_IDS_PER_QUERY, StaticCatalog, unique_ids};
pub use client::Client;
pub use error::{Error, Result};
pub use favorites::FavoritesStore;
pub use types::{CelestialBody, Category, category_for_type};
