//! The catalog source abstraction and an in-memory implementation.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{CelestialBody, Category, category_for_type};

/// Largest number of ids a single batched lookup may carry.
pub const MAX_IDS_PER_QUERY: usize = 10;

/// Future type returned by catalog operations.
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Read-only access to the celestial body catalog.
///
/// Implementations are shared across tasks, so every method borrows `self`
/// immutably and returns a `Send` future.
pub trait Catalog: Send + Sync {
    /// Fetch one body. Fails with [`Error::NotFound`] if the id is unknown.
    fn body<'a>(&'a self, id: &'a str) -> CatalogFuture<'a, CelestialBody>;

    /// Fetch every body in the catalog.
    fn bodies(&self) -> CatalogFuture<'_, Vec<CelestialBody>>;

    /// Fetch the bodies whose category id equals `category`.
    fn bodies_in_category<'a>(&'a self, category: &'a str)
    -> CatalogFuture<'a, Vec<CelestialBody>>;

    /// Fetch the given bodies, de-duplicated and in request order.
    ///
    /// Unknown ids are skipped. Any failed underlying query fails the call.
    fn bodies_by_ids<'a>(&'a self, ids: &'a [String]) -> CatalogFuture<'a, Vec<CelestialBody>>;

    /// Fetch all categories sorted by their `order` key.
    fn categories(&self) -> CatalogFuture<'_, Vec<Category>>;

    /// Fetch bodies by singular type name (`planet`, `star`, ...).
    fn bodies_of_type<'a>(&'a self, body_type: &str) -> CatalogFuture<'a, Vec<CelestialBody>> {
        let category = category_for_type(body_type);
        Box::pin(async move { self.bodies_in_category(&category).await })
    }
}

/// Remove duplicate ids, keeping the first occurrence.
#[must_use]
pub fn unique_ids(ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Pick the collected bodies back out in request order.
pub(crate) fn in_request_order(
    ids: &[String],
    mut collected: HashMap<String, CelestialBody>,
) -> Vec<CelestialBody> {
    ids.iter().filter_map(|id| collected.remove(id)).collect()
}

/// A catalog held entirely in memory.
///
/// Used for bundled catalogs and tests. Record order is preserved for
/// [`Catalog::bodies`].
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    bodies: Vec<CelestialBody>,
    categories: Vec<Category>,
}

/// On-disk layout accepted by [`StaticCatalog::load`].
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Full {
        #[serde(default)]
        bodies: Vec<CelestialBody>,
        #[serde(default)]
        categories: Vec<Category>,
    },
    BodiesOnly(Vec<CelestialBody>),
}

impl StaticCatalog {
    #[must_use]
    pub fn new(bodies: Vec<CelestialBody>, categories: Vec<Category>) -> Self {
        Self { bodies, categories }
    }

    /// Load a catalog from a JSON file.
    ///
    /// The file is either an array of bodies or an object with `bodies` and
    /// `categories` arrays.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(path, &e))?;
        Self::from_json(&data)
    }

    /// Parse a catalog from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let file: CatalogFile = serde_json::from_slice(data).map_err(|e| Error::Json {
            context: "catalog file",
            message: e.to_string(),
        })?;
        Ok(match file {
            CatalogFile::Full { bodies, categories } => Self::new(bodies, categories),
            CatalogFile::BodiesOnly(bodies) => Self::new(bodies, Vec::new()),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn body<'a>(&'a self, id: &'a str) -> CatalogFuture<'a, CelestialBody> {
        let found = self.bodies.iter().find(|b| b.id == id).cloned();
        Box::pin(async move {
            found.ok_or_else(|| Error::NotFound { id: id.to_string() })
        })
    }

    fn bodies(&self) -> CatalogFuture<'_, Vec<CelestialBody>> {
        let bodies = self.bodies.clone();
        Box::pin(async move { Ok(bodies) })
    }

    fn bodies_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> CatalogFuture<'a, Vec<CelestialBody>> {
        let bodies = self
            .bodies
            .iter()
            .filter(|b| b.category == category)
            .cloned()
            .collect();
        Box::pin(async move { Ok(bodies) })
    }

    fn bodies_by_ids<'a>(&'a self, ids: &'a [String]) -> CatalogFuture<'a, Vec<CelestialBody>> {
        let ids = unique_ids(ids);
        let collected = self
            .bodies
            .iter()
            .filter(|b| ids.contains(&b.id))
            .map(|b| (b.id.clone(), b.clone()))
            .collect();
        Box::pin(async move { Ok(in_request_order(&ids, collected)) })
    }

    fn categories(&self) -> CatalogFuture<'_, Vec<Category>> {
        let mut categories = self.categories.clone();
        categories.sort_by_key(|c| c.order);
        Box::pin(async move { Ok(categories) })
    }
}
