//! Catalog access for the simulator.
//!
//! Opens the catalog named on the command line and resolves the selection:
//! a whole category, explicit ids, or the favorites file, in that order.

use std::path::Path;

use orrery_catalog::{
    Catalog, CelestialBody, Client, Error, FavoritesStore, FilesystemCache, MemoryCache, Result,
    StaticCatalog,
};
use orrery_place::gather_selection;

use crate::launch_params::{CatalogSource, LaunchParams};

/// Open the catalog. HTTP responses are cached under `cache_dir` when given.
pub async fn open_catalog(
    source: &CatalogSource,
    cache_dir: Option<&Path>,
) -> Result<Box<dyn Catalog>> {
    match source {
        CatalogSource::Http(url) => {
            let catalog: Box<dyn Catalog> = match cache_dir {
                Some(dir) => Box::new(Client::with_cache(url, FilesystemCache::new(dir.join("catalog")))),
                None => Box::new(Client::with_cache(url, MemoryCache::new())),
            };
            tracing::info!(source = %source, "using HTTP catalog");
            Ok(catalog)
        }
        CatalogSource::File(path) => {
            let catalog = StaticCatalog::load(path).await?;
            tracing::info!(source = %source, bodies = catalog.len(), "loaded catalog file");
            Ok(Box::new(catalog))
        }
    }
}

/// Resolve which bodies to place, in display order.
pub async fn load_selection(
    catalog: &dyn Catalog,
    params: &LaunchParams,
    favorites: Option<&FavoritesStore>,
) -> Result<Vec<CelestialBody>> {
    if let Some(category) = &params.category {
        let bodies = catalog.bodies_in_category(category).await?;
        tracing::info!(category = %category, count = bodies.len(), "selected category");
        return Ok(bodies);
    }

    let ids: Vec<String> = if params.ids.is_empty() {
        favorites
            .map(|store| store.ids().map(str::to_string).collect())
            .unwrap_or_default()
    } else {
        params.ids.clone()
    };
    if ids.is_empty() {
        return Err(Error::InvalidData {
            context: "selection",
            detail: "no ids, category or favorites given".to_string(),
        });
    }
    Ok(gather_selection(catalog, &ids).await)
}

/// Add the placed bodies to the favorites file.
pub async fn remember(store: &mut FavoritesStore, bodies: &[CelestialBody]) -> Result<()> {
    for body in bodies {
        store.add(&body.id).await?;
    }
    tracing::info!(path = %store.path().display(), count = bodies.len(), "saved favorites");
    Ok(())
}
