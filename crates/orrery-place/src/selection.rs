//! Gathering the bodies a user picked for comparison.

use futures::future::join_all;
use orrery_catalog::{Catalog, CelestialBody, unique_ids};

/// Fetch each id concurrently and return what was found, in request order.
///
/// Every lookup is independent: a failed id is logged and left out without
/// affecting the others. Duplicate ids are fetched once.
pub async fn gather_selection<C: Catalog + ?Sized>(catalog: &C, ids: &[String]) -> Vec<CelestialBody> {
    let ids = unique_ids(ids);
    let lookups = ids.iter().map(|id| catalog.body(id));
    let results = join_all(lookups).await;

    let mut bodies = Vec::with_capacity(results.len());
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(body) => bodies.push(body),
            Err(e) if e.is_not_found() => tracing::warn!(id = %id, "body not in catalog"),
            Err(e) => tracing::error!(id = %id, "failed to load body: {e}"),
        }
    }
    tracing::info!(requested = ids.len(), found = bodies.len(), "selection gathered");
    bodies
}
