//! HTTP client for the celestial body catalog.
//!
//! The catalog is served as JSON documents:
//!
//! - `GET {base}celestial_bodies` lists every body
//! - `GET {base}celestial_bodies?category={id}` filters by category
//! - `GET {base}celestial_bodies?ids={a,b,c}` looks up at most ten ids
//! - `GET {base}celestial_bodies/{id}` returns one body or 404
//! - `GET {base}categories` lists categories

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::de::DeserializeOwned;

use crate::cache::{Cache, NoCache};
use crate::catalog::{
    Catalog, CatalogFuture, MAX_IDS_PER_QUERY, in_request_order, unique_ids,
};
use crate::error::{Error, Result};
use crate::types::{CelestialBody, Category};

/// HTTP client for the catalog service.
///
/// Responses are written to the cache after every successful fetch. When the
/// network is unreachable the last cached response for the same URL is served
/// instead, so a previously browsed catalog keeps working offline.
pub struct Client<C: Cache = NoCache> {
    http: reqwest::Client,
    cache: Arc<C>,
    base_url: String,
}

impl Client<NoCache> {
    /// Create a client without response caching.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_cache(base_url, NoCache)
    }
}

impl<C: Cache> Client<C> {
    /// Create a client with a custom cache.
    #[must_use]
    pub fn with_cache(base_url: &str, cache: C) -> Self {
        Self::with_http_and_cache(reqwest::Client::new(), base_url, cache)
    }

    /// Create a client with a custom HTTP client and cache.
    #[must_use]
    pub fn with_http_and_cache(http: reqwest::Client, base_url: &str, cache: C) -> Self {
        Self {
            http,
            cache: Arc::new(cache),
            base_url: normalize_base_url(base_url),
        }
    }

    /// The base URL every request is made against, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn body_url(&self, id: &str) -> String {
        format!(
            "{}celestial_bodies/{}",
            self.base_url,
            urlencoding::encode(id)
        )
    }

    fn bodies_url(&self) -> String {
        format!("{}celestial_bodies", self.base_url)
    }

    fn category_url(&self, category: &str) -> String {
        format!(
            "{}celestial_bodies?category={}",
            self.base_url,
            urlencoding::encode(category)
        )
    }

    fn ids_url(&self, ids: &[String]) -> String {
        format!(
            "{}celestial_bodies?ids={}",
            self.base_url,
            urlencoding::encode(&ids.join(","))
        )
    }

    fn categories_url(&self) -> String {
        format!("{}categories", self.base_url)
    }

    /// Fetch raw bytes, falling back to the cache when the network fails.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "fetching");

        match self.fetch_from_network(url).await {
            Ok(data) => {
                self.cache.put(url, data.clone()).await?;
                Ok(data)
            }
            Err(e @ Error::Http { .. }) => {
                if let Some(data) = self.cache.get(url).await? {
                    tracing::warn!(url, error = %e, "network unavailable, serving cached response");
                    return Ok(data);
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_from_network(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await.map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(data.to_vec())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str, context: &'static str) -> Result<T> {
        let data = self.fetch_bytes(url).await?;
        serde_json::from_slice(&data).map_err(|e| Error::Json {
            context,
            message: e.to_string(),
        })
    }

    /// Fetch a list of bodies, skipping records that fail to decode.
    async fn fetch_body_list(&self, url: &str) -> Result<Vec<CelestialBody>> {
        let records: Vec<serde_json::Value> = self.fetch_json(url, "body list").await?;
        Ok(decode_records(records))
    }

    async fn fetch_body(&self, id: &str) -> Result<CelestialBody> {
        let url = self.body_url(id);
        let mut body: CelestialBody = match self.fetch_json(&url, "celestial body").await {
            Err(Error::HttpStatus { status: 404, .. }) => {
                return Err(Error::NotFound { id: id.to_string() });
            }
            other => other?,
        };
        if body.id.is_empty() {
            body.id = id.to_string();
        }
        tracing::debug!(id, name = body.name, "celestial body loaded");
        Ok(body)
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<CelestialBody>> {
        let ids = unique_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let batches = ids.chunks(MAX_IDS_PER_QUERY).map(|chunk| {
            let url = self.ids_url(chunk);
            async move { self.fetch_body_list(&url).await }
        });

        let mut collected = HashMap::with_capacity(ids.len());
        for batch in join_all(batches).await {
            for body in batch? {
                collected.insert(body.id.clone(), body);
            }
        }
        Ok(in_request_order(&ids, collected))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let url = self.categories_url();
        let records: Vec<serde_json::Value> = self.fetch_json(&url, "category list").await?;
        let mut categories: Vec<Category> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Category>(record) {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::error!(error = %e, "skipping malformed category");
                    None
                }
            })
            .collect();
        categories.sort_by_key(|c| c.order);
        tracing::debug!(count = categories.len(), "categories loaded");
        Ok(categories)
    }
}

impl<C: Cache> Catalog for Client<C> {
    fn body<'a>(&'a self, id: &'a str) -> CatalogFuture<'a, CelestialBody> {
        Box::pin(self.fetch_body(id))
    }

    fn bodies(&self) -> CatalogFuture<'_, Vec<CelestialBody>> {
        Box::pin(async move {
            let bodies = self.fetch_body_list(&self.bodies_url()).await?;
            tracing::debug!(count = bodies.len(), "all celestial bodies loaded");
            Ok(bodies)
        })
    }

    fn bodies_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> CatalogFuture<'a, Vec<CelestialBody>> {
        Box::pin(async move {
            let bodies = self.fetch_body_list(&self.category_url(category)).await?;
            tracing::debug!(category, count = bodies.len(), "category loaded");
            Ok(bodies)
        })
    }

    fn bodies_by_ids<'a>(&'a self, ids: &'a [String]) -> CatalogFuture<'a, Vec<CelestialBody>> {
        Box::pin(self.fetch_by_ids(ids))
    }

    fn categories(&self) -> CatalogFuture<'_, Vec<Category>> {
        Box::pin(self.fetch_categories())
    }
}

fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}

fn decode_records(records: Vec<serde_json::Value>) -> Vec<CelestialBody> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<CelestialBody>(record) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!(error = %e, "skipping malformed celestial body");
                None
            }
        })
        .collect()
}
