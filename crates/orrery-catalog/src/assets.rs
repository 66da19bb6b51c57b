//! Local storage of downloaded 3D model files.
//!
//! Model references in the catalog are either absolute `http(s)` URLs or
//! storage paths relative to the asset host. Files are cached under a fixed
//! name derived from the reference, so a model is downloaded at most once.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::cache::hex_prefix;
use crate::error::{Error, Result};

/// Build the cache file name for a model reference.
///
/// The name is `model_` followed by the hex of the first 16 bytes of the
/// SHA-256 of the reference, plus `.gltf` or `.glb` depending on the
/// reference (`.glb` when neither appears).
#[must_use]
pub fn cache_file_name(reference: &str) -> String {
    let lower = reference.to_lowercase();
    let extension = if lower.contains(".gltf") {
        ".gltf"
    } else {
        ".glb"
    };
    let digest = Sha256::digest(reference.as_bytes());
    format!("model_{}{extension}", hex_prefix(&digest, 16))
}

/// Downloads model files on demand and keeps them on disk.
#[derive(Debug, Clone)]
pub struct AssetStore {
    http: reqwest::Client,
    cache_dir: PathBuf,
    base_url: Option<String>,
}

impl AssetStore {
    /// Create a store that keeps files in `cache_dir`.
    ///
    /// `base_url` resolves relative storage paths; without it only absolute
    /// URLs can be downloaded.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, base_url: Option<&str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            cache_dir: cache_dir.into(),
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    /// The directory model files are stored in.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The path a reference is (or would be) cached at.
    #[must_use]
    pub fn local_path(&self, reference: &str) -> PathBuf {
        self.cache_dir.join(cache_file_name(reference))
    }

    /// Turn a model reference into a downloadable URL.
    pub fn resolve_url(&self, reference: &str) -> Result<String> {
        let reference = reference.trim();
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(reference.to_string());
        }
        if reference.contains("://") {
            return Err(Error::InvalidData {
                context: "model reference",
                detail: format!("unsupported scheme in {reference}"),
            });
        }
        let Some(base_url) = &self.base_url else {
            return Err(Error::InvalidData {
                context: "model reference",
                detail: format!("relative reference {reference} without an asset host"),
            });
        };
        Ok(format!("{base_url}/{}", reference.trim_start_matches('/')))
    }

    /// Return the local file for a model, downloading it if needed.
    pub async fn fetch(&self, reference: &str) -> Result<PathBuf> {
        let path = self.local_path(reference);
        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Error::io(&path, &e))?
        {
            tracing::debug!(reference, path = %path.display(), "model cache hit");
            return Ok(path);
        }

        let url = self.resolve_url(reference)?;
        tracing::debug!(url, "downloading model");

        let response = self.http.get(&url).send().await.map_err(|e| Error::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        let data = response.bytes().await.map_err(|e| Error::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| Error::io(&self.cache_dir, &e))?;

        // Every download gets its own scratch file, so concurrent fetches of
        // one reference never write into or rename each other's data.
        let partial = tempfile::Builder::new()
            .prefix(".model_")
            .suffix(".part")
            .tempfile_in(&self.cache_dir)
            .map_err(|e| Error::io(&self.cache_dir, &e))?
            .into_temp_path();
        tokio::fs::write(&partial, &data)
            .await
            .map_err(|e| Error::io(&partial, &e))?;
        if let Err(e) = partial.persist(&path) {
            // Losing the race to an identical download is fine.
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Err(Error::io(&path, &e.error));
            }
        }

        tracing::info!(url, bytes = data.len(), "model downloaded");
        Ok(path)
    }
}
