//! Favorite body ids persisted to a small JSON file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A set of favorite body ids stored on disk.
///
/// Every mutation rewrites the file. A missing file reads as an empty set.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl FavoritesStore {
    /// Open the store at `path`, loading any existing favorites.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ids = match tokio::fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data).map_err(|e| Error::Json {
                context: "favorites file",
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(Error::io(&path, &e)),
        };
        Ok(Self { path, ids })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Favorite ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub async fn add(&mut self, id: &str) -> Result<()> {
        if self.ids.insert(id.to_string()) {
            self.save().await?;
        }
        Ok(())
    }

    pub async fn remove(&mut self, id: &str) -> Result<()> {
        if self.ids.remove(id) {
            self.save().await?;
        }
        Ok(())
    }

    /// Flip the favorite state of `id`. Returns whether it is now a favorite.
    pub async fn toggle(&mut self, id: &str) -> Result<bool> {
        if self.contains(id) {
            self.remove(id).await?;
            Ok(false)
        } else {
            self.add(id).await?;
            Ok(true)
        }
    }

    async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, &e))?;
        }
        let data = serde_json::to_vec_pretty(&self.ids)?;
        tokio::fs::write(&self.path, data)
            .await
            .map_err(|e| Error::io(&self.path, &e))
    }
}
