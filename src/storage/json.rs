//! JSON file-based catalog cache.
//!
//! Keeps the last fetched catalog so the plugin can browse offline and the
//! worker can serve `other` and search pages without a round trip. Writes go
//! to a temporary file that is then renamed over the real one.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "fetched_at": "2025-03-02T10:15:00.000Z",
//!   "products": [
//!     { "id": "5d6c…", "title": "Left Femur", "status": "published", … }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::{MedshelfError, Result};
use crate::domain::ProductRecord;
use crate::storage::backend::Storage;

/// Current cache format version.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    version: u32,

    #[serde(default)]
    fetched_at: Option<String>,

    /// Products in the order the catalog service listed them.
    #[serde(default)]
    products: Vec<ProductRecord>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            fetched_at: None,
            products: Vec::new(),
        }
    }
}

/// JSON file storage backend.
///
/// The whole catalog lives in memory and is persisted after every change.
/// Used from the worker thread only.
pub struct JsonStorage {
    file_path: PathBuf,
    data: StorageData,
    dirty: bool,
}

impl JsonStorage {
    /// Opens the cache at `file_path`, creating parent directories.
    ///
    /// A missing file yields an empty cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file exists
    /// but is not a valid cache.
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "opening catalog cache");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("no cache on disk, starting empty");
            StorageData::default()
        };

        Ok(Self {
            file_path,
            data,
            dirty: false,
        })
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| MedshelfError::Storage(format!("failed to parse JSON: {e}")))?;

        if data.version > FORMAT_VERSION {
            return Err(MedshelfError::Storage(format!(
                "cache format {} is newer than supported {FORMAT_VERSION}",
                data.version
            )));
        }

        tracing::debug!(
            version = data.version,
            products = data.products.len(),
            "loaded catalog cache"
        );
        Ok(data)
    }

    fn save_to_file(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| MedshelfError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "catalog cache saved");
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl Storage for JsonStorage {
    fn replace_products(&mut self, products: Vec<ProductRecord>) -> Result<usize> {
        let _span = tracing::debug_span!("json_replace_products", count = products.len()).entered();

        let count = products.len();
        if self.data.products == products {
            tracing::debug!("catalog unchanged");
            return Ok(count);
        }

        self.data.products = products;
        self.data.fetched_at = Some(chrono::Utc::now().to_rfc3339());
        self.dirty = true;
        self.save_to_file()?;
        Ok(count)
    }

    fn get_all_products(&self) -> Result<Vec<ProductRecord>> {
        Ok(self.data.products.clone())
    }

    fn get_product(&self, id: &str) -> Result<Option<ProductRecord>> {
        Ok(self.data.products.iter().find(|p| p.id == id).cloned())
    }

    fn insert_product(&mut self, product: ProductRecord) -> Result<()> {
        let _span = tracing::debug_span!("json_insert_product", id = %product.id).entered();

        if self.data.products.iter().any(|p| p.id == product.id) {
            return Err(MedshelfError::Storage(format!(
                "product already exists: {}",
                product.id
            )));
        }

        self.data.products.push(product);
        self.dirty = true;
        self.save_to_file()
    }

    fn fetched_at(&self) -> Option<String> {
        self.data.fetched_at.clone()
    }
}

impl Drop for JsonStorage {
    fn drop(&mut self) {
        if self.dirty {
            tracing::debug!("saving dirty data on drop");
            if let Err(e) = self.save_to_file() {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}
