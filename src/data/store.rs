//! Dataset Store Module
//! Memoizes the loaded and cleaned datasets for the process lifetime.

use crate::data::cleaner::{CleanedDataset, DatasetCleaner};
use crate::data::loader::{DataSourceError, RawDataset, TransactionLoader};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lazily-initialized holder for the raw and cleaned datasets.
///
/// Each accessor computes at most once per store, even when the first access
/// happens on a background thread; later calls return the cached `Arc`.
/// A failed load is not cached, so the next render may retry.
pub struct DatasetStore {
    path: PathBuf,
    raw: OnceCell<Arc<RawDataset>>,
    cleaned: OnceCell<Arc<CleanedDataset>>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            raw: OnceCell::new(),
            cleaned: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.raw.get().is_some()
    }

    /// The raw dataset, reading the source on first access only.
    pub fn get_or_load(&self) -> Result<Arc<RawDataset>, DataSourceError> {
        self.raw
            .get_or_try_init(|| TransactionLoader::load(&self.path).map(Arc::new))
            .cloned()
    }

    /// The cleaned dataset, derived from the raw dataset on first access only.
    pub fn get_or_clean(&self) -> Result<Arc<CleanedDataset>, DataSourceError> {
        let raw = self.get_or_load()?;
        Ok(self
            .cleaned
            .get_or_init(|| Arc::new(DatasetCleaner::clean(&raw)))
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "Invoice,Description,Quantity,Price,Customer ID,InvoiceDate,Country\n\
                          1,MUG,2,2.50,100,2011-01-05 10:00:00,United Kingdom\n";

    #[test]
    fn load_happens_at_most_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file.flush().unwrap();

        let store = DatasetStore::new(file.path());
        let first = store.get_or_load().unwrap();

        // Remove the source; the memoized dataset must still be served.
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());

        let second = store.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn cleaned_dataset_is_memoized_too() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file.flush().unwrap();

        let store = DatasetStore::new(file.path());
        let first = store.get_or_clean().unwrap();
        let second = store.get_or_clean().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retail.csv");

        let store = DatasetStore::new(&path);
        assert!(store.get_or_load().is_err());
        assert!(!store.is_loaded());

        std::fs::write(&path, SAMPLE).unwrap();
        let raw = store.get_or_load().unwrap();
        assert_eq!(raw.len(), 1);
        assert!(store.is_loaded());
    }
}
