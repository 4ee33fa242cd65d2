//! Bundle persistence.
//!
//! The data source talks to storage through [`BundleStore`] so the file can be swapped for an
//! in-memory bundle in tests and in sample mode.

use crate::{CoreError, CoreResult};
use fhir::Bundle;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Whole-document storage for the backing bundle.
pub trait BundleStore: Send + Sync {
    /// Read the current bundle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BundleNotFound`] when there is no bundle to read, and other variants
    /// for I/O or parse failures.
    fn load(&self) -> CoreResult<Bundle>;

    /// Replace the stored bundle.
    fn save(&self, bundle: &Bundle) -> CoreResult<()>;

    /// Human-readable location, used in log lines.
    fn describe(&self) -> String;
}

/// A single JSON document on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BundleStore for JsonFileStore {
    fn load(&self) -> CoreResult<Bundle> {
        let contents = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CoreError::BundleNotFound(self.path.display().to_string()),
            _ => CoreError::FileRead(e),
        })?;
        Ok(Bundle::parse(&contents)?)
    }

    fn save(&self, bundle: &Bundle) -> CoreResult<()> {
        let rendered = bundle.render()?;
        fs::write(&self.path, rendered).map_err(CoreError::FileWrite)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An in-memory bundle. `None` behaves like a missing file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bundle: Mutex<Option<Bundle>>,
}

impl MemoryStore {
    pub fn new(bundle: Bundle) -> Self {
        Self {
            bundle: Mutex::new(Some(bundle)),
        }
    }

    /// A store with nothing in it; `load` reports [`CoreError::BundleNotFound`].
    pub fn missing() -> Self {
        Self::default()
    }
}

impl BundleStore for MemoryStore {
    fn load(&self) -> CoreResult<Bundle> {
        let guard = self
            .bundle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .clone()
            .ok_or_else(|| CoreError::BundleNotFound(self.describe()))
    }

    fn save(&self, bundle: &Bundle) -> CoreResult<()> {
        let mut guard = self
            .bundle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(bundle.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
