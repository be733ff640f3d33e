//! Session-scoped memoized load.
//!
//! The dataset is loaded on first access and shared read-only afterwards.
//! Concurrent first accesses block on a single load. A failed load is
//! cached too: the session never retries.

use std::fmt;

use once_cell::sync::OnceCell;

use crate::config::DataConfig;
use crate::error::LoadError;
use crate::loader;
use crate::lookup::LookupTables;
use crate::types::CollisionRecord;

/// The denormalized collision table and the lookup tables it was built from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<CollisionRecord>,
    pub lookups: LookupTables,
}

type LoadFn = Box<dyn Fn() -> Result<Dataset, LoadError> + Send + Sync>;

pub struct Session {
    load: LoadFn,
    dataset: OnceCell<Result<Dataset, LoadError>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("loaded", &self.dataset.get().is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// A session reading the files named in `data`.
    #[must_use]
    pub fn new(data: &DataConfig) -> Self {
        let fact = data.fact_table.clone();
        let workbook = data.lookup_workbook.clone();
        Self::with_loader(move || {
            loader::load(&fact, &workbook).map(|(records, lookups)| Dataset { records, lookups })
        })
    }

    /// A session with a custom load function.
    pub fn with_loader<F>(load: F) -> Self
    where
        F: Fn() -> Result<Dataset, LoadError> + Send + Sync + 'static,
    {
        Self {
            load: Box::new(load),
            dataset: OnceCell::new(),
        }
    }

    /// The dataset, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns the cached [`LoadError`] if the one load attempt failed.
    pub fn dataset(&self) -> Result<&Dataset, &LoadError> {
        self.dataset.get_or_init(|| (self.load)()).as_ref()
    }

    /// Whether the load has been attempted.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }
}
