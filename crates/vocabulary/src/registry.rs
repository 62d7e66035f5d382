use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use workwear_core::{DomainError, DomainResult, GarmentType, WorkerName};

/// Which vocabulary a registered name belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyKind {
    Type,
    Worker,
}

impl core::fmt::Display for VocabularyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VocabularyKind::Type => f.write_str("type"),
            VocabularyKind::Worker => f.write_str("worker"),
        }
    }
}

/// Explicitly registered names.
///
/// The `known_*` methods merge the registry with names derived from records,
/// supplied by the caller. Results are deduplicated and sorted, so listing
/// twice without a mutation in between yields the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularyRegistry {
    types: BTreeSet<GarmentType>,
    workers: BTreeSet<WorkerName>,
}

impl VocabularyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted names. Duplicates collapse.
    pub fn from_parts(
        types: impl IntoIterator<Item = GarmentType>,
        workers: impl IntoIterator<Item = WorkerName>,
    ) -> Self {
        Self {
            types: types.into_iter().collect(),
            workers: workers.into_iter().collect(),
        }
    }

    pub fn registered_types(&self) -> impl Iterator<Item = &GarmentType> {
        self.types.iter()
    }

    pub fn registered_workers(&self) -> impl Iterator<Item = &WorkerName> {
        self.workers.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.workers.is_empty()
    }

    /// Registered types merged with `derived` (types seen in records).
    pub fn known_types<'a>(
        &'a self,
        derived: impl IntoIterator<Item = &'a GarmentType>,
    ) -> Vec<GarmentType> {
        merge(&self.types, derived)
    }

    /// Registered workers merged with `derived` (workers seen in the ledger).
    pub fn known_workers<'a>(
        &'a self,
        derived: impl IntoIterator<Item = &'a WorkerName>,
    ) -> Vec<WorkerName> {
        merge(&self.workers, derived)
    }

    /// Register a type. Fails if it is already registered or present in
    /// `derived`.
    pub fn register_type<'a>(
        &mut self,
        name: GarmentType,
        derived: impl IntoIterator<Item = &'a GarmentType>,
    ) -> DomainResult<()> {
        if self.types.contains(&name) || derived.into_iter().any(|t| *t == name) {
            return Err(DomainError::duplicate(format!("type {name}")));
        }
        self.types.insert(name);
        Ok(())
    }

    /// Register a worker. Fails if it is already registered or present in
    /// `derived`.
    pub fn register_worker<'a>(
        &mut self,
        name: WorkerName,
        derived: impl IntoIterator<Item = &'a WorkerName>,
    ) -> DomainResult<()> {
        if self.workers.contains(&name) || derived.into_iter().any(|w| *w == name) {
            return Err(DomainError::duplicate(format!("worker {name}")));
        }
        self.workers.insert(name);
        Ok(())
    }
}

fn merge<'a, T>(registered: &'a BTreeSet<T>, derived: impl IntoIterator<Item = &'a T>) -> Vec<T>
where
    T: Ord + Clone + 'a,
{
    let mut all: BTreeSet<&T> = registered.iter().collect();
    all.extend(derived);
    all.into_iter().cloned().collect()
}
