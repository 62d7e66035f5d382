use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use workwear_inventory::InventoryStore;
use workwear_issuance::IssuanceLedger;
use workwear_vocabulary::VocabularyRegistry;

use super::{TableError, TableStore, Tables};

/// In-memory table store for tests/dev.
///
/// Writes can be made to fail on demand to exercise persistence errors.
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    inner: RwLock<Tables>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-populated tables.
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            inner: RwLock::new(tables),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of what is currently "on disk".
    pub fn snapshot(&self) -> Tables {
        match self.inner.read() {
            Ok(tables) => tables.clone(),
            Err(_) => Tables::default(),
        }
    }

    fn write(&self, update: impl FnOnce(&mut Tables)) -> Result<(), TableError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TableError::Unavailable("writes disabled".to_string()));
        }
        let mut tables = self
            .inner
            .write()
            .map_err(|_| TableError::Unavailable("lock poisoned".to_string()))?;
        update(&mut tables);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl TableStore for InMemoryTableStore {
    fn load(&self) -> Result<Tables, TableError> {
        let tables = self
            .inner
            .read()
            .map_err(|_| TableError::Unavailable("lock poisoned".to_string()))?;
        Ok(tables.clone())
    }

    fn save_inventory(&self, inventory: &InventoryStore) -> Result<(), TableError> {
        self.write(|tables| tables.inventory = inventory.clone())
    }

    fn save_issuance(&self, ledger: &IssuanceLedger) -> Result<(), TableError> {
        self.write(|tables| tables.ledger = ledger.clone())
    }

    fn save_vocabulary(&self, vocabulary: &VocabularyRegistry) -> Result<(), TableError> {
        self.write(|tables| {
            tables.vocabulary = vocabulary.clone();
            tables.migrated_placeholders = false;
        })
    }
}
