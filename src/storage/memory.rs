//! In-process table implementing the gateway contract.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::gateway::{Predicate, StorageGateway, StoredRow};
use crate::error::{CacheError, Result};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: Vec<(i64, StoredRow)>,
}

// == Memory Gateway ==
/// Volatile gateway with the same semantics as the SQLite one.
///
/// `set_failing(true)` makes every subsequent call fail with a storage error,
/// so callers can prove that failures surface instead of reading as "absent".
#[derive(Debug, Default)]
pub struct MemoryGateway {
    table: RwLock<Table>,
    failing: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles failure injection.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, op: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Storage(format!("{} failed: injected failure", op)));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>> {
        self.table
            .read()
            .map_err(|_| CacheError::Storage("table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>> {
        self.table
            .write()
            .map_err(|_| CacheError::Storage("table lock poisoned".to_string()))
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn insert(&self, row: StoredRow) -> Result<i64> {
        self.check("insert")?;
        let mut table = self.write()?;
        table.next_id += 1;
        let id = table.next_id;
        table.rows.push((id, row));
        Ok(id)
    }

    async fn update_where(&self, predicate: Predicate, row: StoredRow) -> Result<u64> {
        self.check("update")?;
        let mut table = self.write()?;
        let mut affected = 0;
        for (_, stored) in table.rows.iter_mut() {
            if predicate.matches(stored) {
                *stored = row.clone();
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete_where(&self, predicate: Predicate) -> Result<u64> {
        self.check("delete")?;
        let mut table = self.write()?;
        let before = table.rows.len();
        table.rows.retain(|(_, stored)| !predicate.matches(stored));
        Ok((before - table.rows.len()) as u64)
    }

    async fn query_where(&self, predicate: Predicate) -> Result<Vec<StoredRow>> {
        self.check("query")?;
        let table = self.read()?;
        Ok(table
            .rows
            .iter()
            .filter(|(_, stored)| predicate.matches(stored))
            .map(|(_, stored)| stored.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        self.check("count")?;
        Ok(self.read()?.rows.len() as u64)
    }
}
