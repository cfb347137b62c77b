use crate::domain::expense::{Expense, ExpenseDraft, ExpenseId};
use crate::domain::ports::ExpenseStore;
use crate::error::{Result, SplitError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing expense records.
pub const CF_EXPENSES: &str = "expenses";
/// Column Family for bookkeeping such as the id counter.
pub const CF_META: &str = "meta";

const NEXT_ID_KEY: &[u8] = b"next_id";

/// A persistent expense store backed by RocksDB.
///
/// Records are stored as JSON under their big-endian id so iteration order is
/// id order. `Clone` shares the underlying `Arc<DB>`; id allocation is
/// serialized through a shared lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    id_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("expenses" and "meta") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_expenses = ColumnFamilyDescriptor::new(CF_EXPENSES, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_expenses, cf_meta])?;

        Ok(Self {
            db: Arc::new(db),
            id_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            SplitError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    fn put(&self, expense: &Expense) -> Result<()> {
        let value = serde_json::to_vec(expense).map_err(|e| {
            SplitError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;
        self.db
            .put_cf(self.cf(CF_EXPENSES)?, expense.id.0.to_be_bytes(), value)?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<Expense> {
        serde_json::from_slice(bytes).map_err(|e| {
            SplitError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Deserialization error: {}", e),
            )))
        })
    }

    fn allocate_id(&self) -> Result<ExpenseId> {
        let meta = self.cf(CF_META)?;
        let current = match self.db.get_cf(meta, NEXT_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    SplitError::InternalError(Box::new(std::io::Error::other(
                        "Corrupted id counter",
                    )))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = current + 1;
        self.db.put_cf(meta, NEXT_ID_KEY, next.to_be_bytes())?;
        Ok(ExpenseId(next))
    }
}

#[async_trait]
impl ExpenseStore for RocksDBStore {
    async fn create(&self, draft: ExpenseDraft) -> Result<Expense> {
        let _guard = self.id_lock.lock().await;
        let id = self.allocate_id()?;

        // A stale counter must never overwrite an existing record
        if self
            .db
            .get_pinned_cf(self.cf(CF_EXPENSES)?, id.0.to_be_bytes())?
            .is_some()
        {
            return Err(SplitError::DuplicateError(id));
        }

        let expense = Expense::from_draft(id, draft);
        self.put(&expense)?;
        Ok(expense)
    }

    async fn replace(&self, mut expense: Expense) -> Result<Expense> {
        let current = self
            .get(expense.id)
            .await?
            .ok_or(SplitError::NotFoundError(expense.id))?;
        expense.revision = current.revision + 1;
        self.put(&expense)?;
        Ok(expense)
    }

    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>> {
        match self.db.get_cf(self.cf(CF_EXPENSES)?, id.0.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Expense>> {
        let handle = self.cf(CF_EXPENSES)?;
        let mut expenses = Vec::new();

        for item in self.db.iterator_cf(handle, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            expenses.push(Self::decode(&value)?);
        }

        Ok(expenses)
    }
}
