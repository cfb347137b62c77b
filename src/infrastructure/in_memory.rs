use crate::domain::expense::{Expense, ExpenseDraft, ExpenseId};
use crate::domain::ports::ExpenseStore;
use crate::error::{Result, SplitError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for expenses.
///
/// Uses `Arc<RwLock<BTreeMap<ExpenseId, Expense>>>` so clones share state and
/// listings come back in id order. Ideal for tests and one-shot CLI runs.
#[derive(Default, Clone)]
pub struct InMemoryExpenseStore {
    expenses: Arc<RwLock<BTreeMap<ExpenseId, Expense>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryExpenseStore {
    /// Creates a new, empty in-memory expense store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn create(&self, draft: ExpenseDraft) -> Result<Expense> {
        let id = ExpenseId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut expenses = self.expenses.write().await;
        match expenses.entry(id) {
            Entry::Occupied(_) => Err(SplitError::DuplicateError(id)),
            Entry::Vacant(slot) => Ok(slot.insert(Expense::from_draft(id, draft)).clone()),
        }
    }

    async fn replace(&self, mut expense: Expense) -> Result<Expense> {
        let mut expenses = self.expenses.write().await;
        let current = expenses
            .get_mut(&expense.id)
            .ok_or(SplitError::NotFoundError(expense.id))?;
        expense.revision = current.revision + 1;
        *current = expense.clone();
        Ok(expense)
    }

    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Expense>> {
        let expenses = self.expenses.read().await;
        Ok(expenses.values().cloned().collect())
    }
}
