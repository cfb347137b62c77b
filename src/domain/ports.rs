use super::expense::{Expense, ExpenseDraft, ExpenseId};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for expense records.
///
/// Stores never validate business rules; callers hand them drafts that have
/// already passed [`validate_and_normalize`](super::expense::validate_and_normalize).
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Persists a new expense under a freshly allocated id.
    async fn create(&self, draft: ExpenseDraft) -> Result<Expense>;
    /// Overwrites an existing expense, bumping its revision.
    async fn replace(&self, expense: Expense) -> Result<Expense>;
    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>>;
    /// Every stored expense, active or not, in id order.
    async fn get_all(&self) -> Result<Vec<Expense>>;

    async fn list_active(&self) -> Result<Vec<Expense>> {
        let mut expenses = self.get_all().await?;
        expenses.retain(|e| e.is_active);
        Ok(expenses)
    }
}

pub type ExpenseStoreBox = Box<dyn ExpenseStore>;
pub type ExpenseStoreFactory = Box<dyn Fn() -> ExpenseStoreBox + Send + Sync>;
