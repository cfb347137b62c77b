use crate::domain::expense::{
    Expense, ExpenseId, ExpensePatch, ExpenseQuery, NewExpense, validate_and_normalize,
};
use crate::domain::ports::ExpenseStoreBox;
use crate::domain::settlement::{SettlementPolicy, SettlementReport, compute_summary};
use crate::error::{Result, SplitError};
use tracing::debug;

/// A settlement report together with the expenses it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub expenses: Vec<Expense>,
    pub report: SettlementReport,
}

/// The entry point for managing expenses and settling up.
///
/// `ExpenseService` owns the storage backend and runs every write through
/// validation before it reaches the store.
pub struct ExpenseService {
    store: ExpenseStoreBox,
    policy: SettlementPolicy,
}

impl ExpenseService {
    /// Creates a new `ExpenseService` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The store for expense records.
    /// * `policy` - Epsilon and rounding used when computing summaries.
    pub fn new(store: ExpenseStoreBox, policy: SettlementPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &SettlementPolicy {
        &self.policy
    }

    /// Validates and persists a new expense.
    pub async fn create(&self, expense: NewExpense) -> Result<Expense> {
        let draft = expense.validate()?;
        let created = self.store.create(draft).await?;
        debug!(id = %created.id, amount = %created.amount, "expense created");
        Ok(created)
    }

    pub async fn find_by_id(&self, id: ExpenseId) -> Result<Expense> {
        self.store
            .get(id)
            .await?
            .ok_or(SplitError::NotFoundError(id))
    }

    /// Lists expenses matching `query`, newest first.
    pub async fn find_all(&self, query: &ExpenseQuery) -> Result<Vec<Expense>> {
        let mut expenses = self.store.get_all().await?;
        expenses.retain(|e| query.matches(e));
        expenses.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(expenses)
    }

    /// Applies a field-level update, re-validating the merged record.
    pub async fn update(&self, id: ExpenseId, patch: ExpensePatch) -> Result<Expense> {
        let mut expense = self.find_by_id(id).await?;
        let draft = validate_and_normalize(patch, Some(&expense.draft()))?;
        expense.apply(draft);
        let updated = self.store.replace(expense).await?;
        debug!(id = %updated.id, revision = updated.revision, "expense updated");
        Ok(updated)
    }

    /// Soft-deletes an expense by marking it inactive.
    pub async fn remove(&self, id: ExpenseId) -> Result<Expense> {
        let mut expense = self.find_by_id(id).await?;
        if !expense.is_active {
            return Ok(expense);
        }
        expense.is_active = false;
        let removed = self.store.replace(expense).await?;
        debug!(id = %removed.id, "expense deactivated");
        Ok(removed)
    }

    /// Computes the settlement report over all active expenses.
    pub async fn summary(&self) -> Result<Summary> {
        let expenses = self.store.list_active().await?;
        let report = compute_summary(&expenses, &self.policy);
        debug!(
            expenses = expenses.len(),
            transfers = report.transactions.len(),
            "summary computed"
        );
        Ok(Summary { expenses, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::Member;
    use crate::domain::money::Balance;
    use crate::infrastructure::in_memory::InMemoryExpenseStore;
    use rust_decimal_macros::dec;

    fn service() -> ExpenseService {
        ExpenseService::new(
            Box::new(InMemoryExpenseStore::new()),
            SettlementPolicy::default(),
        )
    }

    fn lunch(paid_by: Member, participants: Vec<Member>) -> NewExpense {
        NewExpense {
            amount: dec!(120),
            description: "Lunch".to_string(),
            paid_by,
            participants,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payer() {
        let service = service();
        let result = service
            .create(lunch(Member::Hai, vec![Member::Hong, Member::Binh]))
            .await;
        assert!(matches!(result, Err(SplitError::ValidationError(_))));
        assert!(service.find_all(&ExpenseQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_expense() {
        let service = service();
        let result = service.update(ExpenseId(7), ExpensePatch::default()).await;
        assert!(matches!(result, Err(SplitError::NotFoundError(ExpenseId(7)))));
    }

    #[tokio::test]
    async fn test_remove_missing_expense() {
        let result = service().remove(ExpenseId(7)).await;
        assert!(matches!(result, Err(SplitError::NotFoundError(ExpenseId(7)))));
    }

    #[tokio::test]
    async fn test_update_validates_merged_state() {
        let service = service();
        let expense = service
            .create(lunch(Member::Hong, vec![Member::Hong, Member::Binh]))
            .await
            .unwrap();

        let bad = ExpensePatch {
            participants: Some(vec![Member::Binh, Member::Minh]),
            ..Default::default()
        };
        assert!(matches!(
            service.update(expense.id, bad).await,
            Err(SplitError::ValidationError(_))
        ));

        let good = ExpensePatch {
            amount: Some(dec!(200)),
            participants: Some(vec![Member::Hong, Member::Minh]),
            ..Default::default()
        };
        let updated = service.update(expense.id, good).await.unwrap();
        assert_eq!(updated.amount.value(), dec!(200));
        assert_eq!(updated.participants, vec![Member::Hong, Member::Minh]);
        assert_eq!(updated.revision, 1);
    }

    #[tokio::test]
    async fn test_remove_is_soft_and_excluded_from_summary() {
        let service = service();
        let kept = service
            .create(lunch(Member::Hong, vec![Member::Hong, Member::Binh]))
            .await
            .unwrap();
        let removed = service
            .create(lunch(Member::Minh, vec![Member::Minh, Member::Binh]))
            .await
            .unwrap();

        service.remove(removed.id).await.unwrap();
        // Removing twice is harmless
        let again = service.remove(removed.id).await.unwrap();
        assert!(!again.is_active);
        assert_eq!(again.revision, 1);

        let still_there = service.find_by_id(removed.id).await.unwrap();
        assert!(!still_there.is_active);

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.expenses.len(), 1);
        assert_eq!(summary.expenses[0].id, kept.id);
        assert_eq!(summary.report.total_amount, dec!(120));
        assert_eq!(summary.report.member_balance[Member::Minh], Balance::ZERO);
    }

    #[tokio::test]
    async fn test_find_all_filters_and_orders_newest_first() {
        let service = service();
        let first = service
            .create(lunch(Member::Hong, vec![Member::Hong, Member::Binh]))
            .await
            .unwrap();
        let second = service
            .create(NewExpense {
                description: "Cinema tickets".to_string(),
                ..lunch(Member::Binh, vec![Member::Hong, Member::Binh])
            })
            .await
            .unwrap();

        let all = service.find_all(&ExpenseQuery::default()).await.unwrap();
        assert_eq!(
            all.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );

        let by_payer = service
            .find_all(&ExpenseQuery {
                paid_by: Some(Member::Hong),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_payer.len(), 1);
        assert_eq!(by_payer[0].id, first.id);

        let searched = service
            .find_all(&ExpenseQuery {
                search: Some("cinema".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].id, second.id);
    }

    #[tokio::test]
    async fn test_summary_of_empty_store() {
        let summary = service().summary().await.unwrap();
        assert!(summary.expenses.is_empty());
        assert_eq!(summary.report, SettlementReport::default());
    }
}
