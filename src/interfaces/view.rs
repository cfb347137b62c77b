//! Caller-facing shapes of expenses and reports.
//!
//! Storage bookkeeping (the revision counter) never leaves the crate through
//! these views.

use crate::application::expenses::Summary;
use crate::application::import::ImportReport;
use crate::domain::expense::{Expense, ExpenseId};
use crate::domain::member::{Member, MemberMap};
use crate::domain::money::{Amount, Balance};
use crate::domain::settlement::Transfer;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
    pub id: ExpenseId,
    pub amount: Amount,
    pub description: String,
    pub paid_by: Member,
    pub participants: Vec<Member>,
    pub is_active: bool,
}

impl From<&Expense> for ExpenseView {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            amount: expense.amount,
            description: expense.description.clone(),
            paid_by: expense.paid_by,
            participants: expense.participants.clone(),
            is_active: expense.is_active,
        }
    }
}

pub fn expense_views(expenses: &[Expense]) -> Vec<ExpenseView> {
    expenses.iter().map(ExpenseView::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberSummaryView {
    pub paid: MemberMap<Balance>,
    pub share: MemberMap<Balance>,
    pub balance: MemberMap<Balance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub expenses: Vec<ExpenseView>,
    pub total_amount: Decimal,
    pub member_summary: MemberSummaryView,
    pub balance_transactions: Vec<Transfer>,
}

impl From<&Summary> for SummaryView {
    fn from(summary: &Summary) -> Self {
        let report = &summary.report;
        Self {
            expenses: expense_views(&summary.expenses),
            total_amount: report.total_amount,
            member_summary: MemberSummaryView {
                paid: report.member_paid,
                share: report.member_share,
                balance: report.member_balance,
            },
            balance_transactions: report.transactions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowErrorView {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmappedNameView {
    pub row: usize,
    pub column: String,
    pub original: String,
    pub member: Member,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportView {
    pub created: Vec<ExpenseView>,
    pub errors: Vec<RowErrorView>,
    pub unmapped: Vec<UnmappedNameView>,
}

impl From<&ImportReport> for ImportView {
    fn from(report: &ImportReport) -> Self {
        Self {
            created: expense_views(&report.created),
            errors: report
                .errors
                .iter()
                .map(|e| RowErrorView {
                    row: e.row,
                    error: e.error.to_string(),
                })
                .collect(),
            unmapped: report
                .unmapped
                .iter()
                .map(|u| UnmappedNameView {
                    row: u.row,
                    column: u.field.to_string(),
                    original: u.original.clone(),
                    member: u.member,
                })
                .collect(),
        }
    }
}

/// What `import` prints: the per-row outcome followed by the new summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummaryView {
    #[serde(flatten)]
    pub import: ImportView,
    pub summary: SummaryView,
}
