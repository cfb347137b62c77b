use super::member::Member;
use super::money::Amount;
use crate::error::{Result, SplitError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_DESCRIPTION_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored expense.
///
/// Expenses are never erased: removal flips `is_active` to false and the
/// record stays in the store. `revision` is bumped by the store on every
/// write after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Amount,
    pub description: String,
    pub paid_by: Member,
    pub participants: Vec<Member>,
    pub is_active: bool,
    #[serde(default)]
    pub revision: u32,
}

impl Expense {
    pub fn from_draft(id: ExpenseId, draft: ExpenseDraft) -> Self {
        Self {
            id,
            amount: draft.amount,
            description: draft.description,
            paid_by: draft.paid_by,
            participants: draft.participants,
            is_active: draft.is_active,
            revision: 0,
        }
    }

    /// Returns the validated fields of this record, without storage metadata.
    pub fn draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            amount: self.amount,
            description: self.description.clone(),
            paid_by: self.paid_by,
            participants: self.participants.clone(),
            is_active: self.is_active,
        }
    }

    /// Replaces the validated fields, keeping id and revision.
    pub fn apply(&mut self, draft: ExpenseDraft) {
        self.amount = draft.amount;
        self.description = draft.description;
        self.paid_by = draft.paid_by;
        self.participants = draft.participants;
        self.is_active = draft.is_active;
    }
}

/// Input for creating an expense.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewExpense {
    pub amount: Decimal,
    pub description: String,
    pub paid_by: Member,
    pub participants: Vec<Member>,
}

/// Field-level changes to an expense. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpensePatch {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub paid_by: Option<Member>,
    pub participants: Option<Vec<Member>>,
    pub is_active: Option<bool>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self == &ExpensePatch::default()
    }
}

impl From<NewExpense> for ExpensePatch {
    fn from(expense: NewExpense) -> Self {
        Self {
            amount: Some(expense.amount),
            description: Some(expense.description),
            paid_by: Some(expense.paid_by),
            participants: Some(expense.participants),
            is_active: Some(true),
        }
    }
}

/// A validated, normalized expense ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: Amount,
    pub description: String,
    pub paid_by: Member,
    pub participants: Vec<Member>,
    pub is_active: bool,
}

impl NewExpense {
    pub fn validate(self) -> Result<ExpenseDraft> {
        validate_and_normalize(self.into(), None)
    }
}

/// Validates a candidate against the state it would produce.
///
/// With no `existing` record every field except `is_active` is required.
/// With an existing record, absent fields are taken from it and the rules
/// are checked on the merged result, so changing only `paid_by` or only
/// `participants` cannot break the payer invariant.
pub fn validate_and_normalize(
    candidate: ExpensePatch,
    existing: Option<&ExpenseDraft>,
) -> Result<ExpenseDraft> {
    let amount = match (candidate.amount, existing) {
        (Some(value), _) => Amount::new(value)?,
        (None, Some(existing)) => existing.amount,
        (None, None) => return Err(SplitError::validation("Amount is required")),
    };

    let description = match (candidate.description, existing) {
        (Some(text), _) => normalize_description(&text)?,
        (None, Some(existing)) => existing.description.clone(),
        (None, None) => return Err(SplitError::validation("Description is required")),
    };

    let participants = match (candidate.participants, existing) {
        (Some(list), _) => list,
        (None, Some(existing)) => existing.participants.clone(),
        (None, None) => Vec::new(),
    };
    if participants.is_empty() {
        return Err(SplitError::validation(
            "An expense needs at least one participant",
        ));
    }

    let paid_by = match (candidate.paid_by, existing) {
        (Some(member), _) => member,
        (None, Some(existing)) => existing.paid_by,
        (None, None) => return Err(SplitError::validation("Payer is required")),
    };
    if !participants.contains(&paid_by) {
        return Err(SplitError::validation(
            "Payer must be one of the participants",
        ));
    }

    let is_active = candidate
        .is_active
        .or(existing.map(|e| e.is_active))
        .unwrap_or(true);

    Ok(ExpenseDraft {
        amount,
        description,
        paid_by,
        participants,
        is_active,
    })
}

fn normalize_description(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(SplitError::validation(format!(
            "Description must be at least {} characters",
            MIN_DESCRIPTION_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Filters for listing expenses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseQuery {
    pub is_active: Option<bool>,
    pub paid_by: Option<Member>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
}

impl ExpenseQuery {
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if self.is_active.is_some_and(|active| expense.is_active != active) {
            return false;
        }
        if self.paid_by.is_some_and(|member| expense.paid_by != member) {
            return false;
        }
        match &self.search {
            Some(needle) => expense
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
