use super::expenses::ExpenseService;
use crate::domain::expense::{Expense, NewExpense};
use crate::domain::member::Member;
use crate::error::{Result, SplitError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// One spreadsheet row, as loosely typed as the sheet itself.
///
/// Every cell is optional text; coercion happens in [`ExpenseRow::to_new_expense`]
/// so a bad cell fails its own row rather than the whole sheet. The localized
/// headers used by the original sheets are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseRow {
    #[serde(rename = "Amount", alias = "Số tiền", default)]
    pub amount: Option<String>,
    #[serde(rename = "Description", alias = "Mô tả", default)]
    pub description: Option<String>,
    #[serde(rename = "Paid By", alias = "Người thanh toán", default)]
    pub paid_by: Option<String>,
    #[serde(rename = "Participants", alias = "Người tham gia", default)]
    pub participants: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    PaidBy,
    Participants,
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowField::PaidBy => f.write_str("Paid By"),
            RowField::Participants => f.write_str("Participants"),
        }
    }
}

/// A name that was not recognized and was accounted under [`Member::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedName {
    pub row: usize,
    pub field: RowField,
    pub original: String,
    pub member: Member,
}

#[derive(Error, Debug)]
#[error("row {row}: {error}")]
pub struct RowImportError {
    /// 1-based position among the data rows.
    pub row: usize,
    #[source]
    pub error: SplitError,
}

/// Outcome of an import: what was created, what failed, and which names
/// were lossily mapped. All three follow input row order.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: Vec<Expense>,
    pub errors: Vec<RowImportError>,
    pub unmapped: Vec<UnmappedName>,
}

impl ExpenseRow {
    /// Coerces the row into a creation request.
    ///
    /// Names that fall back to [`Member::Other`] are appended to `unmapped`
    /// even if the row later fails on a missing payer or a bad amount.
    pub fn to_new_expense(&self, row: usize, unmapped: &mut Vec<UnmappedName>) -> Result<NewExpense> {
        let paid_by =
            non_blank(&self.paid_by).map(|name| resolve(name, row, RowField::PaidBy, unmapped));

        let participants = non_blank(&self.participants)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| resolve(name, row, RowField::Participants, unmapped))
                    .collect()
            })
            .unwrap_or_default();

        let paid_by = paid_by.ok_or_else(|| SplitError::validation("Payer is missing"))?;

        let amount = match non_blank(&self.amount) {
            Some(raw) => parse_amount(raw)?,
            None => return Err(SplitError::validation("Amount is missing")),
        };

        Ok(NewExpense {
            amount,
            description: self.description.clone().unwrap_or_default(),
            paid_by,
            participants,
        })
    }
}

fn non_blank(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn resolve(name: &str, row: usize, field: RowField, unmapped: &mut Vec<UnmappedName>) -> Member {
    match Member::from_name(name) {
        Some(member) => member,
        None => {
            let member = Member::Other;
            debug!(row, field = %field, name, "unrecognized name mapped to {}", member);
            unmapped.push(UnmappedName {
                row,
                field,
                original: name.to_string(),
                member,
            });
            member
        }
    }
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| SplitError::validation(format!("Amount '{}' is not a number", raw)))
}

/// Turns decoded spreadsheet rows into stored expenses.
///
/// Rows are handled one at a time and in order; a row that fails to decode,
/// validate or persist is recorded and the import moves on.
pub struct ExpenseImporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> ExpenseImporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    pub async fn import_rows<I>(&self, rows: I) -> ImportReport
    where
        I: IntoIterator<Item = Result<ExpenseRow>>,
    {
        let mut report = ImportReport::default();

        for (index, decoded) in rows.into_iter().enumerate() {
            let row = index + 1;
            match self.import_row(row, decoded, &mut report.unmapped).await {
                Ok(expense) => report.created.push(expense),
                Err(error) => {
                    debug!(row, %error, "row rejected");
                    report.errors.push(RowImportError { row, error });
                }
            }
        }

        info!(
            created = report.created.len(),
            failed = report.errors.len(),
            unmapped = report.unmapped.len(),
            "import finished"
        );
        report
    }

    async fn import_row(
        &self,
        row: usize,
        decoded: Result<ExpenseRow>,
        unmapped: &mut Vec<UnmappedName>,
    ) -> Result<Expense> {
        let expense = decoded?.to_new_expense(row, unmapped)?;
        self.service.create(expense).await
    }
}
