use crate::domain::expense::Expense;
use crate::domain::settlement::SettlementReport;
use crate::error::Result;
use rust_decimal::Decimal;
use std::io::Write;

/// Decimal places shown for paid/share/balance columns.
const DISPLAY_DP: u32 = 2;

/// Writes settlement reports and expense listings as CSV.
pub struct ReportWriter<W: Write> {
    inner: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes the per-member table, a blank line, then the transfer table.
    ///
    /// Only members involved in at least one active expense are listed.
    pub fn write_report(&mut self, report: &SettlementReport) -> Result<()> {
        {
            let mut wtr = csv::Writer::from_writer(&mut self.inner);
            wtr.write_record(["member", "paid", "share", "balance"])?;
            for member in report.involved_members() {
                wtr.write_record([
                    member.as_str().to_string(),
                    display(report.member_paid[member].value()),
                    display(report.member_share[member].value()),
                    display(report.member_balance[member].value()),
                ])?;
            }
            wtr.flush()?;
        }
        writeln!(self.inner)?;
        {
            let mut wtr = csv::Writer::from_writer(&mut self.inner);
            wtr.write_record(["from", "to", "amount"])?;
            for transfer in &report.transactions {
                wtr.write_record([
                    transfer.from.as_str().to_string(),
                    transfer.to.as_str().to_string(),
                    transfer.amount.normalize().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        Ok(())
    }

    pub fn write_expenses(&mut self, expenses: &[Expense]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(&mut self.inner);
        wtr.write_record([
            "id",
            "amount",
            "description",
            "paid_by",
            "participants",
            "active",
        ])?;
        for expense in expenses {
            let participants: Vec<&str> = expense.participants.iter().map(|m| m.as_str()).collect();
            wtr.write_record([
                expense.id.to_string(),
                expense.amount.to_string(),
                expense.description.clone(),
                expense.paid_by.as_str().to_string(),
                participants.join(", "),
                expense.is_active.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn display(value: Decimal) -> String {
    value.round_dp(DISPLAY_DP).normalize().to_string()
}
