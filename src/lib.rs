//! Shared group expenses: equal-share balances and greedy settle-up.
//!
//! Spreadsheet rows enter through [`application::import::ExpenseImporter`],
//! expenses are managed by [`application::expenses::ExpenseService`], and
//! [`domain::settlement::compute_summary`] turns the active snapshot into a
//! settlement report.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
