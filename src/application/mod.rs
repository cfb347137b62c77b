//! Application layer orchestrating the domain over the storage ports.
//!
//! [`expenses::ExpenseService`] is the primary entry point for creating,
//! updating and settling expenses; [`import::ExpenseImporter`] feeds it rows
//! decoded from spreadsheets.

pub mod expenses;
pub mod import;
