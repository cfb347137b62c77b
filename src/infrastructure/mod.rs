//! Storage adapters implementing [`ExpenseStore`](crate::domain::ports::ExpenseStore).

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
