//! Domain model: members, money, expenses and the settlement engine.
//!
//! Nothing in here performs I/O; storage is reached through [`ports`].

pub mod expense;
pub mod member;
pub mod money;
pub mod ports;
pub mod settlement;
