//! Boundary adapters: CSV in and out, and the presentation views.

pub mod csv;
pub mod view;
