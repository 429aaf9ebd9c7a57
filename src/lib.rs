//! Typed SQL construction, dialect-aware compilation and managed transactions.
//!
//! Connection providers live in their own crates, `tabula-sqlite` being the reference one.

pub use tabula_core::*;
