//! Ledger domain rules.
//!
//! An account balance is the signed sum of its transactions; these helpers
//! own the signing policy and the validation that keeps that sum exact.

mod entry;

pub use entry::{CURRENCY_SCALE, EntryError, EntryKind, signed_amount};
