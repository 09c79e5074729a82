//! Core business logic for Futura.
//!
//! Pure domain rules with no web or database dependencies:
//! - Password hashing (Argon2id)
//! - Ledger entry arithmetic (signed-amount policy, balance deltas)

pub mod auth;
pub mod ledger;
