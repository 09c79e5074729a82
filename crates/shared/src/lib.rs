//! Shared types, errors, and configuration for Futura.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT token issuing and validation
//! - Auth request/response payload types

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
