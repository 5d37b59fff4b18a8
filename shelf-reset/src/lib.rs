//! <div align="center">
//!   <h1>shelf</h1>
//!
//!   <p>
//!     <strong>Reset your 🦀 product catalog with shelf</strong>
//!   </p>
//!
//! </div>
//!
//! # shelf-reset
//!
//! Drops and recreates the `products` table described by [`shelf`] against
//! PostgreSQL, MySQL or SQLite, then verifies the result against the store's catalog.
//!
//! Resets against the same store must be serialized by the caller. Two concurrent
//! resets may interleave their drop and create statements.

pub use sqlx;

pub mod dialect;
pub mod error;
pub mod executor;
pub mod introspect;
#[cfg(test)]
mod tests_cfg;

pub use dialect::Dialect;
pub use error::{SchemaError, StoreState};
pub use executor::{connect, ResetPlan, ResetReport, SchemaResetExecutor};
pub use introspect::Mismatch;
