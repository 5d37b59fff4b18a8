//! <div align="center">
//!   <h1>shelf</h1>
//!
//!   <p>
//!     <strong>Reset your 🦀 product catalog with shelf</strong>
//!   </p>
//!
//! </div>
//!
//! # shelf
//!
//! Shelf describes the `products` catalog table as plain Rust data,
//! and [`shelf-reset`](../shelf_reset/index.html) drops and recreates it against a live store.

pub mod database;
pub mod prelude;
pub mod product;
