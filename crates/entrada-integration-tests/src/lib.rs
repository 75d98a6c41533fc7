//! Integration test crate for the Entrada ledger.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end ticketing flows across multiple workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p entrada-integration-tests
//! ```
