//! # Courier Testing Utils
//!
//! Shared testing utilities for the courier workspace: in-memory mocks of
//! every port, test data builders and async wait helpers.
//!
//! ## Usage
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! courier-testing-utils = { path = "../testing-utils" }
//! ```
//!
//! Then use the mocks in your tests:
//!
//! ```rust
//! use courier_testing_utils::mocks::*;
//! use courier_testing_utils::builders::TaskBuilder;
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use helpers::*;
pub use mocks::*;
