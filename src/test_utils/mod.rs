//! Test utilities
//!
//! Hand-written fetcher doubles and feed fixtures shared by the pipeline
//! tests.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
