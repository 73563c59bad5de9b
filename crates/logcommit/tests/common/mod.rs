//! Shared test utilities for logcommit integration tests.

pub mod harness;

pub use harness::*;
