//! Utilities for tests.

pub mod fixtures;
pub mod test_tools;
