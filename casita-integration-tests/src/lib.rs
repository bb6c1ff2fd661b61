#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are
// marked as used. But docs don't generate for the below if they are
// `#[cfg(test)]`. This is a compromise.
#![allow(dead_code)]

//! Tests for Casita that work by reading from the external API only.
//!
//! Since the URL endpoints Casita exposes to the world are its public API,
//! and other systems depend on them, the paths used in tests here are
//! important details, and used to keep compatibility.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `casita/tests/...`. This improves compilation and test times.
//!
//! The primary tool used by tests is [`casita_test`], which starts the
//! application on an OS-assigned port with a fresh in-memory store, and
//! provides an HTTP client pointed at it plus the storage handle for
//! seeding fixtures.

mod dockerflow;
mod general;
mod places;
mod search;
mod utils;

pub use crate::utils::test_tools::{casita_test, TestReqwestClient, TestingTools};
