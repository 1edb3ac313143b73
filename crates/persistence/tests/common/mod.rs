//! Shared test infrastructure for the persistence layer.
//!
//! Every integration scenario runs against both in-memory adapters through
//! [`contexts`], so a behavioral difference between them shows up as a test
//! failure naming the adapter.

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
