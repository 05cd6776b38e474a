//! Test support shared by the skirmish crates.
//!
//! - [`fixtures`]: documented battlefields and the results they must produce
//! - [`determinism`]: replay harness comparing state hashes
//! - [`strategies`]: proptest generators for random battlefields

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;
