//! Cross-crate tests.
//!
//! Run with: `cargo test --package integration-tests`

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod end_to_end_tests;
#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod load_tests;
#[cfg(test)]
mod streaming_tests;
