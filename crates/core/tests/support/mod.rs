//! Shared test helpers for `paywire-core` integration tests.
//!
//! Lightweight in-memory backends so that contract tests can focus on what a
//! resource client sends instead of on HTTP plumbing.

pub mod backends;
