//! Shared utilities for the pinion resolver.
//!
//! This crate provides cross-cutting concerns used by all other pinion crates,
//! currently the unified error type.

pub mod errors;
