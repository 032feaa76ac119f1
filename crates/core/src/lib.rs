//! Atelier Core - Shared types library.
//!
//! This crate provides common types used across all Atelier components:
//! - `storefront` - The pricing and loyalty engine behind the shopping apps
//! - `integration-tests` - End-to-end checkout and loyalty scenarios
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no store access, no
//! async. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, statuses, and
//!   the static loyalty tier catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
