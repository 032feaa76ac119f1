//! Atelier Storefront engine.
//!
//! The pricing-and-loyalty core behind the Atelier shopping apps: the
//! cart aggregate, the shared pricing pipeline, the tiered rewards
//! ledger, and the checkout flow that freezes cart totals into immutable
//! orders. UI surfaces and the managed backend consume this crate; it
//! performs no rendering and owns no network transport.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod models;
pub mod services;
pub mod store;
