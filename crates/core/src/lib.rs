//! Larkspur Core - Shared types library.
//!
//! This crate provides common types used across all Larkspur components:
//! - `storefront` - Public-facing headless storefront
//! - `cli` - Command-line tools for session migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! store access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
