//! Mailcove Core - Shared types library.
//!
//! This crate provides common types used across all Mailcove components:
//! - `client` - Session, request pipeline and navigation logic
//! - `cli` - Command-line session management tool
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - The authenticated principal (identity, role, account status)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
