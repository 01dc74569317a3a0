//! Core types for Mailcove.
//!
//! This module provides the domain types shared between the client library
//! and the CLI.

pub mod identity;

pub use identity::{AccountStatus, Identity, IdentityPatch, UserRole};
