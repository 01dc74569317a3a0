//! Mailcove client - session lifecycle over the Mailcove REST backend.
//!
//! This crate is the thin-client core of the Mailcove email system. It owns
//! three cooperating pieces:
//!
//! - [`http`] - the request pipeline. One executor behind verb-shaped
//!   wrappers: attaches the stored bearer credential, normalizes the backend
//!   `{code, data, msg}` envelope, enforces a per-request timeout, and
//!   intercepts HTTP 401 by tearing the session down before the failure ever
//!   reaches a caller.
//! - [`session`] - the session store. Acquires, persists, validates and
//!   invalidates the credential token, and exposes the derived facts
//!   (authenticated, administrator, display initials) everything else reads.
//! - [`router`] - the navigation guard. Decides per route transition whether
//!   a view is reachable for the current session, and records the denied
//!   path so the post-login flow can return to it.
//!
//! [`App::new`](app::App::new) wires the three together, including the 401
//! hook chain from the pipeline into the store and navigator.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mailcove_client::app::App;
//! use mailcove_client::config::ClientConfig;
//! use mailcove_client::storage::FileStorage;
//!
//! let config = ClientConfig::from_env()?;
//! let storage = Arc::new(FileStorage::open("session.json")?);
//! let app = App::new(&config, storage, navigator, None);
//!
//! app.session.restore().await;
//! let outcome = app.session.login(credentials).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod config;
pub mod http;
pub mod router;
pub mod session;
pub mod storage;

pub use app::App;
pub use config::ClientConfig;
pub use http::{ApiClient, ApiError, ApiResponse, Query, Scalar};
pub use session::{FlowOutcome, SessionPhase, SessionStore};
