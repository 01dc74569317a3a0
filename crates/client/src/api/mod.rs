//! Typed endpoint bindings over the request pipeline.
//!
//! Only the endpoints participating in the session lifecycle live here, plus
//! the `X-API-Key` machine endpoints (which exercise the pipeline's
//! caller-supplied-headers path). The bulk of the product's CRUD surface is
//! out of scope for this crate.

pub mod auth;
pub mod machine;

pub use auth::{AuthApi, LoginPayload, LoginRequest, RegisterRequest, ResetPasswordRequest};
pub use machine::MachineApi;
