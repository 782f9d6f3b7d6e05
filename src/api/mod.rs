//! Purpose: Define the public Rust API boundary for identify submissions.
//! Exports: Input model, request state, HTTP client, session orchestrator, errors.
//! Role: Additive-only surface used by the CLI and integration tests.
//! Invariants: This module is the only public path to transport and lifecycle types.

mod client;
mod form;
mod session;
mod state;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{
    Error, ErrorKind, HTTP_FALLBACK_MESSAGE, TRANSPORT_FALLBACK_MESSAGE,
};
pub use client::{ApiResult, IdentityClient, IdentityEndpoint};
pub use form::{FormInput, IdentifyRequest};
pub use session::{Session, Settled, Ticket};
pub use state::RequestState;
