//! Purpose: Library crate behind the `identify` CLI and its tests.
//! Exports: `api` (input, request lifecycle, HTTP client) and `render` (JSON tree formatter).
//! Role: Keeps transport, state, and presentation separable and testable without a terminal.
//! Invariants: Library code never prints; diagnostics go through `tracing`.
pub mod api;
pub(crate) mod core;
pub mod render;
