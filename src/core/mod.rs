// Core modules shared by the API surface and the CLI.
pub mod error;
