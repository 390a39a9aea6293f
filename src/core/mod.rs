//! Core library components.
//!
//! Parsing, validation, sealing and the reconciliation state machine. Nothing
//! here prints; the CLI decides how results are shown.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod id;
pub mod reconciler;
pub mod repo_path;
pub mod state;
pub mod store;
pub mod sync;
pub mod types;
pub mod validation;
