//! Foundation types for sandshell.
//!
//! This crate holds the pieces shared by every other sandshell crate: the
//! error taxonomy surfaced by the command executor and the TOML
//! configuration consumed by the front ends.

pub mod config;
pub mod error;
