//! Platform service abstractions for sandshell.
//!
//! The informational commands (`ps`, `sysinfo`) read host accounting data
//! through the [`ProcessService`] trait so the terminal never talks to the
//! operating system directly and tests can substitute fixed data.

mod services;

pub use services::{HostPlatform, ProcessInfo, ProcessService, SystemStats};
