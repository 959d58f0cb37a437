//! Command interpreter and session backend for sandshell.
//!
//! Commands implement the `Command` trait and are registered by name in a
//! `CommandRegistry`. A `Terminal` owns one session: it rewrites
//! natural-language phrasing, tokenizes the line, splits off `>`
//! redirection, dispatches the command, and turns every failure into text.
//! All filesystem access goes through the session's `Sandbox`.

mod commands;
mod interpreter;
mod session;
mod system_commands;
pub mod translate;

#[cfg(test)]
mod test_support;

/// Register all built-in commands into a registry.
pub use commands::register_builtins;
/// A single executable command trait.
pub use interpreter::Command;
/// Output produced by a command.
pub use interpreter::CommandOutput;
/// Registry of available commands with dispatch.
pub use interpreter::CommandRegistry;
/// Mutable environment passed to every command.
pub use interpreter::Environment;
/// Per-command limits (cat size cap, ps line count).
pub use interpreter::Limits;
pub use interpreter::{ParsedInvocation, Word, parse_invocation, quote, tokenize, tokenize_words};
/// Session state and the per-session executor.
pub use session::{ExecutionOutcome, SessionState, Terminal};
/// Register pwd, echo, ps, sysinfo, and help into a registry.
pub use system_commands::register_system_commands;
pub use translate::translate;
