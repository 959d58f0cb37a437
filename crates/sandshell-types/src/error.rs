//! Error types for sandshell.

use std::io;

/// Errors produced while executing a command line.
///
/// Every variant except the wrapped underlying failures carries the exact
/// text shown to the caller. Nothing here is allowed to escape the executor:
/// the terminal converts each error into a textual result.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A resolved path landed outside the sandbox root.
    ///
    /// `path` holds the offending user input for logging only; it is not
    /// part of the displayed message.
    #[error("Access outside sandbox is not allowed.")]
    SandboxViolation { path: String },

    /// A required argument is missing (per-command usage text).
    #[error("{0}")]
    InvalidOperand(String),

    /// Target file or directory absent where required.
    #[error("{0}")]
    NotFound(String),

    /// The operation is refused as requested (e.g. directory removal
    /// without `-r`, removing the sandbox root).
    #[error("{0}")]
    Unsupported(String),

    #[error("{command}: file too large ({size} bytes)")]
    SizeLimitExceeded { command: String, size: u64 },

    #[error("{0}: command not found")]
    UnknownCommand(String),

    /// Malformed quoting or escaping in the command line.
    #[error("parse error: {0}")]
    Parse(String),

    /// A shell operator with nothing where an operand is required.
    #[error("syntax error near unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ShellError {
    /// Whether this error is an unexpected underlying failure rather than
    /// one of the expected, user-facing outcomes.
    ///
    /// Unexpected failures are logged with full detail and reported to the
    /// caller behind an `Error:` prefix.
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Platform(_) | Self::Config(_) | Self::TomlParse(_)
        )
    }

    /// Shorthand for a sandbox violation on `path`.
    pub fn violation(path: impl Into<String>) -> Self {
        Self::SandboxViolation { path: path.into() }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShellError>;
