//! Sandbox path confinement.
//!
//! Every path a command touches goes through [`Sandbox::resolve`], which
//! joins user input onto the sandbox root or the current directory,
//! canonicalizes the result (symbolic links followed, `.`/`..` collapsed)
//! and only then checks that it is the root or a descendant of it.

mod canonical;
mod sandbox;

/// Symlink-resolving canonicalization that tolerates missing tail components.
pub use canonical::canonicalize_lenient;
/// A canonical sandbox root plus the resolver bound to it.
pub use sandbox::Sandbox;
