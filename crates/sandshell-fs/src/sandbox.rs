//! The sandbox root and its resolver.

use std::path::{Component, Path, PathBuf};

use sandshell_types::error::{Result, ShellError};

use crate::canonical::canonicalize_lenient;

/// A canonical, absolute sandbox root.
///
/// Immutable once created. Every path produced by [`Sandbox::resolve`] is
/// equal to or a descendant of [`Sandbox::root`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create the sandbox at `root`, making the directory if absent, and
    /// canonicalize it.
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let root = dunce::canonicalize(root)?;
        log::info!("Sandbox root: {}", root.display());
        Ok(Self { root })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` is the root or lies beneath it (component-wise).
    ///
    /// Only meaningful for canonical paths.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Resolve user input against `cwd` into a canonical path inside the
    /// sandbox.
    ///
    /// 1. Empty input or `.` yields `cwd` unchanged.
    /// 2. Input starting with `/` is rooted at the sandbox root.
    /// 3. Anything else is joined onto `cwd`.
    /// 4. The joined path is canonicalized (symlinks followed).
    /// 5. A canonical result outside the root is a sandbox violation.
    pub fn resolve(&self, cwd: &Path, input: &str) -> Result<PathBuf> {
        if input.is_empty() || input == "." {
            return Ok(cwd.to_path_buf());
        }

        let joined = if input.starts_with('/') {
            self.root.join(input.trim_start_matches('/'))
        } else {
            cwd.join(input)
        };

        let canonical = canonicalize_lenient(&joined)?;
        if !self.contains(&canonical) {
            log::warn!("Blocked sandbox escape: {input:?}");
            return Err(ShellError::violation(input));
        }
        Ok(canonical)
    }

    /// Format an in-sandbox path the way `pwd` prints it: `/` for the root,
    /// otherwise `/seg/seg` with forward slashes on every platform.
    pub fn display_path(&self, path: &Path) -> String {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return "/".to_string();
        };
        let segments: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("/{}", segments.join("/"))
    }
}
