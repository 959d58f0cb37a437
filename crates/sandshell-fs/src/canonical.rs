//! Lenient canonicalization.
//!
//! `std::fs::canonicalize` fails when any component is missing, but commands
//! like `mkdir a/b` and `touch new.txt` must resolve paths that do not exist
//! yet. This walks the path one component at a time, following symbolic
//! links wherever they exist and treating missing components lexically.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Symlinks followed before giving up (matches the usual `ELOOP` limit).
const MAX_SYMLINK_HOPS: usize = 40;

/// Canonicalize an absolute path without requiring it to exist.
///
/// - Existing components are resolved through symbolic links.
/// - `..` pops the already-resolved (symlink-free) prefix, so it always
///   refers to the physical parent.
/// - Components past the first missing one are appended as-is.
///
/// Returns an error on symlink loops or when a link cannot be read.
pub fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut current = path.to_path_buf();

    'restart: for _ in 0..=MAX_SYMLINK_HOPS {
        let mut resolved = PathBuf::new();
        let mut components = current.components();

        while let Some(component) = components.next() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    resolved.push(component.as_os_str());
                },
                Component::CurDir => {},
                Component::ParentDir => {
                    resolved.pop();
                },
                Component::Normal(name) => {
                    let candidate = resolved.join(name);
                    match std::fs::symlink_metadata(&candidate) {
                        Ok(meta) if meta.file_type().is_symlink() => {
                            // Splice the link target in front of the
                            // unprocessed tail and start over.
                            let target = std::fs::read_link(&candidate)?;
                            let mut next = resolved.join(target);
                            let rest = components.as_path();
                            if !rest.as_os_str().is_empty() {
                                next.push(rest);
                            }
                            current = next;
                            continue 'restart;
                        },
                        _ => resolved = candidate,
                    }
                },
            }
        }

        return Ok(resolved);
    }

    Err(io::Error::other("too many levels of symbolic links"))
}
