//! Filesystem commands: ls, cd, mkdir, rm, cat, touch, mv, cp.
//!
//! Every path argument goes through [`SessionState::resolve`] before any
//! filesystem call, so no command can reach outside the sandbox.

use std::fs::{self, File, FileTimes};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sandshell_fs::canonicalize_lenient;
use sandshell_types::error::{Result, ShellError};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};
use crate::session::SessionState;

/// Register all built-in commands into a registry.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(TouchCmd));
    reg.register(Box::new(MvCmd));
    reg.register(Box::new(CpCmd));
    crate::register_system_commands(reg);
}

/// Base name of `path` for display (empty for the filesystem root).
fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether anything (file, directory, or dangling link) sits at `path`.
fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents."
    }
    fn usage(&self) -> &str {
        "ls [path]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = match args.first() {
            Some(arg) => env.session.resolve(arg)?,
            None => env.session.cwd().to_path_buf(),
        };

        if target.is_dir() {
            let mut entries: Vec<(String, bool)> = Vec::new();
            for entry in fs::read_dir(&target)? {
                // Entries removed mid-listing are skipped.
                let Ok(entry) = entry else { continue };
                let name = entry.file_name().to_string_lossy().into_owned();
                entries.push((name, entry.path().is_dir()));
            }
            entries.sort();
            let lines: Vec<String> = entries
                .into_iter()
                .map(|(name, is_dir)| if is_dir { format!("{name}/") } else { name })
                .collect();
            Ok(CommandOutput::Text(lines.join("\n")))
        } else if exists(&target) {
            Ok(CommandOutput::Text(base_name(&target)))
        } else {
            Err(ShellError::NotFound(format!(
                "ls: cannot access '{}': No such file or directory",
                args.first().copied().unwrap_or_default()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change the current working directory."
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&arg) = args.first() else {
            env.session.reset_cwd();
            return Ok(CommandOutput::None);
        };
        if env.session.change_dir(arg)? {
            Ok(CommandOutput::None)
        } else {
            Err(ShellError::NotFound(format!("cd: no such directory: {arg}")))
        }
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create a new directory."
    }
    fn usage(&self) -> &str {
        "mkdir <path>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&arg) = args.first() else {
            return Err(ShellError::InvalidOperand("mkdir: missing operand".to_string()));
        };
        let path = env.session.resolve(arg)?;
        fs::create_dir_all(&path)?;
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove files or directories (-r for recursive)."
    }
    fn usage(&self) -> &str {
        "rm [-r|--recursive] <path>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let is_flag = |a: &&str| *a == "-r" || *a == "--recursive";
        let recursive = args.iter().any(is_flag);
        let Some(&arg) = args.iter().find(|a| !is_flag(a)) else {
            return Err(ShellError::InvalidOperand("rm: missing operand".to_string()));
        };

        let path = env.session.resolve(arg)?;
        if path == env.session.root() {
            return Err(ShellError::Unsupported(
                "rm: refusing to remove root sandbox".to_string(),
            ));
        }

        if path.is_dir() {
            if !recursive {
                return Err(ShellError::Unsupported(
                    "rm: is a directory (use -r to remove directories)".to_string(),
                ));
            }
            fs::remove_dir_all(&path)?;
        } else if exists(&path) {
            fs::remove_file(&path)?;
        } else {
            return Err(ShellError::NotFound(format!(
                "rm: cannot remove '{arg}': No such file or directory"
            )));
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Display the content of a file."
    }
    fn usage(&self) -> &str {
        "cat <file>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&arg) = args.first() else {
            return Err(ShellError::InvalidOperand(
                "cat: missing file operand".to_string(),
            ));
        };
        let path = env.session.resolve(arg)?;
        if !path.is_file() {
            return Err(ShellError::NotFound(format!("cat: {arg}: No such file")));
        }

        let file = File::open(&path)?;
        let size = file.metadata()?.len();
        let max = env.limits.max_cat_bytes;
        if size > max {
            return Err(ShellError::SizeLimitExceeded {
                command: "cat".to_string(),
                size,
            });
        }

        // Bounded read: the file may grow after the size check.
        let mut data = Vec::with_capacity(size as usize);
        file.take(max).read_to_end(&mut data)?;
        Ok(CommandOutput::Text(String::from_utf8_lossy(&data).into_owned()))
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create a new, empty file."
    }
    fn usage(&self) -> &str {
        "touch <file>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&arg) = args.first() else {
            return Err(ShellError::InvalidOperand(
                "touch: missing file operand".to_string(),
            ));
        };
        let path = env.session.resolve(arg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::options().create(true).append(true).open(&path)?;
        file.set_modified(SystemTime::now())?;
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// mv
// ---------------------------------------------------------------------------

struct MvCmd;
impl Command for MvCmd {
    fn name(&self) -> &str {
        "mv"
    }
    fn description(&self) -> &str {
        "Move or rename a file or directory."
    }
    fn usage(&self) -> &str {
        "mv <src> <dst>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let [src_arg, dst_arg, ..] = args else {
            return Err(ShellError::InvalidOperand("mv: missing operand".to_string()));
        };
        let src = env.session.resolve(src_arg)?;
        let dst = env.session.resolve(dst_arg)?;

        if src == env.session.root() {
            return Err(ShellError::Unsupported(
                "mv: refusing to move root sandbox".to_string(),
            ));
        }
        if !exists(&src) {
            return Err(ShellError::NotFound(format!(
                "mv: cannot stat '{src_arg}': No such file or directory"
            )));
        }

        let dst = into_dir(&src, dst);
        match fs::rename(&src, &dst) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                log::debug!("rename across devices, copying instead");
                if src.is_dir() {
                    copy_tree(env.session, &src, &dst)?;
                    fs::remove_dir_all(&src)?;
                } else {
                    copy_file(&src, &dst)?;
                    fs::remove_file(&src)?;
                }
            },
            Err(e) => return Err(e.into()),
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// cp
// ---------------------------------------------------------------------------

struct CpCmd;
impl Command for CpCmd {
    fn name(&self) -> &str {
        "cp"
    }
    fn description(&self) -> &str {
        "Copy files or directories."
    }
    fn usage(&self) -> &str {
        "cp <src> <dst>"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let [src_arg, dst_arg, ..] = args else {
            return Err(ShellError::InvalidOperand("cp: missing operand".to_string()));
        };
        let src = env.session.resolve(src_arg)?;
        let dst = env.session.resolve(dst_arg)?;

        if src.is_dir() {
            if dst.starts_with(&src) {
                return Err(ShellError::Unsupported(format!(
                    "cp: cannot copy a directory, '{src_arg}', into itself, '{dst_arg}'"
                )));
            }
            // Fails with "File exists" when dst is already there.
            copy_tree(env.session, &src, &dst)?;
        } else if src.is_file() {
            let dst = into_dir(&src, dst);
            if same_file(&src, &dst) {
                let sandbox = env.session.sandbox();
                return Err(ShellError::Unsupported(format!(
                    "cp: '{}' and '{}' are the same file",
                    sandbox.display_path(&src),
                    sandbox.display_path(&dst)
                )));
            }
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            copy_file(&src, &dst)?;
        } else {
            return Err(ShellError::NotFound(format!(
                "cp: cannot stat '{src_arg}': No such file or directory"
            )));
        }
        Ok(CommandOutput::None)
    }
}

/// If `dst` is an existing directory, target `dst/<name of src>` instead.
fn into_dir(src: &Path, dst: PathBuf) -> PathBuf {
    match src.file_name() {
        Some(name) if dst.is_dir() => dst.join(name),
        _ => dst,
    }
}

/// Whether `a` and `b` name the same file: equal canonical paths, or (on
/// Unix) an existing `b` sharing `a`'s device and inode.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let (Ok(ma), Ok(mb)) = (fs::metadata(a), fs::metadata(b)) {
            return ma.dev() == mb.dev() && ma.ino() == mb.ino();
        }
    }
    false
}

/// Copy file content, permissions, and access/modification times.
fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)?;
    let meta = fs::metadata(src)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    File::options().write(true).open(dst)?.set_times(times)?;
    Ok(())
}

/// Recursively copy the directory `src` to the new directory `dst`.
///
/// Symbolic links are followed only when their target stays inside the
/// sandbox; links pointing outward are skipped so a copy cannot pull
/// outside content in. A directory already being copied higher up the
/// walk, or one inside `dst`, is skipped so linked cycles terminate.
fn copy_tree(session: &SessionState, src: &Path, dst: &Path) -> Result<()> {
    let mut ancestors = Vec::new();
    copy_dir(session, src, dst, dst, &mut ancestors)
}

fn copy_dir(
    session: &SessionState,
    src: &Path,
    dst: &Path,
    dst_root: &Path,
    ancestors: &mut Vec<PathBuf>,
) -> Result<()> {
    fs::create_dir(dst)?;
    ancestors.push(src.to_path_buf());
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        let from = if entry.file_type()?.is_symlink() {
            let target = canonicalize_lenient(&from)?;
            if !session.sandbox().contains(&target) {
                log::warn!("Skipping outward symlink during copy: {}", from.display());
                continue;
            }
            target
        } else {
            from
        };

        if from.is_dir() {
            if ancestors.contains(&from) || from.starts_with(dst_root) {
                log::warn!(
                    "Skipping directory cycle during copy: {}",
                    entry.path().display()
                );
                continue;
            }
            copy_dir(session, &from, &to, dst_root, ancestors)?;
        } else if from.is_file() {
            copy_file(&from, &to)?;
        }
    }
    ancestors.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestShell, exec};

    #[test]
    fn ls_sorts_and_marks_dirs() {
        let mut sh = TestShell::new();
        sh.mkdir("zeta");
        sh.write("beta.txt", "b");
        sh.write("Alpha.txt", "a");
        assert_eq!(exec(&mut sh, "ls").unwrap(), "Alpha.txt\nbeta.txt\nzeta/");
    }

    #[test]
    fn ls_empty_dir_is_empty() {
        let mut sh = TestShell::new();
        assert_eq!(exec(&mut sh, "ls").unwrap(), "");
    }

    #[test]
    fn ls_file_shows_basename() {
        let mut sh = TestShell::new();
        sh.write("docs/readme.md", "x");
        assert_eq!(exec(&mut sh, "ls docs/readme.md").unwrap(), "readme.md");
    }

    #[test]
    fn ls_missing_path() {
        let mut sh = TestShell::new();
        let err = exec(&mut sh, "ls nope").unwrap_err();
        assert!(matches!(err, ShellError::NotFound(_)));
    }

    #[test]
    fn ls_outside_is_violation() {
        let mut sh = TestShell::new();
        let err = exec(&mut sh, "ls ..").unwrap_err();
        assert!(matches!(err, ShellError::SandboxViolation { .. }));
    }

    #[test]
    fn cd_and_back() {
        let mut sh = TestShell::new();
        sh.mkdir("a/b");
        exec(&mut sh, "cd a/b").unwrap();
        assert_eq!(sh.session.cwd_display(), "/a/b");
        exec(&mut sh, "cd ..").unwrap();
        assert_eq!(sh.session.cwd_display(), "/a");
        exec(&mut sh, "cd").unwrap();
        assert_eq!(sh.session.cwd_display(), "/");
    }

    #[test]
    fn cd_to_file_is_not_found() {
        let mut sh = TestShell::new();
        sh.write("f.txt", "");
        let err = exec(&mut sh, "cd f.txt").unwrap_err();
        assert_eq!(format!("{err}"), "cd: no such directory: f.txt");
        assert_eq!(sh.session.cwd_display(), "/");
    }

    #[test]
    fn cd_outside_keeps_cwd() {
        let mut sh = TestShell::new();
        assert!(exec(&mut sh, "cd ../..").is_err());
        assert_eq!(sh.session.cwd(), sh.session.root());
    }

    #[test]
    fn mkdir_creates_parents_and_is_idempotent() {
        let mut sh = TestShell::new();
        exec(&mut sh, "mkdir a/b/c").unwrap();
        assert!(sh.path("a/b/c").is_dir());
        exec(&mut sh, "mkdir a/b/c").unwrap();
    }

    #[test]
    fn mkdir_missing_operand() {
        let mut sh = TestShell::new();
        let err = exec(&mut sh, "mkdir").unwrap_err();
        assert_eq!(format!("{err}"), "mkdir: missing operand");
    }

    #[test]
    fn rm_file() {
        let mut sh = TestShell::new();
        sh.write("x.txt", "x");
        exec(&mut sh, "rm x.txt").unwrap();
        assert!(!sh.path("x.txt").exists());
    }

    #[test]
    fn rm_dir_requires_flag() {
        let mut sh = TestShell::new();
        sh.write("d/inner/f.txt", "x");
        let err = exec(&mut sh, "rm d").unwrap_err();
        assert_eq!(
            format!("{err}"),
            "rm: is a directory (use -r to remove directories)"
        );
        assert!(sh.path("d/inner/f.txt").exists());

        exec(&mut sh, "rm d --recursive").unwrap();
        assert!(!sh.path("d").exists());
    }

    #[test]
    fn rm_flag_before_operand() {
        let mut sh = TestShell::new();
        sh.mkdir("d/e");
        exec(&mut sh, "rm -r d").unwrap();
        assert!(!sh.path("d").exists());
    }

    #[test]
    fn rm_root_is_refused() {
        let mut sh = TestShell::new();
        sh.write("keep.txt", "k");
        for line in ["rm -r /", "rm -r .", "rm /"] {
            let err = exec(&mut sh, line).unwrap_err();
            assert_eq!(format!("{err}"), "rm: refusing to remove root sandbox");
        }
        assert!(sh.path("keep.txt").exists());
    }

    #[test]
    fn rm_missing_operand_and_file() {
        let mut sh = TestShell::new();
        assert_eq!(
            format!("{}", exec(&mut sh, "rm -r").unwrap_err()),
            "rm: missing operand"
        );
        assert!(matches!(
            exec(&mut sh, "rm ghost").unwrap_err(),
            ShellError::NotFound(_)
        ));
    }

    #[test]
    fn cat_reads_lossy_text() {
        let mut sh = TestShell::new();
        std::fs::write(sh.path("bin.dat"), [b'o', b'k', 0xFF, b'!']).unwrap();
        assert_eq!(exec(&mut sh, "cat bin.dat").unwrap(), "ok\u{FFFD}!");
    }

    #[test]
    fn cat_size_boundary() {
        let mut sh = TestShell::new();
        std::fs::write(sh.path("exact.bin"), vec![b'a'; 200 * 1024]).unwrap();
        std::fs::write(sh.path("over.bin"), vec![b'a'; 200 * 1024 + 1]).unwrap();
        assert_eq!(exec(&mut sh, "cat exact.bin").unwrap().len(), 200 * 1024);
        let err = exec(&mut sh, "cat over.bin").unwrap_err();
        assert_eq!(format!("{err}"), "cat: file too large (204801 bytes)");
    }

    #[test]
    fn cat_directory_or_missing() {
        let mut sh = TestShell::new();
        sh.mkdir("d");
        assert_eq!(
            format!("{}", exec(&mut sh, "cat d").unwrap_err()),
            "cat: d: No such file"
        );
        assert_eq!(
            format!("{}", exec(&mut sh, "cat").unwrap_err()),
            "cat: missing file operand"
        );
    }

    #[test]
    fn touch_creates_parents_and_keeps_content() {
        let mut sh = TestShell::new();
        exec(&mut sh, "touch deep/er/file.txt").unwrap();
        assert!(sh.path("deep/er/file.txt").is_file());

        sh.write("keep.txt", "data");
        let old = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        File::options()
            .write(true)
            .open(sh.path("keep.txt"))
            .unwrap()
            .set_modified(old)
            .unwrap();
        exec(&mut sh, "touch keep.txt").unwrap();
        assert_eq!(std::fs::read_to_string(sh.path("keep.txt")).unwrap(), "data");
        let mtime = std::fs::metadata(sh.path("keep.txt")).unwrap().modified().unwrap();
        assert!(mtime > old);
    }

    #[test]
    fn mv_renames_and_moves_into_dir() {
        let mut sh = TestShell::new();
        sh.write("a.txt", "A");
        sh.mkdir("box");
        exec(&mut sh, "mv a.txt b.txt").unwrap();
        assert!(!sh.path("a.txt").exists());
        exec(&mut sh, "mv b.txt box").unwrap();
        assert_eq!(std::fs::read_to_string(sh.path("box/b.txt")).unwrap(), "A");
    }

    #[test]
    fn mv_errors() {
        let mut sh = TestShell::new();
        assert_eq!(
            format!("{}", exec(&mut sh, "mv only").unwrap_err()),
            "mv: missing operand"
        );
        assert!(matches!(
            exec(&mut sh, "mv ghost x").unwrap_err(),
            ShellError::NotFound(_)
        ));
        sh.write("a", "");
        assert!(matches!(
            exec(&mut sh, "mv a ../a").unwrap_err(),
            ShellError::SandboxViolation { .. }
        ));
        assert!(sh.path("a").exists());
    }

    #[test]
    fn cp_file_creates_parents_and_keeps_mtime() {
        let mut sh = TestShell::new();
        sh.write("src.txt", "payload");
        let old = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2_000_000);
        File::options()
            .write(true)
            .open(sh.path("src.txt"))
            .unwrap()
            .set_modified(old)
            .unwrap();
        exec(&mut sh, "cp src.txt out/copy.txt").unwrap();
        assert_eq!(
            std::fs::read_to_string(sh.path("out/copy.txt")).unwrap(),
            "payload"
        );
        let mtime = std::fs::metadata(sh.path("out/copy.txt"))
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(mtime, old);
    }

    #[test]
    fn cp_tree_and_existing_destination() {
        let mut sh = TestShell::new();
        sh.write("tree/a.txt", "a");
        sh.write("tree/sub/b.txt", "b");
        exec(&mut sh, "cp tree copy").unwrap();
        assert_eq!(std::fs::read_to_string(sh.path("copy/sub/b.txt")).unwrap(), "b");

        let err = exec(&mut sh, "cp tree copy").unwrap_err();
        assert!(err.is_unexpected());
    }

    #[test]
    fn cp_onto_itself_keeps_content() {
        let mut sh = TestShell::new();
        sh.write("a.txt", "precious");
        let err = exec(&mut sh, "cp a.txt a.txt").unwrap_err();
        assert_eq!(
            format!("{err}"),
            "cp: '/a.txt' and '/a.txt' are the same file"
        );
        assert_eq!(std::fs::read_to_string(sh.path("a.txt")).unwrap(), "precious");
    }

    #[test]
    fn cp_into_own_directory_keeps_content() {
        let mut sh = TestShell::new();
        sh.write("docs/b.txt", "precious");
        exec(&mut sh, "cd docs").unwrap();
        assert!(matches!(
            exec(&mut sh, "cp b.txt .").unwrap_err(),
            ShellError::Unsupported(_)
        ));
        assert!(exec(&mut sh, "cp b.txt /docs").is_err());
        assert_eq!(
            std::fs::read_to_string(sh.path("docs/b.txt")).unwrap(),
            "precious"
        );
    }

    #[cfg(unix)]
    #[test]
    fn cp_onto_hard_link_keeps_content() {
        let mut sh = TestShell::new();
        sh.write("orig.txt", "precious");
        std::fs::hard_link(sh.path("orig.txt"), sh.path("alias.txt")).unwrap();
        assert!(exec(&mut sh, "cp orig.txt alias.txt").is_err());
        assert_eq!(
            std::fs::read_to_string(sh.path("orig.txt")).unwrap(),
            "precious"
        );
    }

    #[cfg(unix)]
    #[test]
    fn cp_tree_stops_at_link_to_ancestor() {
        let mut sh = TestShell::new();
        sh.write("tree/a.txt", "a");
        sh.write("tree/sub/b.txt", "b");
        std::os::unix::fs::symlink(sh.path("tree"), sh.path("tree/sub/loop")).unwrap();
        exec(&mut sh, "cp tree copy").unwrap();
        assert!(sh.path("copy/a.txt").is_file());
        assert!(sh.path("copy/sub/b.txt").is_file());
        assert!(!sh.path("copy/sub/loop").exists());
    }

    #[cfg(unix)]
    #[test]
    fn cp_tree_stops_at_link_to_destination() {
        let mut sh = TestShell::new();
        sh.write("tree/a.txt", "a");
        std::os::unix::fs::symlink(sh.session.root().to_path_buf(), sh.path("tree/up")).unwrap();
        exec(&mut sh, "cp tree copy").unwrap();
        assert!(sh.path("copy/a.txt").is_file());
        // The linked root is copied once, without the tree or the copy itself.
        assert!(sh.path("copy/up").is_dir());
        assert!(!sh.path("copy/up/tree").exists());
        assert!(!sh.path("copy/up/copy").exists());
    }

    #[test]
    fn cp_tree_into_itself_is_refused() {
        let mut sh = TestShell::new();
        sh.mkdir("tree");
        assert!(matches!(
            exec(&mut sh, "cp tree tree/inner").unwrap_err(),
            ShellError::Unsupported(_)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn cp_tree_skips_outward_symlinks() {
        let mut sh = TestShell::new();
        let outside = sh.outside_dir();
        std::fs::write(outside.join("secret"), "s3cret").unwrap();
        sh.write("tree/ok.txt", "ok");
        std::os::unix::fs::symlink(outside.join("secret"), sh.path("tree/leak")).unwrap();
        exec(&mut sh, "cp tree copy").unwrap();
        assert!(sh.path("copy/ok.txt").exists());
        assert!(!sh.path("copy/leak").exists());
    }

    #[test]
    fn cp_missing_operand() {
        let mut sh = TestShell::new();
        assert_eq!(
            format!("{}", exec(&mut sh, "cp").unwrap_err()),
            "cp: missing operand"
        );
    }
}
