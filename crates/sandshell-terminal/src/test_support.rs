//! Shared fixtures for unit tests: a tempdir sandbox and a scripted platform.

use std::path::PathBuf;

use sandshell_fs::Sandbox;
use sandshell_platform::{ProcessInfo, ProcessService, SystemStats};
use sandshell_types::error::{Result, ShellError};
use tempfile::TempDir;

use crate::interpreter::{CommandOutput, CommandRegistry, Environment, Limits, tokenize};
use crate::session::SessionState;

/// Platform returning canned data; `None` fields fail like an unreadable host.
#[derive(Default)]
pub struct MockPlatform {
    pub processes: Option<Vec<ProcessInfo>>,
    pub stats: Option<SystemStats>,
}

impl ProcessService for MockPlatform {
    fn processes(&self) -> Result<Vec<ProcessInfo>> {
        self.processes
            .clone()
            .ok_or_else(|| ShellError::Platform("process table unavailable".to_string()))
    }

    fn system_stats(&self) -> Result<SystemStats> {
        self.stats
            .ok_or_else(|| ShellError::Platform("stats unavailable".to_string()))
    }
}

/// A sandbox at `<tmp>/sandbox` with a sibling `<tmp>/outside` directory.
pub struct TestShell {
    _tmp: TempDir,
    outside: PathBuf,
    pub session: SessionState,
    pub registry: CommandRegistry,
    pub platform: MockPlatform,
    pub limits: Limits,
}

impl TestShell {
    pub fn new() -> Self {
        Self::with_platform(MockPlatform::default())
    }

    pub fn with_platform(platform: MockPlatform) -> Self {
        let tmp = TempDir::new().unwrap();
        let outside = tmp.path().join("outside");
        std::fs::create_dir(&outside).unwrap();
        let sandbox = Sandbox::create(tmp.path().join("sandbox")).unwrap();
        Self {
            _tmp: tmp,
            outside,
            session: SessionState::new(sandbox),
            registry: CommandRegistry::with_builtins(),
            platform,
            limits: Limits::default(),
        }
    }

    /// Host path of `rel` under the sandbox root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.session.root().join(rel)
    }

    pub fn outside_dir(&self) -> PathBuf {
        self.outside.clone()
    }

    pub fn mkdir(&self, rel: &str) {
        std::fs::create_dir_all(self.path(rel)).unwrap();
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}

/// Tokenize `line` and dispatch it directly, bypassing translation and
/// redirection.
pub fn exec(sh: &mut TestShell, line: &str) -> Result<String> {
    let words = tokenize(line)?;
    let Some((name, rest)) = words.split_first() else {
        return Ok(String::new());
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    let mut env = Environment {
        session: &mut sh.session,
        platform: &sh.platform,
        limits: sh.limits,
        registry: &sh.registry,
    };
    sh.registry
        .dispatch(name, &args, &mut env)
        .map(CommandOutput::into_text)
}
