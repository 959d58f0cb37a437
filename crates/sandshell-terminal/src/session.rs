//! Session state and the per-session executor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sandshell_fs::Sandbox;
use sandshell_platform::{HostPlatform, ProcessService};
use sandshell_types::error::{Result, ShellError};

use crate::interpreter::{CommandRegistry, Environment, Limits, parse_invocation};
use crate::translate::translate;

/// Sandbox root plus the current working directory.
///
/// The cwd starts at the root, always stays inside it, and only changes
/// through [`SessionState::change_dir`] / [`SessionState::reset_cwd`].
#[derive(Debug, Clone)]
pub struct SessionState {
    sandbox: Sandbox,
    cwd: PathBuf,
}

impl SessionState {
    pub fn new(sandbox: Sandbox) -> Self {
        let cwd = sandbox.root().to_path_buf();
        Self { sandbox, cwd }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve user input against the cwd, confined to the sandbox.
    pub fn resolve(&self, input: &str) -> Result<PathBuf> {
        self.sandbox.resolve(&self.cwd, input)
    }

    /// Move the cwd to `input` if it names a directory. Returns `false`
    /// (cwd unchanged) when it does not.
    pub fn change_dir(&mut self, input: &str) -> Result<bool> {
        let target = self.resolve(input)?;
        if target.is_dir() {
            self.cwd = target;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Return the cwd to the sandbox root.
    pub fn reset_cwd(&mut self) {
        self.cwd = self.sandbox.root().to_path_buf();
    }

    /// The cwd as `pwd` prints it.
    pub fn cwd_display(&self) -> String {
        self.sandbox.display_path(&self.cwd)
    }
}

/// Result of one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub text: String,
    /// `false` when the text is an error report. Never fatal.
    pub succeeded: bool,
}

impl ExecutionOutcome {
    fn success(text: String) -> Self {
        Self {
            text,
            succeeded: true,
        }
    }

    /// Convert an error into the text shown to the caller.
    fn failure(err: ShellError) -> Self {
        let text = match &err {
            ShellError::SandboxViolation { .. } => format!("PermissionError: {err}"),
            e if e.is_unexpected() => {
                log::error!("Error executing command: {err:?}");
                format!("Error: {err}")
            },
            _ => err.to_string(),
        };
        Self {
            text,
            succeeded: false,
        }
    }
}

/// One shell session: a command registry, host services, and the mutable
/// session state they operate on.
///
/// Not for concurrent use; give each logical session its own `Terminal`.
/// Registry and platform are shared between terminals via `Arc`.
pub struct Terminal {
    registry: Arc<CommandRegistry>,
    platform: Arc<dyn ProcessService>,
    limits: Limits,
    session: SessionState,
}

impl Terminal {
    /// A terminal with the built-in commands, host process accounting, and
    /// default limits.
    pub fn new(sandbox: Sandbox) -> Self {
        Self::with_parts(
            sandbox,
            Arc::new(CommandRegistry::with_builtins()),
            Arc::new(HostPlatform::new()),
            Limits::default(),
        )
    }

    pub fn with_parts(
        sandbox: Sandbox,
        registry: Arc<CommandRegistry>,
        platform: Arc<dyn ProcessService>,
        limits: Limits,
    ) -> Self {
        Self {
            registry,
            platform,
            limits,
            session: SessionState::new(sandbox),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The cwd as `pwd` prints it; used for prompts and responses.
    pub fn cwd_display(&self) -> String {
        self.session.cwd_display()
    }

    /// Execute a raw line and return only the text.
    pub fn execute(&mut self, raw: &str) -> String {
        self.run(raw).text
    }

    /// Execute a raw line.
    ///
    /// Natural-language phrasing is rewritten first, then the line is
    /// tokenized and split at `>`. Every error is converted to text; the
    /// session stays usable after any failure.
    pub fn run(&mut self, raw: &str) -> ExecutionOutcome {
        let translated = translate(raw);
        let line = translated.as_deref().unwrap_or(raw).trim();
        if line.is_empty() {
            return ExecutionOutcome::success(String::new());
        }

        let invocation = match parse_invocation(line) {
            Ok(inv) => inv,
            Err(e) => return ExecutionOutcome::failure(e),
        };

        let outcome = match invocation.command() {
            Some(name) => self.invoke(name, &invocation.args()),
            None => ExecutionOutcome::success(String::new()),
        };

        match invocation.redirect {
            // Redirection swallows the output, error reports included.
            Some(target) => match self.write_redirect(&target, &outcome.text) {
                Ok(()) => ExecutionOutcome {
                    text: String::new(),
                    succeeded: outcome.succeeded,
                },
                Err(e) => ExecutionOutcome::failure(e),
            },
            None => outcome,
        }
    }

    fn invoke(&mut self, name: &str, args: &[&str]) -> ExecutionOutcome {
        let mut env = Environment {
            session: &mut self.session,
            platform: self.platform.as_ref(),
            limits: self.limits,
            registry: &self.registry,
        };
        match self.registry.dispatch(name, args, &mut env) {
            Ok(output) => ExecutionOutcome::success(output.into_text()),
            Err(e) => ExecutionOutcome::failure(e),
        }
    }

    /// Overwrite `target` with `text`, creating parent directories.
    fn write_redirect(&self, target: &str, text: &str) -> Result<()> {
        let path = self.session.resolve(target)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text)?;
        Ok(())
    }
}
