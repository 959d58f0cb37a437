//! Interactive prompt over a single `Terminal`.

use std::sync::Arc;

use anyhow::Result;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use sandshell_fs::Sandbox;
use sandshell_platform::HostPlatform;
use sandshell_terminal::{CommandRegistry, Limits, Terminal};
use sandshell_types::config::ShellConfig;

/// Tab-completes command names in the first word of the line.
struct CommandCompleter {
    registry: Arc<CommandRegistry>,
}

impl Completer for CommandCompleter {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let head = &line[..pos];
        if head.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        Ok((0, self.registry.completions(head)))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}

pub fn run(config: &ShellConfig) -> Result<()> {
    let sandbox = Sandbox::create(&config.sandbox.root)?;
    let registry = Arc::new(CommandRegistry::with_builtins());
    let mut terminal = Terminal::with_parts(
        sandbox,
        Arc::clone(&registry),
        Arc::new(HostPlatform::new()),
        Limits::from(config),
    );

    let mut rl: Editor<CommandCompleter, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CommandCompleter { registry }));

    loop {
        let prompt = format!("{} $ ", terminal.cwd_display());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!();
                break;
            },
            Err(e) => return Err(e.into()),
        };

        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }
        let output = terminal.execute(&line);
        if !output.is_empty() {
            println!("{output}");
        }
    }
    Ok(())
}
