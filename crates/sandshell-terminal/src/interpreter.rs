//! Command trait, registry, tokenizer, and redirection parsing.

use std::collections::HashMap;

use sandshell_platform::ProcessService;
use sandshell_types::config::{
    DEFAULT_MAX_CAT_BYTES, DEFAULT_PROCESS_LIMIT, DEFAULT_PROCESS_NAME_WIDTH, ShellConfig,
};
use sandshell_types::error::{Result, ShellError};

use crate::session::SessionState;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Plain text.
    Text(String),
    /// Command produced no visible output.
    None,
}

impl CommandOutput {
    /// The text a caller (or a redirection target) receives.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::None => String::new(),
        }
    }
}

/// Tunable limits applied by individual commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest file `cat` prints, in bytes.
    pub max_cat_bytes: u64,
    /// Maximum number of lines `ps` prints.
    pub process_limit: usize,
    /// Truncation width for process names in `ps`.
    pub process_name_width: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_cat_bytes: DEFAULT_MAX_CAT_BYTES,
            process_limit: DEFAULT_PROCESS_LIMIT,
            process_name_width: DEFAULT_PROCESS_NAME_WIDTH,
        }
    }
}

impl From<&ShellConfig> for Limits {
    fn from(cfg: &ShellConfig) -> Self {
        Self {
            max_cat_bytes: cfg.sandbox.max_cat_bytes,
            process_limit: cfg.system.process_limit,
            process_name_width: cfg.system.process_name_width,
        }
    }
}

/// Everything a command may touch while it runs.
pub struct Environment<'a> {
    /// Sandbox root and current directory. The only route to the filesystem.
    pub session: &'a mut SessionState,
    /// Host process accounting.
    pub platform: &'a dyn ProcessService,
    /// Per-command limits.
    pub limits: Limits,
    /// The registry dispatching this command (for `help`).
    pub registry: &'a CommandRegistry,
}

/// A single executable command.
pub trait Command: Send + Sync {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[path\]").
    fn usage(&self) -> &str;

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// Registry of available commands with dispatch.
///
/// Built once at startup and shared read-only between sessions.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in command.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        crate::register_builtins(&mut reg);
        reg
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    /// Run `name` with `args`.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[&str],
        env: &mut Environment<'_>,
    ) -> Result<CommandOutput> {
        match self.get(name) {
            Some(cmd) => cmd.execute(args, env),
            None => Err(ShellError::UnknownCommand(name.to_string())),
        }
    }

    /// Return a sorted list of (name, description) pairs.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }

    /// Return sorted completions for a partial command name.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .keys()
            .filter(|name| name.starts_with(partial))
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tokenizer: handles single quotes, double quotes, and backslash escapes.
// ---------------------------------------------------------------------------

/// One word of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    /// Whether any part of the word was quoted or escaped. A quoted `>` is
    /// an ordinary argument, not a redirection.
    pub quoted: bool,
}

/// Split a command line into words respecting quotes and backslash escapes.
///
/// - Single-quoted strings preserve all characters literally.
/// - Inside double quotes a backslash only escapes `"`, `\` and `$`.
/// - Outside quotes a backslash escapes the next character.
/// - Adjacent quoted and unquoted pieces join into one word, and `''`
///   yields an empty word.
pub fn tokenize_words(input: &str) -> Result<Vec<Word>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut quoted = false;
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            if ch == '"' {
                in_double = false;
            } else if ch == '\\' {
                match chars.peek() {
                    Some(&next) if matches!(next, '"' | '\\' | '$') => {
                        chars.next();
                        current.push(next);
                    },
                    _ => current.push('\\'),
                }
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '\'' => {
                    in_single = true;
                    started = true;
                    quoted = true;
                },
                '"' => {
                    in_double = true;
                    started = true;
                    quoted = true;
                },
                '\\' => match chars.next() {
                    Some(next) => {
                        current.push(next);
                        started = true;
                        quoted = true;
                    },
                    None => return Err(ShellError::Parse("No escaped character".to_string())),
                },
                c if c.is_whitespace() => {
                    if started {
                        words.push(Word {
                            text: std::mem::take(&mut current),
                            quoted,
                        });
                        started = false;
                        quoted = false;
                    }
                },
                _ => {
                    current.push(ch);
                    started = true;
                },
            }
        }
    }

    if in_single || in_double {
        return Err(ShellError::Parse("No closing quotation".to_string()));
    }

    if started {
        words.push(Word {
            text: current,
            quoted,
        });
    }

    Ok(words)
}

/// Tokenize a command line into plain strings.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    Ok(tokenize_words(input)?.into_iter().map(|w| w.text).collect())
}

/// Quote `word` so [`tokenize`] reads it back as exactly one token.
pub fn quote(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }
    let safe = word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r#"'"'"'"#))
}

// ---------------------------------------------------------------------------
// Invocation parsing
// ---------------------------------------------------------------------------

/// A tokenized command line, split at the first unquoted `>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInvocation {
    /// Command name followed by its arguments. May be empty (`> file`).
    pub words: Vec<String>,
    /// Redirection target, if the line contained `>`.
    pub redirect: Option<String>,
}

impl ParsedInvocation {
    /// The command name, if any.
    pub fn command(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// Arguments after the command name.
    pub fn args(&self) -> Vec<&str> {
        self.words.iter().skip(1).map(String::as_str).collect()
    }
}

/// Tokenize `line` and detect output redirection.
///
/// Everything before the first unquoted `>` is the command; the word right
/// after it is the target. Words past the target are ignored.
pub fn parse_invocation(line: &str) -> Result<ParsedInvocation> {
    let words = tokenize_words(line)?;
    let redirect_at = words.iter().position(|w| !w.quoted && w.text == ">");

    match redirect_at {
        Some(pos) => {
            let target = words
                .get(pos + 1)
                .map(|w| w.text.clone())
                .ok_or_else(|| ShellError::UnexpectedToken(">".to_string()))?;
            Ok(ParsedInvocation {
                words: words.into_iter().take(pos).map(|w| w.text).collect(),
                redirect: Some(target),
            })
        },
        None => Ok(ParsedInvocation {
            words: words.into_iter().map(|w| w.text).collect(),
            redirect: None,
        }),
    }
}
