//! sandshell entry point.
//!
//! `sandshell` (or `sandshell repl`) starts an interactive prompt;
//! `sandshell serve` exposes the same backend over HTTP.

mod repl;
mod server;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sandshell_types::config::ShellConfig;

#[derive(Parser)]
#[command(name = "sandshell", version, about = "A shell confined to one directory tree")]
struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(long, env = "SANDSHELL_CONFIG", default_value = "sandshell.toml", global = true)]
    config: PathBuf,

    /// Sandbox root directory (overrides the config file)
    #[arg(long, env = "SANDSHELL_ROOT", global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Interactive prompt (default)
    Repl,
    /// HTTP command server
    Serve {
        /// Listen address (overrides the config file)
        #[arg(long, env = "SANDSHELL_BIND")]
        bind: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = ShellConfig::load(&cli.config)?;
    if let Some(root) = cli.root {
        config.sandbox.root = root;
    }

    match cli.mode.unwrap_or(Mode::Repl) {
        Mode::Repl => repl::run(&config),
        Mode::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::run(config))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_repl() {
        let cli = Cli::try_parse_from(["sandshell"]).unwrap();
        assert!(cli.mode.is_none());
        assert!(cli.root.is_none());
    }

    #[test]
    fn cli_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "sandshell", "serve", "--bind", "127.0.0.1:9000", "--root", "/tmp/box",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/box")));
        match cli.mode {
            Some(Mode::Serve { bind }) => assert_eq!(bind.as_deref(), Some("127.0.0.1:9000")),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
