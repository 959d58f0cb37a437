//! Session and host commands: pwd, echo, ps, sysinfo, help.

use sandshell_types::error::{Result, ShellError};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

const BYTES_PER_MIB: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print the current working directory."
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.session.cwd_display()))
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Display a line of text."
    }
    fn usage(&self) -> &str {
        "echo [text...]"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(args.join(" ")))
    }
}

// ---------------------------------------------------------------------------
// ps
// ---------------------------------------------------------------------------

struct PsCmd;
impl Command for PsCmd {
    fn name(&self) -> &str {
        "ps"
    }
    fn description(&self) -> &str {
        "Display a list of running processes."
    }
    fn usage(&self) -> &str {
        "ps"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let procs = match env.platform.processes() {
            Ok(procs) => procs,
            Err(e) => {
                log::warn!("ps: process listing failed: {e}");
                return Ok(CommandOutput::Text(String::new()));
            },
        };

        let width = env.limits.process_name_width;
        let mut lines: Vec<String> = procs
            .iter()
            .map(|p| {
                let name: String = p.name.chars().take(width).collect();
                format!(
                    "{:>6} {:<width$} CPU:{:>5.1} MEM:{:>5.1}",
                    p.pid, name, p.cpu_percent, p.memory_percent
                )
            })
            .collect();
        lines.sort();
        lines.truncate(env.limits.process_limit);
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// sysinfo
// ---------------------------------------------------------------------------

struct SysinfoCmd;
impl Command for SysinfoCmd {
    fn name(&self) -> &str {
        "sysinfo"
    }
    fn description(&self) -> &str {
        "Display system information (CPU, memory, cores)."
    }
    fn usage(&self) -> &str {
        "sysinfo"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let text = match env.platform.system_stats() {
            Ok(stats) => format!(
                "CPU: {:.1}%\nMemory: {:.1}% ({}MB / {}MB)\nCores: {}",
                stats.cpu_percent,
                stats.memory_percent,
                stats.used_memory_bytes / BYTES_PER_MIB,
                stats.total_memory_bytes / BYTES_PER_MIB,
                stats.logical_cores,
            ),
            Err(e) => {
                log::warn!("sysinfo: stats unavailable: {e}");
                format!("sysinfo: unavailable ({e})")
            },
        };
        Ok(CommandOutput::Text(text))
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "Show this help message."
    }
    fn usage(&self) -> &str {
        "help [command]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if let Some(&name) = args.first() {
            let Some(cmd) = env.registry.get(name) else {
                return Err(ShellError::NotFound(format!(
                    "help: no such command: {name}"
                )));
            };
            return Ok(CommandOutput::Text(format!(
                "{}\nusage: {}",
                cmd.description(),
                cmd.usage()
            )));
        }

        let mut lines = vec!["Available commands:".to_string()];
        for (name, desc) in env.registry.list_commands() {
            lines.push(format!("  {name:<10} - {desc}"));
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

/// Register pwd, echo, ps, sysinfo, and help into a registry.
pub fn register_system_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(PsCmd));
    reg.register(Box::new(SysinfoCmd));
    reg.register(Box::new(HelpCmd));
}
