//! Process service trait and host implementation.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use sandshell_types::error::Result;
use sysinfo::{ProcessesToUpdate, System};

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// One process as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// CPU usage since the previous refresh (0.0 on the first sample).
    pub cpu_percent: f32,
    /// Resident memory as a share of total physical memory.
    pub memory_percent: f32,
}

/// Instantaneous host resource snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemStats {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub used_memory_bytes: u64,
    pub total_memory_bytes: u64,
    pub logical_cores: usize,
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// Read-only access to host process and resource accounting.
///
/// Implementations are best-effort: processes that vanish or cannot be
/// inspected mid-query are skipped, never reported as errors.
pub trait ProcessService: Send + Sync {
    /// Snapshot of the processes visible to this user, in no particular order.
    fn processes(&self) -> Result<Vec<ProcessInfo>>;

    /// Current CPU and memory utilization.
    fn system_stats(&self) -> Result<SystemStats>;
}

// ---------------------------------------------------------------------------
// Host implementation
// ---------------------------------------------------------------------------

/// Sampling window for the CPU utilization reading.
const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// [`ProcessService`] backed by `sysinfo`.
///
/// Keeps one `System` alive between calls so per-process CPU usage is
/// measured against the previous `ps` rather than always reading zero.
pub struct HostPlatform {
    system: Mutex<System>,
}

impl HostPlatform {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessService for HostPlatform {
    fn processes(&self) -> Result<Vec<ProcessInfo>> {
        let mut sys = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        sys.refresh_memory();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let total = sys.total_memory();
        let procs = sys
            .processes()
            .iter()
            .map(|(pid, proc_)| ProcessInfo {
                pid: pid.as_u32(),
                name: proc_.name().to_string_lossy().into_owned(),
                cpu_percent: proc_.cpu_usage(),
                memory_percent: percent(proc_.memory(), total),
            })
            .collect::<Vec<_>>();
        log::debug!("Sampled {} processes", procs.len());
        Ok(procs)
    }

    fn system_stats(&self) -> Result<SystemStats> {
        let mut sys = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        sys.refresh_cpu_usage();
        std::thread::sleep(CPU_SAMPLE_INTERVAL.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let used = sys.used_memory();
        let total = sys.total_memory();
        let cores = match sys.cpus().len() {
            0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        };
        Ok(SystemStats {
            cpu_percent: sys.global_cpu_usage(),
            memory_percent: percent(used, total),
            used_memory_bytes: used,
            total_memory_bytes: total,
            logical_cores: cores,
        })
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64 * 100.0) as f32
    }
}
