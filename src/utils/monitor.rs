#[cfg(feature = "cli")]
use std::sync::Mutex;
use std::time::Instant;
#[cfg(feature = "cli")]
use std::time::Duration;
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// Resource usage sampled when a pipeline phase finishes.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseSample {
    pub phase: String,
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub elapsed: Duration,
}

/// Samples process CPU and memory at phase boundaries and keeps the
/// per-phase history for the end-of-run summary. Disabled monitors (and
/// monitors that could not resolve the current PID) are no-ops.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    state: Option<Mutex<MonitorState>>,
    started: Instant,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
    samples: Vec<PhaseSample>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let state = if enabled {
            sysinfo::get_current_pid().ok().map(|pid| {
                let mut system = System::new_with_specifics(RefreshKind::everything());
                system.refresh_all();
                Mutex::new(MonitorState {
                    system,
                    pid,
                    peak_memory_mb: 0,
                    samples: Vec::new(),
                })
            })
        } else {
            None
        };

        Self {
            state,
            started: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    /// Samples resource usage and logs it under the phase name.
    pub fn sample(&self, phase: &str) {
        let Some(state) = &self.state else { return };
        let Ok(mut state) = state.lock() else { return };

        state.system.refresh_all();
        let (cpu_percent, memory_mb) = {
            let Some(process) = state.system.process(state.pid) else {
                return;
            };
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };
        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);

        let elapsed = self.started.elapsed();
        tracing::info!(
            "📊 {} - CPU: {:.1}%, Memory: {}MB, Time: {:?}",
            phase,
            cpu_percent,
            memory_mb,
            elapsed
        );

        state.samples.push(PhaseSample {
            phase: phase.to_string(),
            cpu_percent,
            memory_mb,
            elapsed,
        });
    }

    /// Logs total runtime, peak memory and the per-phase timing breakdown.
    pub fn summarize(&self) {
        let Some(state) = &self.state else { return };
        let Ok(state) = state.lock() else { return };

        let mut previous = Duration::ZERO;
        for sample in &state.samples {
            let phase_time = sample.elapsed.saturating_sub(previous);
            previous = sample.elapsed;
            tracing::info!("   {} phase took {:?}", sample.phase, phase_time);
        }

        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
            self.started.elapsed(),
            state.peak_memory_mb
        );
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// No-op implementation for builds without the cli feature
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor {
    started: Instant,
}

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn sample(&self, _phase: &str) {}

    pub fn summarize(&self) {
        tracing::debug!("Run finished in {:?}", self.started.elapsed());
    }
}
