//! Process metric sources behind one capability seam, so the producer loop
//! never cares whether samples are synthetic or probed from the OS.

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sysinfo::{
    CpuRefreshKind, MemoryRefreshKind, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System,
};
use tracing::{info, warn};

use crate::types::ProcessSample;

/// Contract: returns a finite batch of well-formed samples and never blocks
/// longer than one tick.
pub trait MetricProbe {
    fn sample(&mut self, max: usize) -> Vec<ProcessSample>;
}

/// Picks the probe from `PROCPULSE_AGENT_PROBE` (`synthetic` | `system`).
pub fn from_env() -> Box<dyn MetricProbe + Send> {
    match std::env::var("PROCPULSE_AGENT_PROBE").as_deref() {
        Ok("system") => {
            info!("using system metric probe");
            Box::new(SystemProbe::new())
        }
        Ok("synthetic") | Err(_) => {
            info!("using synthetic metric probe");
            Box::new(SyntheticProbe::new())
        }
        Ok(other) => {
            warn!("unrecognized PROCPULSE_AGENT_PROBE={other:?}, using synthetic");
            Box::new(SyntheticProbe::new())
        }
    }
}

const MOCK_NAMES: [&str; 8] = [
    "systemd", "sshd", "nginx", "node", "python", "monitor", "chrome", "code",
];

/// Fake process table for hosts where the agent has no probe privileges and
/// for demo runs. Owns its RNG, seeded once from wall-clock seconds.
pub struct SyntheticProbe {
    rng: StdRng,
}

impl SyntheticProbe {
    pub fn new() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::with_seed(secs)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl MetricProbe for SyntheticProbe {
    fn sample(&mut self, max: usize) -> Vec<ProcessSample> {
        (0..max)
            .map(|i| ProcessSample {
                pid: 1000 + (i as u32) * 100 + self.rng.random_range(0..50u32),
                cpu_percent: f64::from(self.rng.random_range(0..10_000u32)) / 100.0,
                mem_mb: f64::from(self.rng.random_range(0..2048u32)) + 10.0,
                name: MOCK_NAMES[i % MOCK_NAMES.len()].to_string(),
            })
            .collect()
    }
}

// Optional normalization: divide per-process cpu_usage by logical core count
// so a fully saturated multi-core process reports near 100% instead of N*100%.
// Off by default; per-process readings above 100% are legitimate on multi-core.
fn normalize_cpu_enabled() -> bool {
    static ON: OnceCell<bool> = OnceCell::new();
    *ON.get_or_init(|| {
        std::env::var("PROCPULSE_AGENT_NORMALIZE_CPU")
            .map(|v| v != "0")
            .unwrap_or(false)
    })
}

/// Real process table via sysinfo; reports the heaviest CPU consumers first.
pub struct SystemProbe {
    sys: System,
}

impl SystemProbe {
    pub fn new() -> Self {
        let refresh = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything())
            .with_processes(ProcessRefreshKind::everything());
        let mut sys = System::new_with_specifics(refresh);
        sys.refresh_all();
        Self { sys }
    }
}

impl MetricProbe for SystemProbe {
    fn sample(&mut self, max: usize) -> Vec<ProcessSample> {
        let kind = ProcessRefreshKind::nothing().with_cpu().with_memory();
        self.sys
            .refresh_processes_specifics(ProcessesToUpdate::All, true, kind);
        self.sys.refresh_cpu_usage();

        let n_cpus = self.sys.cpus().len().max(1) as f32;
        let mut batch: Vec<ProcessSample> = self
            .sys
            .processes()
            .values()
            .filter(|p| p.memory() > 0)
            .map(|p| {
                let raw = p.cpu_usage();
                let cpu = if normalize_cpu_enabled() {
                    (raw / n_cpus).min(100.0)
                } else {
                    raw
                };
                ProcessSample {
                    pid: p.pid().as_u32(),
                    cpu_percent: f64::from(cpu),
                    mem_mb: p.memory() as f64 / (1024.0 * 1024.0),
                    name: p.name().to_string_lossy().to_string(),
                }
            })
            .collect();
        batch.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(Ordering::Equal)
        });
        batch.truncate(max);
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_batch_has_requested_size_and_ranges() {
        let mut probe = SyntheticProbe::with_seed(7);
        let batch = probe.sample(8);
        assert_eq!(batch.len(), 8);
        for (i, s) in batch.iter().enumerate() {
            let base = 1000 + (i as u32) * 100;
            assert!(
                s.pid >= base && s.pid < base + 50,
                "pid {} out of slot {i}",
                s.pid
            );
            assert!((0.0..100.0).contains(&s.cpu_percent));
            assert!((10.0..2058.0).contains(&s.mem_mb));
            assert_eq!(s.name, MOCK_NAMES[i % MOCK_NAMES.len()]);
        }
    }

    #[test]
    fn synthetic_is_deterministic_per_seed() {
        let a = SyntheticProbe::with_seed(42).sample(8);
        let b = SyntheticProbe::with_seed(42).sample(8);
        let pids_a: Vec<u32> = a.iter().map(|s| s.pid).collect();
        let pids_b: Vec<u32> = b.iter().map(|s| s.pid).collect();
        assert_eq!(pids_a, pids_b);
    }

    #[test]
    fn name_rotation_wraps_past_eight() {
        let mut probe = SyntheticProbe::with_seed(1);
        let batch = probe.sample(10);
        assert_eq!(batch[8].name, MOCK_NAMES[0]);
        assert_eq!(batch[9].name, MOCK_NAMES[1]);
    }
}
