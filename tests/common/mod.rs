#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use parking_lot::Mutex;
use windrose::{CaseRequest, CaseResult, ParallelProcessor, WindRoseSettings, YawOptimizer};

pub const NUM_TURBINES: usize = 3;

/// Cube-law farm with a fixed yaw pattern, counting every case it solves.
#[derive(Clone)]
pub struct FakeOptimizer {
    pub calls: Arc<AtomicUsize>,
    pub calc_init_power: bool,
    pub fail_at: Option<usize>,
    /// When set, case `i` of `n` sleeps `(n - i) * step`
    pub reverse_latency: Option<(usize, Duration)>,
}

impl FakeOptimizer {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            calc_init_power: true,
            fail_at: None,
            reverse_latency: None,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl YawOptimizer for FakeOptimizer {
    fn optimize_case(&mut self, request: &CaseRequest) -> Result<CaseResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some((n, step)) = self.reverse_latency {
            let remaining = n.saturating_sub(request.index) as u32;
            std::thread::sleep(step * remaining);
        }

        if self.fail_at == Some(request.index) {
            bail!("solver diverged for case {}", request.index);
        }

        let ws = request.condition.wind_speed;
        let baseline_turbines = vec![ws.powi(3); NUM_TURBINES];

        let (yaw_angles, turbine_power_opt) = if request.in_bounds() {
            (vec![25.0, 15.0, 0.0], vec![0.9 * ws.powi(3), 1.1 * ws.powi(3), 1.2 * ws.powi(3)])
        } else {
            (vec![0.0; NUM_TURBINES], baseline_turbines.clone())
        };

        let power_opt: f64 = turbine_power_opt.iter().sum();
        let power_baseline: f64 = baseline_turbines.iter().sum();

        Ok(CaseResult {
            ws,
            wd: request.condition.wind_direction,
            ti: request.condition.turbulence_intensity,
            power_baseline: self.calc_init_power.then_some(power_baseline),
            power_baseline_weighted: self.calc_init_power.then_some(power_baseline),
            turbine_power_baseline: self.calc_init_power.then_some(baseline_turbines),
            power_opt,
            power_opt_weighted: power_opt,
            turbine_power_opt,
            yaw_angles,
        })
    }

    fn calc_init_power(&self) -> bool {
        self.calc_init_power
    }

    fn set_calc_init_power(&mut self, enabled: bool) {
        self.calc_init_power = enabled;
    }
}

pub fn quiet_settings(num_workers: usize) -> WindRoseSettings {
    WindRoseSettings {
        verbose: false,
        num_workers: Some(num_workers),
        ..Default::default()
    }
}

/// Worker pool whose threads are counted in `live` while they run.
pub fn counting_processor(workers: usize, live: Arc<AtomicUsize>) -> ParallelProcessor {
    ParallelProcessor::new(Some(workers)).with_spawn_handler(move |thread| {
        let live = Arc::clone(&live);
        live.fetch_add(1, Ordering::SeqCst);
        std::thread::Builder::new().spawn(move || {
            thread.run();
            live.fetch_sub(1, Ordering::SeqCst);
        })
    })
}

/// In-memory sink for the start banner.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
