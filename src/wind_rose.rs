//! Yaw optimization over a wind rose, one ambient condition per task.

use std::io::{self, Write};

use crate::conditions::WindRose;
use crate::error::{OptimizeError, Result};
use crate::optimizer::{CaseRequest, CaseResult, WindSpeedBounds, YawOptimizer};
use crate::parallel::ParallelProcessor;
use crate::progress::{create_progress_bar, write_banner};
use crate::table::ResultTable;

#[derive(Debug, Clone, PartialEq)]
pub struct WindRoseSettings {
    /// Wind speeds outside these bounds keep the baseline yaw angles.
    pub bounds: WindSpeedBounds,
    /// Show a progress bar while optimizing. The start banner is always
    /// written.
    pub verbose: bool,
    /// Worker threads, defaults to the number of CPUs
    pub num_workers: Option<usize>,
}

impl Default for WindRoseSettings {
    fn default() -> Self {
        Self {
            bounds: WindSpeedBounds::default(),
            verbose: true,
            num_workers: None,
        }
    }
}

/// Runs a [`YawOptimizer`] once per ambient condition of a wind rose on a
/// pool of worker threads and assembles the rows into a [`ResultTable`].
pub struct WindRoseParallelOptimizer<O: YawOptimizer> {
    yaw_opt: O,
    wind_rose: WindRose,
    settings: WindRoseSettings,
    processor: ParallelProcessor,
    banner_out: Box<dyn Write + Send>,
}

impl<O: YawOptimizer> WindRoseParallelOptimizer<O> {
    pub fn new(
        yaw_opt: O,
        wd_array: Vec<f64>,
        ws_array: Vec<f64>,
        ti_array: Option<Vec<f64>>,
        settings: WindRoseSettings,
    ) -> Result<Self> {
        let wind_rose = WindRose::new(wd_array, ws_array, ti_array)?;
        Self::from_wind_rose(yaw_opt, wind_rose, settings)
    }

    pub fn from_wind_rose(
        yaw_opt: O,
        wind_rose: WindRose,
        settings: WindRoseSettings,
    ) -> Result<Self> {
        let bounds = settings.bounds;
        if bounds.minimum_ws.is_nan()
            || bounds.maximum_ws.is_nan()
            || bounds.minimum_ws > bounds.maximum_ws
        {
            return Err(OptimizeError::InvalidBounds {
                minimum: bounds.minimum_ws,
                maximum: bounds.maximum_ws,
            });
        }

        let processor = ParallelProcessor::new(settings.num_workers);

        Ok(Self {
            yaw_opt,
            wind_rose,
            settings,
            processor,
            banner_out: Box::new(io::stdout()),
        })
    }

    /// Replace the worker pool description, e.g. to spawn workers through
    /// a custom handler. `settings().num_workers` follows the new processor.
    pub fn with_processor(mut self, processor: ParallelProcessor) -> Self {
        self.settings.num_workers = Some(processor.num_workers());
        self.processor = processor;
        self
    }

    /// Write the start banner to `out` instead of stdout.
    pub fn with_banner_output<W: Write + Send + 'static>(mut self, out: W) -> Self {
        self.banner_out = Box::new(out);
        self
    }

    pub fn wind_rose(&self) -> &WindRose {
        &self.wind_rose
    }

    pub fn settings(&self) -> &WindRoseSettings {
        &self.settings
    }

    pub fn yaw_optimizer(&self) -> &O {
        &self.yaw_opt
    }

    pub fn yaw_optimizer_mut(&mut self) -> &mut O {
        &mut self.yaw_opt
    }

    pub fn into_inner(self) -> O {
        self.yaw_opt
    }

    /// Optimize every ambient condition in parallel.
    ///
    /// Baseline power is always computed: the held optimizer's
    /// `calc_init_power` flag is switched on and stays on after the call.
    /// Blocks until every case has finished; the first failing case aborts
    /// the sweep and no table is returned.
    pub fn optimize(&mut self) -> Result<ResultTable> {
        let pool = self.processor.acquire()?;

        write_banner(
            &mut self.banner_out,
            "Optimizing wake redirection control in parallel...",
            self.wind_rose.len(),
        )?;

        self.yaw_opt.set_calc_init_power(true);

        tracing::info!(
            conditions = self.wind_rose.len(),
            workers = pool.num_workers(),
            "starting parallel wind rose optimization"
        );

        let progress = self
            .settings
            .verbose
            .then(|| create_progress_bar(self.wind_rose.len()));

        let result = pool.map_ordered(
            self.requests(),
            self.yaw_opt.clone(),
            |yaw_opt, index, request| -> Result<CaseResult> {
                let row = optimize_one_case(yaw_opt, index, &request)?;
                if let Some(ref pb) = progress {
                    pb.inc(1);
                }
                Ok(row)
            },
        );
        drop(pool);

        let rows = match result {
            Ok(rows) => rows,
            Err(err) => {
                if let Some(ref pb) = progress {
                    pb.abandon();
                }
                return Err(err);
            }
        };

        if let Some(ref pb) = progress {
            pb.finish_with_message("Optimization complete");
        }

        Ok(self.assemble(rows))
    }

    /// Optimize every ambient condition on the calling thread.
    ///
    /// Same contract as [`optimize`](Self::optimize) without a worker pool.
    pub fn optimize_serial(&mut self) -> Result<ResultTable> {
        write_banner(
            &mut self.banner_out,
            "Optimizing wake redirection control...",
            self.wind_rose.len(),
        )?;

        self.yaw_opt.set_calc_init_power(true);

        let progress = self
            .settings
            .verbose
            .then(|| create_progress_bar(self.wind_rose.len()));

        let mut rows = Vec::with_capacity(self.wind_rose.len());
        for (index, request) in self.requests() {
            match optimize_one_case(&mut self.yaw_opt, index, &request) {
                Ok(row) => rows.push(row),
                Err(err) => {
                    if let Some(ref pb) = progress {
                        pb.abandon();
                    }
                    return Err(err);
                }
            }
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(ref pb) = progress {
            pb.finish_with_message("Optimization complete");
        }

        Ok(self.assemble(rows))
    }

    fn requests(&self) -> Vec<(usize, CaseRequest)> {
        let bounds = self.settings.bounds;
        self.wind_rose
            .iter()
            .map(|(index, condition)| {
                (
                    index,
                    CaseRequest {
                        index,
                        condition,
                        bounds,
                    },
                )
            })
            .collect()
    }

    fn assemble(&self, rows: Vec<CaseResult>) -> ResultTable {
        let table = ResultTable::new(rows, self.wind_rose.has_turbulence_intensity());
        tracing::info!(rows = table.len(), "wind rose optimization finished");
        table
    }
}

fn optimize_one_case<O: YawOptimizer>(
    yaw_opt: &mut O,
    index: usize,
    request: &CaseRequest,
) -> Result<CaseResult> {
    let row = yaw_opt
        .optimize_case(request)
        .map_err(|source| OptimizeError::Case { index, source })?;

    tracing::debug!(
        index,
        wd = request.condition.wind_direction,
        ws = request.condition.wind_speed,
        power_opt = row.power_opt,
        "wind condition optimized"
    );

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[derive(Clone)]
    struct ConstantOptimizer {
        calc_init_power: bool,
    }

    impl YawOptimizer for ConstantOptimizer {
        fn optimize_case(&mut self, request: &CaseRequest) -> anyhow::Result<CaseResult> {
            if request.condition.wind_speed < 0.0 {
                bail!("negative wind speed");
            }
            let baseline = self.calc_init_power.then_some(1.0);
            Ok(CaseResult {
                ws: request.condition.wind_speed,
                wd: request.condition.wind_direction,
                ti: request.condition.turbulence_intensity,
                power_baseline: baseline,
                power_baseline_weighted: baseline,
                turbine_power_baseline: baseline.map(|p| vec![p]),
                power_opt: 1.0,
                power_opt_weighted: 1.0,
                turbine_power_opt: vec![1.0],
                yaw_angles: vec![0.0],
            })
        }

        fn calc_init_power(&self) -> bool {
            self.calc_init_power
        }

        fn set_calc_init_power(&mut self, enabled: bool) {
            self.calc_init_power = enabled;
        }
    }

    fn quiet() -> WindRoseSettings {
        WindRoseSettings {
            verbose: false,
            num_workers: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = WindRoseSettings::default();
        assert!(settings.verbose);
        assert_eq!(settings.bounds, WindSpeedBounds::new(0.0, 25.0));
        assert_eq!(settings.num_workers, None);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let settings = WindRoseSettings {
            bounds: WindSpeedBounds::new(10.0, 5.0),
            ..quiet()
        };
        let result = WindRoseParallelOptimizer::new(
            ConstantOptimizer {
                calc_init_power: true,
            },
            vec![270.0],
            vec![8.0],
            None,
            settings,
        );
        assert!(matches!(result, Err(OptimizeError::InvalidBounds { .. })));
    }

    #[test]
    fn test_case_error_carries_index() {
        let mut opt = WindRoseParallelOptimizer::new(
            ConstantOptimizer {
                calc_init_power: true,
            },
            vec![270.0, 280.0],
            vec![8.0, -1.0],
            None,
            quiet(),
        )
        .unwrap();

        match opt.optimize_serial() {
            Err(OptimizeError::Case { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source.to_string(), "negative wind speed");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_empty_sweep() {
        let mut opt = WindRoseParallelOptimizer::new(
            ConstantOptimizer {
                calc_init_power: false,
            },
            Vec::new(),
            Vec::new(),
            None,
            quiet(),
        )
        .unwrap();

        let table = opt.optimize().unwrap();
        assert!(table.is_empty());
        assert!(opt.yaw_optimizer().calc_init_power());
    }
}
