//! The single-case optimizer contract.
//!
//! Wake modeling and the yaw search itself live behind [`YawOptimizer`];
//! the wind rose driver only hands out one [`CaseRequest`] at a time and
//! collects the [`CaseResult`] rows.

use anyhow::Result;

use crate::conditions::AmbientCondition;

/// Wind speed range (m/s) in which yaw angles are optimized.
///
/// Outside the range an optimizer reports the baseline yaw angles instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSpeedBounds {
    pub minimum_ws: f64,
    pub maximum_ws: f64,
}

impl WindSpeedBounds {
    pub fn new(minimum_ws: f64, maximum_ws: f64) -> Self {
        Self {
            minimum_ws,
            maximum_ws,
        }
    }

    pub fn contains(&self, ws: f64) -> bool {
        ws >= self.minimum_ws && ws <= self.maximum_ws
    }
}

impl Default for WindSpeedBounds {
    fn default() -> Self {
        Self::new(0.0, 25.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseRequest {
    /// Position of the case in the input arrays
    pub index: usize,
    pub condition: AmbientCondition,
    pub bounds: WindSpeedBounds,
}

impl CaseRequest {
    /// Whether yaw angles should be optimized for this case at all.
    pub fn in_bounds(&self) -> bool {
        self.bounds.contains(self.condition.wind_speed)
    }
}

/// One row of the result table. Powers are in W, angles in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseResult {
    pub ws: f64,
    pub wd: f64,
    pub ti: Option<f64>,
    pub power_baseline: Option<f64>,
    pub power_baseline_weighted: Option<f64>,
    pub turbine_power_baseline: Option<Vec<f64>>,
    pub power_opt: f64,
    pub power_opt_weighted: f64,
    pub turbine_power_opt: Vec<f64>,
    pub yaw_angles: Vec<f64>,
}

impl CaseResult {
    pub fn has_baseline(&self) -> bool {
        self.power_baseline.is_some()
            && self.power_baseline_weighted.is_some()
            && self.turbine_power_baseline.is_some()
    }
}

/// Optimizes yaw angles for a single ambient condition.
///
/// Every worker thread receives its own clone, so implementations may keep
/// scratch state in `&mut self` without synchronization.
pub trait YawOptimizer: Clone + Send {
    fn optimize_case(&mut self, request: &CaseRequest) -> Result<CaseResult>;

    /// Whether baseline (zero-yaw) powers are computed alongside the optimum.
    fn calc_init_power(&self) -> bool;

    fn set_calc_init_power(&mut self, enabled: bool);
}
