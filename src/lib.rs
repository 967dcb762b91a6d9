pub mod conditions;
pub mod error;
pub mod optimizer;
pub mod parallel;
mod progress;
pub mod table;
pub mod wind_rose;

pub use crate::conditions::{AmbientCondition, WindRose};
pub use crate::error::{OptimizeError, Result};
pub use crate::optimizer::{CaseRequest, CaseResult, WindSpeedBounds, YawOptimizer};
pub use crate::parallel::{ParallelProcessor, WorkerPool};
pub use crate::table::ResultTable;
pub use crate::wind_rose::{WindRoseParallelOptimizer, WindRoseSettings};
