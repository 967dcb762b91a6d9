use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error(
        "Unable to start the rayon worker pool ({0}). Parallel wind rose optimization \
         needs OS worker threads; check the process thread limits (ulimit -u) or see \
         https://docs.rs/rayon for guidance on configuring the thread pool."
    )]
    WorkerPoolUnavailable(#[source] rayon::ThreadPoolBuildError),

    #[error("Array length mismatch: {name} has {actual} entries, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid input: {name}[{index}] = {value} is not finite")]
    InvalidInput {
        name: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Invalid wind speed bounds: minimum_ws {minimum} > maximum_ws {maximum}")]
    InvalidBounds { minimum: f64, maximum: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Optimization failed for wind condition {index}")]
    Case {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
