pub mod columns;
pub mod partition;
pub mod window;

pub use columns::*;
pub use partition::*;
pub use window::*;

use thiserror::Error;

/// Configuration errors for the grid math.
///
/// These fail fast: the grid never clamps an invalid configuration into a
/// divide-by-zero or an unbounded loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("column count must be at least 1")]
    InvalidColumns,
    #[error("estimated row height must be finite and positive, got {0}")]
    InvalidRowHeight(f64),
    #[error("overscan must be non-negative, got {0}")]
    InvalidOverscan(i64),
}
