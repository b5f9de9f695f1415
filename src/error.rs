//! Error types for the segmentation pipeline

use thiserror::Error;

/// Errors produced by the RFM pipeline.
///
/// `InsufficientPopulation` and `NoMatchingSegment` are fail-fast: no
/// partial segmentation is emitted when they occur.
#[derive(Debug, Error)]
pub enum RfmError {
    /// Quantile binning needs at least `required` distinct values per metric.
    #[error("cannot form {required} quantile bins for {metric}: only {distinct} distinct value(s)")]
    InsufficientPopulation {
        metric: &'static str,
        distinct: usize,
        required: usize,
    },

    /// A computed RF code matched no pattern in the segment table.
    /// The table covers all 25 valid codes, so this indicates a bug.
    #[error("RF code {code:?} matched no segment pattern")]
    NoMatchingSegment { code: String },

    /// The segment table only covers score digits 1 through 5.
    #[error("bin count must be between 2 and 5, got {0}")]
    InvalidBins(usize),

    #[error("invalid reference date {0:?}, expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidReferenceDate(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
