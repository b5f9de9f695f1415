//! Pipeline configuration

use chrono::NaiveDateTime;

use crate::error::RfmError;

/// Default number of quantile bins per metric.
pub const DEFAULT_BINS: usize = 5;

/// Invoice ids containing this marker denote cancelled transactions.
pub const DEFAULT_CANCELLATION_MARKER: &str = "C";

/// Explicit configuration for one segmentation run.
///
/// The reference date is a fixed constant rather than wall-clock "now" so
/// that runs are reproducible. It must be at or after the newest invoice
/// timestamp in the cleaned data; an earlier reference date yields negative
/// recency values and is the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct RfmConfig {
    pub reference_date: NaiveDateTime,
    pub bins: usize,
    pub cancellation_marker: String,
}

impl RfmConfig {
    pub fn new(
        reference_date: NaiveDateTime,
        bins: usize,
        cancellation_marker: String,
    ) -> crate::Result<Self> {
        if !(2..=5).contains(&bins) {
            return Err(RfmError::InvalidBins(bins));
        }

        Ok(Self {
            reference_date,
            bins,
            cancellation_marker,
        })
    }

    /// Config with default bin count and cancellation marker.
    pub fn for_reference_date(reference_date: NaiveDateTime) -> Self {
        Self {
            reference_date,
            bins: DEFAULT_BINS,
            cancellation_marker: DEFAULT_CANCELLATION_MARKER.to_string(),
        }
    }
}
