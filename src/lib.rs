//! RFMForge: customer segmentation using RFM quantile scoring
//!
//! Computes a Recency-Frequency-Monetary profile per customer from raw
//! transaction line items, scores each metric into quantile bins, and maps
//! the recency/frequency score pair to a named behavioral segment.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod score;
pub mod segment;

// Re-export public items for easier access
pub use cli::Args;
pub use config::RfmConfig;
pub use data::{
    aggregate, clean, CsvLineItemSource, CustomerMetrics, LineItem, LineItemSource,
    MemoryLineItemSource, RawRecord,
};
pub use error::RfmError;
pub use report::{summarize, CsvSegmentSink, CustomerSegmentSink, MemorySegmentSink, SegmentSummary};
pub use score::{score, ScoredCustomer};
pub use segment::{classify, classify_code, Segment};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, RfmError>;

/// Run the full pipeline over raw records: clean, aggregate, score, classify.
pub fn segment_customers(
    records: &[RawRecord],
    config: &RfmConfig,
) -> Result<Vec<ScoredCustomer>> {
    let line_items = data::clean(records, config);
    let metrics = data::aggregate(&line_items, config.reference_date);
    score::score(&metrics, config.bins)
}
