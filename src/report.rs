//! Output sinks and per-segment summary statistics

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::score::ScoredCustomer;
use crate::segment::Segment;

#[derive(Debug, Serialize)]
struct SegmentRow<'a> {
    customer_id: i64,
    recency: i64,
    frequency: u64,
    monetary: f64,
    segment: &'a str,
}

/// Consumes the final customer table.
pub trait CustomerSegmentSink {
    fn emit(&mut self, customers: &[ScoredCustomer]) -> crate::Result<()>;
}

/// Writes the segment table as CSV with a header row, one customer per row.
pub struct CsvSegmentSink {
    path: PathBuf,
}

impl CsvSegmentSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CustomerSegmentSink for CsvSegmentSink {
    fn emit(&mut self, customers: &[ScoredCustomer]) -> crate::Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for customer in customers {
            writer.serialize(SegmentRow {
                customer_id: customer.customer_id,
                recency: customer.recency,
                frequency: customer.frequency,
                monetary: customer.monetary,
                segment: customer.segment.as_str(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Collects customers in memory, for tests.
#[derive(Debug, Default)]
pub struct MemorySegmentSink {
    pub customers: Vec<ScoredCustomer>,
}

impl CustomerSegmentSink for MemorySegmentSink {
    fn emit(&mut self, customers: &[ScoredCustomer]) -> crate::Result<()> {
        self.customers.extend_from_slice(customers);
        Ok(())
    }
}

/// Aggregate statistics for one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub customers: usize,
    pub mean_recency: f64,
    pub mean_frequency: f64,
    pub mean_monetary: f64,
}

/// Per-segment customer count and metric means, in classifier table order.
/// Segments with no customers are omitted.
pub fn summarize(customers: &[ScoredCustomer]) -> Vec<SegmentSummary> {
    Segment::ALL
        .iter()
        .filter_map(|&segment| {
            let members: Vec<&ScoredCustomer> =
                customers.iter().filter(|c| c.segment == segment).collect();
            if members.is_empty() {
                return None;
            }

            let count = members.len() as f64;
            Some(SegmentSummary {
                segment,
                customers: members.len(),
                mean_recency: members.iter().map(|c| c.recency as f64).sum::<f64>() / count,
                mean_frequency: members.iter().map(|c| c.frequency as f64).sum::<f64>() / count,
                mean_monetary: members.iter().map(|c| c.monetary).sum::<f64>() / count,
            })
        })
        .collect()
}
