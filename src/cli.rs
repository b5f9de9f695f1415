//! Command-line interface definitions and argument parsing

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;

use crate::config::RfmConfig;
use crate::error::RfmError;

/// Customer segmentation CLI using RFM quantile scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input transactions CSV file
    #[arg(short, long, default_value = "data.csv")]
    pub input: String,

    /// Output path for the segment table CSV
    #[arg(short, long, default_value = "rfm.csv")]
    pub output: String,

    /// Reference date for recency calculation, as YYYY-MM-DD or
    /// YYYY-MM-DDTHH:MM:SS. Must be at or after the newest invoice date.
    #[arg(short, long, default_value = "2011-12-11")]
    pub reference_date: String,

    /// Number of quantile bins per metric (2-5)
    #[arg(short, long, default_value = "5")]
    pub bins: usize,

    /// Invoice ids containing this marker are treated as cancellations
    #[arg(long, default_value = "C")]
    pub cancellation_marker: String,

    /// Write the segment table to the output path
    #[arg(long)]
    pub emit_csv: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the pipeline configuration from the raw arguments.
    pub fn to_config(&self) -> crate::Result<RfmConfig> {
        let reference_date = parse_reference_date(&self.reference_date)?;
        RfmConfig::new(reference_date, self.bins, self.cancellation_marker.clone())
    }
}

fn parse_reference_date(raw: &str) -> crate::Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(RfmError::InvalidReferenceDate(raw.to_string()))
}
