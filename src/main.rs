//! RFMForge: Customer segmentation CLI using RFM quantile scoring
//!
//! This is the main entrypoint that orchestrates data loading, metric
//! aggregation, scoring, classification, and output.

use anyhow::Result;
use clap::Parser;
use rfmforge::{
    aggregate, clean, score, summarize, Args, CsvLineItemSource, CsvSegmentSink,
    CustomerSegmentSink, LineItemSource,
};
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    let config = args.to_config()?;

    if args.verbose {
        println!("RFMForge - Customer Segmentation using RFM Scores");
        println!("=================================================\n");
    }

    println!("=== RFM Segmentation Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load and clean line items
    if args.verbose {
        println!("Step 1: Loading and cleaning data");
        println!("  Input file: {}", args.input);
        println!("  Cancellation marker: {:?}", config.cancellation_marker);
    }

    let load_start = Instant::now();
    let mut source = CsvLineItemSource::new(&args.input);
    let records = source.records()?;
    let line_items = clean(&records, &config);
    let load_time = load_start.elapsed();

    println!(
        "✓ Data loaded: {} line items kept from {} raw rows",
        line_items.len(),
        records.len()
    );
    if args.verbose {
        println!("  Loading time: {:.2}s", load_time.as_secs_f64());
    }

    // Step 2: Aggregate RFM metrics per customer
    if args.verbose {
        println!("\nStep 2: Aggregating RFM metrics");
        println!("  Reference date: {}", config.reference_date);
    }

    let metrics = aggregate(&line_items, config.reference_date);
    println!("✓ Metrics computed: {} customers", metrics.len());

    // Step 3: Quantile scoring and segment classification
    if args.verbose {
        println!("\nStep 3: Scoring and classifying");
        println!("  Quantile bins per metric: {}", config.bins);
    }

    let score_start = Instant::now();
    let customers = score(&metrics, config.bins)?;
    let score_time = score_start.elapsed();

    println!("✓ Customers scored and classified");
    if args.verbose {
        println!("  Scoring time: {:.2}s", score_time.as_secs_f64());
    }

    // Step 4: Print segment statistics
    println!("\n=== Segment Statistics ===");
    let total = customers.len();
    for summary in summarize(&customers) {
        let percentage = (summary.customers as f64 / total as f64) * 100.0;
        println!(
            "{:<20} {:>5} customers ({:>4.1}%)  avg R={:.1} F={:.1} M={:.2}",
            summary.segment,
            summary.customers,
            percentage,
            summary.mean_recency,
            summary.mean_frequency,
            summary.mean_monetary
        );
    }

    // Step 5: Optionally write the segment table
    if args.emit_csv {
        let mut sink = CsvSegmentSink::new(&args.output);
        sink.emit(&customers)?;
        println!("\nSegment table saved to: {}", args.output);
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
