//! Quantile scoring of customer metrics
//!
//! Each metric is cut into equal-frequency bins computed fresh from the
//! current population. Bin boundaries come from sorted order: with `n`
//! customers and `k` bins, the first `n % k` bins take `ceil(n / k)` members
//! and the rest take `floor(n / k)`. Ties are broken by input position, which
//! for frequency reproduces the stable "rank by first appearance" behavior
//! that makes equal-frequency binning well defined over heavily duplicated
//! small integer counts.

use std::cmp::Ordering;

use crate::data::CustomerMetrics;
use crate::error::RfmError;
use crate::segment::{classify, Segment};

/// A customer's metrics together with quantile scores and segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCustomer {
    pub customer_id: i64,
    pub recency: i64,
    pub frequency: u64,
    pub monetary: f64,
    /// 1..=bins, higher is more recent.
    pub recency_score: u8,
    /// 1..=bins, higher is more frequent.
    pub frequency_score: u8,
    /// 1..=bins, higher is more spend. Kept on the record but not used for
    /// segment lookup.
    pub monetary_score: u8,
    /// Recency digit followed by frequency digit.
    pub rfm_code: String,
    pub segment: Segment,
}

/// Score every customer against the current population.
///
/// Recency is inverted (most recent customers score highest); frequency and
/// monetary score ascending. Fails with [`RfmError::InsufficientPopulation`]
/// when a metric has fewer distinct values than requested bins, and with
/// [`RfmError::InvalidBins`] for bin counts outside 2..=5 (the segment table
/// covers digits 1 through 5).
pub fn score(metrics: &[CustomerMetrics], bins: usize) -> crate::Result<Vec<ScoredCustomer>> {
    if !(2..=5).contains(&bins) {
        return Err(RfmError::InvalidBins(bins));
    }

    let recency_values: Vec<f64> = metrics.iter().map(|m| m.recency as f64).collect();
    let monetary_values: Vec<f64> = metrics.iter().map(|m| m.monetary).collect();
    let frequency_counts: Vec<u64> = metrics.iter().map(|m| m.frequency).collect();

    require_distinct("recency", &recency_values, bins)?;
    require_distinct("monetary", &monetary_values, bins)?;

    // Frequency is binned over its stable rank, so distinctness reduces to
    // population size.
    let frequency_ranks = stable_rank(&frequency_counts);
    require_distinct("frequency", &frequency_ranks, bins)?;

    let recency_bins = quantile_bins(&recency_values, bins);
    let frequency_bins = quantile_bins(&frequency_ranks, bins);
    let monetary_bins = quantile_bins(&monetary_values, bins);

    metrics
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let recency_score = (bins - recency_bins[i]) as u8;
            let frequency_score = (frequency_bins[i] + 1) as u8;
            let monetary_score = (monetary_bins[i] + 1) as u8;
            let rfm_code = format!("{recency_score}{frequency_score}");
            let segment = classify(recency_score, frequency_score)?;

            Ok(ScoredCustomer {
                customer_id: m.customer_id,
                recency: m.recency,
                frequency: m.frequency,
                monetary: m.monetary,
                recency_score,
                frequency_score,
                monetary_score,
                rfm_code,
                segment,
            })
        })
        .collect()
}

/// Assign each value to a bin index in 0..bins by sorted position.
///
/// Stable: equal values keep their input order. Returns one bin index per
/// input position.
fn quantile_bins(values: &[f64], bins: usize) -> Vec<usize> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let base = n / bins;
    let extra = n % bins;
    let mut assignment = vec![0usize; n];
    let mut cursor = 0;
    for bin in 0..bins {
        let size = base + usize::from(bin < extra);
        for &index in &order[cursor..cursor + size] {
            assignment[index] = bin;
        }
        cursor += size;
    }
    assignment
}

/// Dense unique rank (1..=n), ties resolved by first appearance.
fn stable_rank(values: &[u64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].cmp(&values[b]).then(a.cmp(&b)));

    let mut ranks = vec![0.0; n];
    for (rank, &index) in order.iter().enumerate() {
        ranks[index] = (rank + 1) as f64;
    }
    ranks
}

fn require_distinct(metric: &'static str, values: &[f64], bins: usize) -> crate::Result<()> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted.dedup();

    if sorted.len() < bins {
        return Err(RfmError::InsufficientPopulation {
            metric,
            distinct: sorted.len(),
            required: bins,
        });
    }
    Ok(())
}
