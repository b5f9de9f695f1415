//! Line-item loading, cleaning, and RFM metric aggregation

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::config::RfmConfig;

/// Timestamp layouts seen in retail data exports.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

/// One row of the raw transaction export, before cleaning.
///
/// Customer id, quantity, price, and timestamp are nullable at this stage;
/// rows missing any of them are dropped by [`clean`]. Stock code, description,
/// and country are carried through deserialization but unused downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "InvoiceNo")]
    pub invoice_no: String,
    #[serde(rename = "StockCode", default)]
    pub stock_code: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Quantity")]
    pub quantity: Option<i64>,
    #[serde(rename = "InvoiceDate")]
    pub invoice_date: Option<String>,
    #[serde(rename = "UnitPrice")]
    pub unit_price: Option<f64>,
    #[serde(rename = "CustomerID")]
    pub customer_id: Option<i64>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
}

/// A fully-populated, non-cancelled transaction line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub invoice_id: String,
    pub customer_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub timestamp: NaiveDateTime,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Recency, frequency, and monetary value for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerMetrics {
    pub customer_id: i64,
    /// Days between the reference date and the customer's last invoice.
    pub recency: i64,
    /// Number of distinct invoices.
    pub frequency: u64,
    /// Sum of line totals across the customer's line items.
    pub monetary: f64,
}

/// Produces the finite sequence of raw records for one run.
pub trait LineItemSource {
    fn records(&mut self) -> crate::Result<Vec<RawRecord>>;
}

/// Reads raw records from a CSV file with the Online Retail column layout.
pub struct CsvLineItemSource {
    path: PathBuf,
}

impl CsvLineItemSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl LineItemSource for CsvLineItemSource {
    fn records(&mut self) -> crate::Result<Vec<RawRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }
}

/// In-memory source for exercising the pipeline without a file.
pub struct MemoryLineItemSource {
    records: Vec<RawRecord>,
}

impl MemoryLineItemSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl LineItemSource for MemoryLineItemSource {
    fn records(&mut self) -> crate::Result<Vec<RawRecord>> {
        Ok(std::mem::take(&mut self.records))
    }
}

/// Drop records with missing required fields and cancelled invoices.
///
/// Keeps everything else, including negative quantities on regular invoices;
/// customers whose net spend ends up non-positive are removed later by
/// [`aggregate`]. Unparseable timestamps count as missing.
pub fn clean(records: &[RawRecord], config: &RfmConfig) -> Vec<LineItem> {
    records
        .iter()
        .filter_map(|record| {
            if record.invoice_no.contains(&config.cancellation_marker) {
                return None;
            }
            let customer_id = record.customer_id?;
            let quantity = record.quantity?;
            let unit_price = record.unit_price?;
            let timestamp = parse_timestamp(record.invoice_date.as_deref()?)?;

            Some(LineItem {
                invoice_id: record.invoice_no.clone(),
                customer_id,
                quantity,
                unit_price,
                timestamp,
            })
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
}

/// Group cleaned line items by customer and compute RFM metrics.
///
/// Customers are returned in order of first appearance in the input; the
/// scorer relies on this order to break frequency ties deterministically.
/// Customers with `monetary <= 0` are removed. A reference date earlier than
/// some customer's last purchase yields a negative recency and is the
/// caller's responsibility. Empty input yields an empty result.
pub fn aggregate(line_items: &[LineItem], reference_date: NaiveDateTime) -> Vec<CustomerMetrics> {
    struct Group {
        last_purchase: NaiveDateTime,
        invoices: HashSet<String>,
        monetary: f64,
    }

    let mut order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Group> = HashMap::new();

    for item in line_items {
        if !groups.contains_key(&item.customer_id) {
            order.push(item.customer_id);
        }
        let group = groups.entry(item.customer_id).or_insert_with(|| Group {
            last_purchase: item.timestamp,
            invoices: HashSet::new(),
            monetary: 0.0,
        });
        if item.timestamp > group.last_purchase {
            group.last_purchase = item.timestamp;
        }
        group.invoices.insert(item.invoice_id.clone());
        group.monetary += item.line_total();
    }

    order
        .into_iter()
        .filter_map(|customer_id| {
            let group = groups.remove(&customer_id)?;
            let metrics = CustomerMetrics {
                customer_id,
                recency: (reference_date - group.last_purchase).num_days(),
                frequency: group.invoices.len() as u64,
                monetary: group.monetary,
            };
            (metrics.monetary > 0.0).then_some(metrics)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw_record(
        invoice_no: &str,
        customer_id: Option<i64>,
        quantity: Option<i64>,
        unit_price: Option<f64>,
        invoice_date: Option<&str>,
    ) -> RawRecord {
        RawRecord {
            invoice_no: invoice_no.to_string(),
            stock_code: "85123A".to_string(),
            description: Some("WHITE HANGING HEART T-LIGHT HOLDER".to_string()),
            quantity,
            invoice_date: invoice_date.map(str::to_string),
            unit_price,
            customer_id,
            country: Some("United Kingdom".to_string()),
        }
    }

    fn line_item(
        invoice_id: &str,
        customer_id: i64,
        quantity: i64,
        unit_price: f64,
        date: &str,
    ) -> LineItem {
        LineItem {
            invoice_id: invoice_id.to_string(),
            customer_id,
            quantity,
            unit_price,
            timestamp: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn reference_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2011, 12, 11)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn config() -> RfmConfig {
        RfmConfig::for_reference_date(reference_date())
    }

    #[test]
    fn test_clean_drops_missing_fields() {
        let date = Some("2011-06-01T08:26:00");
        let records = vec![
            raw_record("536365", Some(17850), Some(6), Some(2.55), date),
            raw_record("536366", None, Some(6), Some(2.55), date),
            raw_record("536367", Some(17850), None, Some(2.55), date),
            raw_record("536368", Some(17850), Some(6), None, date),
            raw_record("536369", Some(17850), Some(6), Some(2.55), None),
            raw_record("536370", Some(17850), Some(6), Some(2.55), Some("not a date")),
        ];

        let cleaned = clean(&records, &config());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].invoice_id, "536365");
    }

    #[test]
    fn test_clean_drops_cancellations() {
        let date = Some("2011-06-01T08:26:00");
        let records = vec![
            raw_record("C1001", Some(17850), Some(6), Some(2.55), date),
            raw_record("536365", Some(17850), Some(6), Some(2.55), date),
        ];

        let cleaned = clean(&records, &config());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].invoice_id, "536365");
    }

    #[test]
    fn test_clean_respects_custom_marker() {
        let date = Some("2011-06-01T08:26:00");
        let records = vec![
            raw_record("X1001", Some(17850), Some(6), Some(2.55), date),
            raw_record("C1002", Some(17850), Some(6), Some(2.55), date),
        ];
        let config = RfmConfig::new(reference_date(), 5, "X".to_string()).unwrap();

        let cleaned = clean(&records, &config);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].invoice_id, "C1002");
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2011-06-01T08:26:00").is_some());
        assert!(parse_timestamp("2011-06-01 08:26:00").is_some());
        assert!(parse_timestamp("6/1/2011 8:26").is_some());
        assert!(parse_timestamp("June 1st").is_none());
    }

    #[test]
    fn test_aggregate_worked_example() {
        // Customer 1: invoices A and B, total 2*10 + 1*5 = 25, last purchase
        // 2011-06-01 -> recency 193. Customer 2: single invoice, 100, recency 344.
        let items = vec![
            line_item("A", 1, 2, 10.0, "2011-01-01"),
            line_item("B", 1, 1, 5.0, "2011-06-01"),
            line_item("C", 2, 1, 100.0, "2011-01-01"),
        ];

        let metrics = aggregate(&items, reference_date());
        assert_eq!(metrics.len(), 2);

        assert_eq!(metrics[0].customer_id, 1);
        assert_eq!(metrics[0].recency, 193);
        assert_eq!(metrics[0].frequency, 2);
        assert_eq!(metrics[0].monetary, 25.0);

        assert_eq!(metrics[1].customer_id, 2);
        assert_eq!(metrics[1].recency, 344);
        assert_eq!(metrics[1].frequency, 1);
        assert_eq!(metrics[1].monetary, 100.0);
    }

    #[test]
    fn test_aggregate_counts_distinct_invoices() {
        let items = vec![
            line_item("A", 1, 1, 2.0, "2011-06-01"),
            line_item("A", 1, 3, 4.0, "2011-06-01"),
            line_item("B", 1, 1, 1.0, "2011-07-01"),
        ];

        let metrics = aggregate(&items, reference_date());
        assert_eq!(metrics[0].frequency, 2);
        assert_eq!(metrics[0].monetary, 15.0);
    }

    #[test]
    fn test_aggregate_drops_non_positive_monetary() {
        let items = vec![
            line_item("A", 1, -2, 10.0, "2011-06-01"),
            line_item("B", 1, 1, 5.0, "2011-07-01"),
            line_item("C", 2, 1, 100.0, "2011-06-01"),
        ];

        let metrics = aggregate(&items, reference_date());
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].customer_id, 2);
    }

    #[test]
    fn test_aggregate_empty_input() {
        let metrics = aggregate(&[], reference_date());
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_aggregate_preserves_first_appearance_order() {
        let items = vec![
            line_item("A", 3, 1, 1.0, "2011-06-01"),
            line_item("B", 1, 1, 1.0, "2011-06-01"),
            line_item("C", 2, 1, 1.0, "2011-06-01"),
            line_item("D", 3, 1, 1.0, "2011-07-01"),
        ];

        let metrics = aggregate(&items, reference_date());
        let ids: Vec<i64> = metrics.iter().map(|m| m.customer_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_csv_source_reads_records() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country"
        )
        .unwrap();
        writeln!(
            file,
            "536365,85123A,WHITE METAL LANTERN,6,2010-12-01T08:26:00,3.39,17850,United Kingdom"
        )
        .unwrap();
        writeln!(file, "536366,22633,HAND WARMER,6,2010-12-01T08:28:00,1.85,,United Kingdom")
            .unwrap();

        let mut source = CsvLineItemSource::new(file.path());
        let records = source.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].customer_id, Some(17850));
        assert_eq!(records[1].customer_id, None);
    }
}
