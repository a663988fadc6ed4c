//! View Aggregator Module
//! The read-only queries behind the dashboard sections. All of them are pure
//! functions over the loaded dataset; product-level accumulators live only
//! for the duration of one call.

use crate::data::{CleanedDataset, RawDataset, YearMonth, VOLATILE_PRICE_THRESHOLD};
use crate::stats::format;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Number of entries shown in every ranked view.
pub const TOP_N: usize = 10;

/// The refund-rate ratio is undefined on a zero-row dataset; this is
/// surfaced rather than coerced to 0 or NaN.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("refund rate is undefined on an empty dataset")]
pub struct EmptyDatasetError;

/// Key figures for the summary section.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub total_records: usize,
    pub unique_customers: usize,
    /// Sum of line totals over refund rows; expected negative.
    pub refund_volume: f64,
    /// Refund rows as a share of all rows, in percent, rounded to 2 decimals.
    pub refund_rate_pct: f64,
    pub volatile_products: usize,
}

impl MetricsSummary {
    /// Table rows in display order, formatted for the given currency symbol.
    pub fn rows(&self, currency_symbol: &str) -> Vec<(String, String)> {
        vec![
            (
                "Total Records".to_string(),
                format::count(self.total_records),
            ),
            (
                "Unique Customers".to_string(),
                format::count(self.unique_customers),
            ),
            (
                format!("Refund Volume ({})", currency_symbol),
                format::currency(self.refund_volume, currency_symbol),
            ),
            (
                "Refund Rate (%)".to_string(),
                format::percent(self.refund_rate_pct),
            ),
            (
                "Volatile Price Products".to_string(),
                format::count(self.volatile_products),
            ),
        ]
    }
}

/// What the cleaning pass removed, counted over the raw dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningSummary {
    pub original_rows: usize,
    pub refund_rows: usize,
    /// Rows that duplicate an earlier raw row, field for field.
    pub duplicate_rows: usize,
    pub missing_rows: usize,
    pub cleaned_rows: usize,
}

impl CleaningSummary {
    pub fn rows(&self) -> Vec<(String, String)> {
        vec![
            ("Original Rows".to_string(), format::count(self.original_rows)),
            ("Refund Rows Removed".to_string(), format::count(self.refund_rows)),
            ("Duplicate Rows Removed".to_string(), format::count(self.duplicate_rows)),
            ("Rows With Missing Values".to_string(), format::count(self.missing_rows)),
            ("Rows After Cleaning".to_string(), format::count(self.cleaned_rows)),
        ]
    }
}

/// The dashboard's query functions. Each one builds its accumulators on the
/// fly and returns an ordered result ready for a table or bar chart.
pub struct Aggregator;

impl Aggregator {
    /// Key metrics over the raw dataset.
    pub fn summary_metrics(raw: &RawDataset) -> Result<MetricsSummary, EmptyDatasetError> {
        if raw.is_empty() {
            return Err(EmptyDatasetError);
        }

        let refund_rows = raw.rows.iter().filter(|tx| tx.is_refund()).count();
        let refund_volume = raw
            .rows
            .iter()
            .filter(|tx| tx.is_refund())
            .map(|tx| tx.total)
            .sum();

        let unique_customers = raw
            .rows
            .iter()
            .filter_map(|tx| tx.customer_id.as_deref())
            .collect::<HashSet<_>>()
            .len();

        let volatile_products = Self::distinct_price_counts(raw)
            .into_iter()
            .filter(|(_, (count, _))| *count > VOLATILE_PRICE_THRESHOLD)
            .count();

        Ok(MetricsSummary {
            total_records: raw.len(),
            unique_customers,
            refund_volume,
            refund_rate_pct: round2(refund_rows as f64 / raw.len() as f64 * 100.0),
            volatile_products,
        })
    }

    /// Row counts the cleaning pass reports alongside the key metrics.
    pub fn cleaning_summary(raw: &RawDataset, cleaned: &CleanedDataset) -> CleaningSummary {
        let mut seen = HashSet::new();
        let duplicate_rows = raw
            .rows
            .iter()
            .filter(|tx| !seen.insert(tx.identity_key()))
            .count();

        CleaningSummary {
            original_rows: raw.len(),
            refund_rows: raw.rows.iter().filter(|tx| tx.is_refund()).count(),
            duplicate_rows,
            missing_rows: raw.rows.iter().filter(|tx| tx.has_missing()).count(),
            cleaned_rows: cleaned.len(),
        }
    }

    /// Products ranked by number of refund rows, top 10. Ties keep the
    /// order the products were first seen in.
    pub fn refund_prone_products(raw: &RawDataset) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (idx, tx) in raw.rows.iter().enumerate() {
            if !tx.is_refund() {
                continue;
            }
            let Some(desc) = tx.description.as_deref() else {
                continue;
            };
            let entry = counts.entry(desc).or_insert((0, idx));
            entry.0 += 1;
        }

        let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        ranked
            .into_iter()
            .take(TOP_N)
            .map(|(desc, (count, _))| (desc.to_string(), count))
            .collect()
    }

    /// Products ranked by summed line totals, top 10. Refund rows are part
    /// of the sum on purpose; the reported numbers match the reference.
    pub fn top_products_by_revenue(raw: &RawDataset) -> Vec<(String, f64)> {
        let mut revenue: HashMap<&str, (f64, usize)> = HashMap::new();
        for (idx, tx) in raw.rows.iter().enumerate() {
            let Some(desc) = tx.description.as_deref() else {
                continue;
            };
            let entry = revenue.entry(desc).or_insert((0.0, idx));
            entry.0 += tx.total;
        }

        let mut ranked: Vec<(&str, (f64, usize))> = revenue.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.total_cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        ranked
            .into_iter()
            .take(TOP_N)
            .map(|(desc, (total, _))| (desc.to_string(), total))
            .collect()
    }

    /// Products with more than `VOLATILE_PRICE_THRESHOLD` distinct unit
    /// prices, ranked by that count, top 10.
    pub fn price_volatility_ranking(raw: &RawDataset) -> Vec<(String, usize)> {
        let mut ranked: Vec<(&str, (usize, usize))> = Self::distinct_price_counts(raw)
            .into_iter()
            .filter(|(_, (count, _))| *count > VOLATILE_PRICE_THRESHOLD)
            .collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        ranked
            .into_iter()
            .take(TOP_N)
            .map(|(desc, (count, _))| (desc.to_string(), count))
            .collect()
    }

    /// Revenue summed per calendar month, chronologically ordered. Months
    /// with no records are absent, not zero-filled.
    pub fn monthly_revenue_trend(raw: &RawDataset) -> Vec<(YearMonth, f64)> {
        let mut by_month: BTreeMap<YearMonth, f64> = BTreeMap::new();
        for tx in &raw.rows {
            *by_month.entry(tx.year_month).or_insert(0.0) += tx.total;
        }
        by_month.into_iter().collect()
    }

    /// Distinct unit prices per product with the product's first encounter
    /// index, over the raw dataset.
    fn distinct_price_counts(raw: &RawDataset) -> HashMap<&str, (usize, usize)> {
        let mut prices: HashMap<&str, (HashSet<u64>, usize)> = HashMap::new();
        for (idx, tx) in raw.rows.iter().enumerate() {
            let Some(desc) = tx.description.as_deref() else {
                continue;
            };
            prices
                .entry(desc)
                .or_insert_with(|| (HashSet::new(), idx))
                .0
                .insert(tx.unit_price.to_bits());
        }
        prices
            .into_iter()
            .map(|(desc, (set, idx))| (desc, (set.len(), idx)))
            .collect()
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{tx, tx_in_month};
    use crate::data::DatasetCleaner;

    #[test]
    fn refund_rate_for_three_in_ten() {
        let mut rows = Vec::new();
        for i in 0..7 {
            rows.push(tx(&format!("s{}", i), "MUG", 1, 2.0));
        }
        for i in 0..3 {
            rows.push(tx(&format!("r{}", i), "MUG", -1, 2.0));
        }
        let raw = RawDataset { rows };

        let summary = Aggregator::summary_metrics(&raw).unwrap();
        assert_eq!(summary.total_records, 10);
        assert_eq!(summary.refund_rate_pct, 30.00);
        assert!((summary.refund_volume - (-6.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_dataset_fails_instead_of_dividing_by_zero() {
        let raw = RawDataset::default();
        assert_eq!(
            Aggregator::summary_metrics(&raw).unwrap_err(),
            EmptyDatasetError
        );
    }

    #[test]
    fn unique_customers_excludes_nulls() {
        let mut anonymous = tx("1", "MUG", 1, 2.0);
        anonymous.customer_id = None;
        let mut second = tx("2", "MUG", 1, 2.0);
        second.customer_id = Some("20000".to_string());
        let raw = RawDataset {
            rows: vec![anonymous, second, tx("3", "MUG", 1, 2.0)],
        };

        let summary = Aggregator::summary_metrics(&raw).unwrap();
        assert_eq!(summary.unique_customers, 2);
    }

    #[test]
    fn cleaning_summary_counts_each_category() {
        let mut incomplete = tx("4", "MUG", 2, 2.0);
        incomplete.description = None;
        let raw = RawDataset {
            rows: vec![
                tx("1", "MUG", 2, 2.0),
                tx("1", "MUG", 2, 2.0),
                tx("2", "MUG", -1, 2.0),
                incomplete,
                tx("5", "LAMP", 1, 4.0),
            ],
        };
        let cleaned = DatasetCleaner::clean(&raw);

        let summary = Aggregator::cleaning_summary(&raw, &cleaned);
        assert_eq!(summary.original_rows, 5);
        assert_eq!(summary.refund_rows, 1);
        assert_eq!(summary.duplicate_rows, 1);
        assert_eq!(summary.missing_rows, 1);
        assert_eq!(summary.cleaned_rows, 2);
    }

    #[test]
    fn refund_ranking_counts_and_orders() {
        let raw = RawDataset {
            rows: vec![
                tx("1", "MUG", -1, 2.0),
                tx("2", "LAMP", -1, 4.0),
                tx("3", "MUG", -2, 2.0),
                tx("4", "MUG", 5, 2.0),
                tx("5", "BAG", -1, 1.0),
            ],
        };

        let ranked = Aggregator::refund_prone_products(&raw);
        assert_eq!(ranked[0], ("MUG".to_string(), 2));
        // LAMP and BAG tie at one refund each; LAMP was seen first.
        assert_eq!(ranked[1].0, "LAMP");
        assert_eq!(ranked[2].0, "BAG");
    }

    #[test]
    fn top_two_by_revenue() {
        let raw = RawDataset {
            rows: vec![
                tx("1", "A", 1, 500.0),
                tx("2", "B", 1, 700.0),
                tx("3", "C", 1, 200.0),
            ],
        };

        let ranked = Aggregator::top_products_by_revenue(&raw);
        let top_two: Vec<&str> = ranked.iter().take(2).map(|(d, _)| d.as_str()).collect();
        assert_eq!(top_two, ["B", "A"]);
    }

    #[test]
    fn revenue_ranking_includes_refund_rows() {
        let raw = RawDataset {
            rows: vec![
                tx("1", "A", 10, 10.0),
                tx("2", "A", -4, 10.0),
                tx("3", "B", 7, 10.0),
            ],
        };

        let ranked = Aggregator::top_products_by_revenue(&raw);
        // A nets 60 after the refund row, below B's 70.
        assert_eq!(ranked[0].0, "B");
        assert!((ranked[1].1 - 60.0).abs() < 1e-9);
    }

    #[test]
    fn volatility_ranking_threshold() {
        let mut rows = Vec::new();
        for (i, price) in [1.0, 1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            rows.push(tx(&format!("a{}", i), "LAMP", 1, *price));
        }
        for (i, price) in [1.0, 1.0, 1.0].iter().enumerate() {
            rows.push(tx(&format!("b{}", i), "MUG", 1, *price));
        }
        let raw = RawDataset { rows };

        let ranked = Aggregator::price_volatility_ranking(&raw);
        assert_eq!(ranked, vec![("LAMP".to_string(), 4)]);
    }

    #[test]
    fn ranked_views_cap_at_top_n() {
        let mut rows = Vec::new();
        for i in 0..15 {
            rows.push(tx(&format!("{}", i), &format!("P{}", i), 1, i as f64 + 1.0));
        }
        let raw = RawDataset { rows };

        assert_eq!(Aggregator::top_products_by_revenue(&raw).len(), TOP_N);
    }

    #[test]
    fn monthly_trend_is_chronological_without_gap_filling() {
        let raw = RawDataset {
            rows: vec![
                tx_in_month("1", "MUG", 1, 50.0, 2011, 2),
                tx_in_month("2", "MUG", 1, 100.0, 2011, 1),
            ],
        };

        let trend = Aggregator::monthly_revenue_trend(&raw);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].0, YearMonth { year: 2011, month: 1 });
        assert!((trend[0].1 - 100.0).abs() < 1e-9);
        assert_eq!(trend[1].0, YearMonth { year: 2011, month: 2 });
        assert!((trend[1].1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn aggregations_over_empty_input_return_empty_results() {
        let raw = RawDataset::default();
        assert!(Aggregator::refund_prone_products(&raw).is_empty());
        assert!(Aggregator::top_products_by_revenue(&raw).is_empty());
        assert!(Aggregator::price_volatility_ranking(&raw).is_empty());
        assert!(Aggregator::monthly_revenue_trend(&raw).is_empty());
    }

    #[test]
    fn rows_without_description_are_skipped_in_rankings() {
        let mut unnamed = tx("1", "MUG", -1, 2.0);
        unnamed.description = None;
        let raw = RawDataset {
            rows: vec![unnamed, tx("2", "LAMP", -1, 4.0)],
        };

        let ranked = Aggregator::refund_prone_products(&raw);
        assert_eq!(ranked, vec![("LAMP".to_string(), 1)]);
    }
}
