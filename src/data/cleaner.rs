//! Dataset Cleaner Module
//! Filters the raw dataset and derives the per-product pricing flag.

use crate::data::loader::{RawDataset, Transaction, YearMonth};
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

/// A product is volatile when it has strictly more than this many distinct
/// unit prices in the cleaned set.
pub const VOLATILE_PRICE_THRESHOLD: usize = 3;

/// A transaction that survived cleaning: every field present, description
/// normalized, pricing flag attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTransaction {
    pub invoice_no: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub customer_id: String,
    pub invoice_date: NaiveDateTime,
    pub country: String,
    pub total: f64,
    pub year_month: YearMonth,
    /// True when this product shows more than `VOLATILE_PRICE_THRESHOLD`
    /// distinct unit prices across the cleaned set.
    pub volatile_pricing: bool,
}

/// The filtered copy of the raw dataset. Recomputed once per raw dataset
/// and memoized by the store.
#[derive(Debug, Clone, Default)]
pub struct CleanedDataset {
    pub rows: Vec<CleanedTransaction>,
}

impl CleanedDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Turns the raw dataset into the cleaned dataset. Pure; the step order is
/// significant because the pricing flag must reflect only the rows that
/// survive filtering.
pub struct DatasetCleaner;

impl DatasetCleaner {
    pub fn clean(raw: &RawDataset) -> CleanedDataset {
        // 1. Drop refunds and zero-quantity noise.
        // 2. Drop exact duplicates, keeping the first occurrence.
        // 3. Drop rows with any missing field.
        let mut seen = HashSet::new();
        let kept: Vec<&Transaction> = raw
            .rows
            .iter()
            .filter(|tx| tx.quantity > 0)
            .filter(|tx| seen.insert(tx.identity_key()))
            .filter(|tx| !tx.has_missing())
            .collect();

        // 4. Distinct unit prices per product over the surviving rows,
        //    keyed on the description exactly as stored.
        let mut prices: HashMap<&str, HashSet<u64>> = HashMap::new();
        for tx in &kept {
            let desc = tx.description.as_deref().unwrap_or_default();
            prices.entry(desc).or_default().insert(tx.unit_price.to_bits());
        }

        // 5. Normalize descriptions last.
        let rows = kept
            .into_iter()
            .map(|tx| {
                let desc = tx.description.as_deref().unwrap_or_default();
                let volatile_pricing =
                    prices.get(desc).map_or(0, HashSet::len) > VOLATILE_PRICE_THRESHOLD;
                CleanedTransaction {
                    invoice_no: tx.invoice_no.clone().unwrap_or_default(),
                    description: title_case(desc.trim()),
                    quantity: tx.quantity,
                    unit_price: tx.unit_price,
                    customer_id: tx.customer_id.clone().unwrap_or_default(),
                    invoice_date: tx.invoice_date,
                    country: tx.country.clone().unwrap_or_default(),
                    total: tx.total,
                    year_month: tx.year_month,
                    volatile_pricing,
                }
            })
            .collect::<Vec<_>>();

        log::info!("cleaned dataset: {} of {} rows kept", rows.len(), raw.len());
        CleanedDataset { rows }
    }
}

/// Title-case: the first letter of every word upper-cased, the rest
/// lower-cased; any non-alphabetic character ends a word.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::tx;
    use crate::data::RawDataset;

    #[test]
    fn removes_refunds_and_zero_quantities() {
        let raw = RawDataset {
            rows: vec![
                tx("1", "MUG", 2, 2.5),
                tx("2", "MUG", -2, 2.5),
                tx("3", "MUG", 0, 2.5),
            ],
        };
        let cleaned = DatasetCleaner::clean(&raw);
        assert_eq!(cleaned.len(), 1);
        assert!(cleaned.rows.iter().all(|r| r.quantity > 0));
    }

    #[test]
    fn removes_exact_duplicates_keeping_first() {
        let raw = RawDataset {
            rows: vec![
                tx("1", "MUG", 2, 2.5),
                tx("1", "MUG", 2, 2.5),
                tx("2", "MUG", 2, 2.5),
            ],
        };
        let cleaned = DatasetCleaner::clean(&raw);
        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn removes_rows_with_missing_fields() {
        let mut incomplete = tx("1", "MUG", 2, 2.5);
        incomplete.customer_id = None;
        let raw = RawDataset {
            rows: vec![incomplete, tx("2", "MUG", 2, 2.5)],
        };
        let cleaned = DatasetCleaner::clean(&raw);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.rows[0].invoice_no, "2");
    }

    #[test]
    fn volatility_reflects_only_surviving_rows() {
        // Four distinct prices, but one arrives on a refund row that the
        // filter removes; only three remain, so the product is not volatile.
        let raw = RawDataset {
            rows: vec![
                tx("1", "LAMP", 1, 1.0),
                tx("2", "LAMP", 1, 2.0),
                tx("3", "LAMP", 1, 3.0),
                tx("4", "LAMP", -1, 4.0),
            ],
        };
        let cleaned = DatasetCleaner::clean(&raw);
        assert!(cleaned.rows.iter().all(|r| !r.volatile_pricing));
    }

    #[test]
    fn flags_products_with_more_than_three_distinct_prices() {
        let raw = RawDataset {
            rows: vec![
                tx("1", "LAMP", 1, 1.0),
                tx("2", "LAMP", 2, 1.0),
                tx("3", "LAMP", 1, 2.0),
                tx("4", "LAMP", 1, 3.0),
                tx("5", "LAMP", 1, 4.0),
                tx("6", "MUG", 1, 1.0),
            ],
        };
        let cleaned = DatasetCleaner::clean(&raw);
        for row in &cleaned.rows {
            assert_eq!(row.volatile_pricing, row.description == "Lamp");
        }
    }

    #[test]
    fn normalizes_descriptions() {
        let raw = RawDataset {
            rows: vec![tx("1", "  WHITE hanging HEART t-light  ", 1, 2.5)],
        };
        let cleaned = DatasetCleaner::clean(&raw);
        assert_eq!(cleaned.rows[0].description, "White Hanging Heart T-Light");
    }

    #[test]
    fn clean_is_idempotent() {
        let mut incomplete = tx("9", "MUG", 3, 2.5);
        incomplete.country = None;
        let raw = RawDataset {
            rows: vec![
                tx("1", "lamp", 1, 1.0),
                tx("1", "lamp", 1, 1.0),
                tx("2", "MUG", -4, 2.5),
                incomplete,
                tx("3", "MUG", 3, 2.5),
            ],
        };
        let first = DatasetCleaner::clean(&raw);

        // Feed the cleaned rows back through as if they were raw; the filter
        // pass must remove nothing further.
        let as_raw = RawDataset {
            rows: first
                .rows
                .iter()
                .map(|r| {
                    let mut t = tx(&r.invoice_no, &r.description, r.quantity, r.unit_price);
                    t.customer_id = Some(r.customer_id.clone());
                    t.invoice_date = r.invoice_date;
                    t.country = Some(r.country.clone());
                    t.year_month = r.year_month;
                    t
                })
                .collect(),
        };
        let second = DatasetCleaner::clean(&as_raw);

        assert_eq!(first.len(), second.len());
        assert_eq!(
            first.rows.iter().map(|r| &r.description).collect::<Vec<_>>(),
            second.rows.iter().map(|r| &r.description).collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_result_is_valid() {
        let raw = RawDataset {
            rows: vec![tx("1", "MUG", -1, 2.5)],
        };
        let cleaned = DatasetCleaner::clean(&raw);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn title_case_matches_reference_behavior() {
        assert_eq!(title_case("RED RETROSPOT BAG"), "Red Retrospot Bag");
        assert_eq!(title_case("t-light holder"), "T-Light Holder");
        assert_eq!(title_case("set of 6"), "Set Of 6");
        assert_eq!(title_case(""), "");
    }
}
