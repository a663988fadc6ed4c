//! Data module - loading, cleaning, and the memoized dataset store

mod cleaner;
mod loader;
mod store;

pub use cleaner::{CleanedDataset, CleanedTransaction, DatasetCleaner, VOLATILE_PRICE_THRESHOLD};
pub use loader::{DataSourceError, RawDataset, Transaction, TransactionLoader, YearMonth};
pub use store::DatasetStore;

#[cfg(test)]
pub(crate) mod testutil {
    use super::{Transaction, YearMonth};
    use chrono::NaiveDate;

    /// A complete, well-formed transaction for tests. Vary `invoice_no` when
    /// rows of the same product and price must not count as duplicates.
    pub(crate) fn tx(invoice_no: &str, description: &str, quantity: i64, unit_price: f64) -> Transaction {
        tx_in_month(invoice_no, description, quantity, unit_price, 2011, 1)
    }

    pub(crate) fn tx_in_month(
        invoice_no: &str,
        description: &str,
        quantity: i64,
        unit_price: f64,
        year: i32,
        month: u32,
    ) -> Transaction {
        let invoice_date = NaiveDate::from_ymd_opt(year, month, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Transaction {
            invoice_no: Some(invoice_no.to_string()),
            description: Some(description.to_string()),
            quantity,
            unit_price,
            customer_id: Some("17850".to_string()),
            invoice_date,
            country: Some("United Kingdom".to_string()),
            total: quantity as f64 * unit_price,
            year_month: YearMonth { year, month },
        }
    }
}
