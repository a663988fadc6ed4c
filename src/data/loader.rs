//! Transaction Loader Module
//! Reads the retail CSV extract (Latin-1) and derives per-row columns.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Failed to read data source: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Required column missing from data source: {0}")]
    MissingColumn(&'static str),
}

/// Calendar-month grouping key derived from the invoice timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One row of the source extract with its derived columns.
///
/// Text fields are `None` when the source cell is empty. Quantity, price and
/// date are always present: rows where they fail to parse are dropped at
/// load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub invoice_no: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub customer_id: Option<String>,
    pub invoice_date: NaiveDateTime,
    pub country: Option<String>,
    /// Signed line total, `quantity * unit_price`; negative for refunds.
    pub total: f64,
    pub year_month: YearMonth,
}

/// Field-wise identity used for exact-duplicate detection. The float price
/// is compared by bit pattern so identity never depends on an epsilon.
pub type IdentityKey = (
    Option<String>,
    Option<String>,
    i64,
    u64,
    Option<String>,
    NaiveDateTime,
    Option<String>,
);

impl Transaction {
    pub fn is_refund(&self) -> bool {
        self.quantity < 0
    }

    pub fn has_missing(&self) -> bool {
        self.invoice_no.is_none()
            || self.description.is_none()
            || self.customer_id.is_none()
            || self.country.is_none()
    }

    pub fn identity_key(&self) -> IdentityKey {
        (
            self.invoice_no.clone(),
            self.description.clone(),
            self.quantity,
            self.unit_price.to_bits(),
            self.customer_id.clone(),
            self.invoice_date,
            self.country.clone(),
        )
    }
}

/// The full extract as read from the source, row order preserved.
/// Immutable after creation; owned by the store's cache entry.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub rows: Vec<Transaction>,
}

impl RawDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolved positions of the required columns in the header row.
struct ColumnIndex {
    invoice_no: usize,
    description: usize,
    quantity: usize,
    unit_price: usize,
    customer_id: usize,
    invoice_date: usize,
    country: usize,
}

/// Timestamp formats the extract is known to use, tried in order.
const DATE_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_ONLY_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Loads the retail extract into memory in full.
pub struct TransactionLoader;

impl TransactionLoader {
    /// Read the CSV at `path`, decode Latin-1, and derive `total` and
    /// `year_month` for every row. Rows with an unparseable quantity,
    /// price or date are dropped.
    pub fn load(path: &Path) -> Result<RawDataset, DataSourceError> {
        let bytes = std::fs::read(path)?;
        let text = Self::decode_latin1(&bytes);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let cols = Self::resolve_columns(&headers)?;

        let mut rows = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = record?;
            match Self::parse_row(&record, &cols) {
                Some(tx) => rows.push(tx),
                None => dropped += 1,
            }
        }

        log::info!("loaded {} transactions from {}", rows.len(), path.display());
        if dropped > 0 {
            log::warn!("dropped {} malformed rows during load", dropped);
        }

        Ok(RawDataset { rows })
    }

    /// ISO-8859-1 maps each byte directly to the same Unicode code point.
    fn decode_latin1(bytes: &[u8]) -> String {
        bytes.iter().map(|&b| char::from(b)).collect()
    }

    fn resolve_columns(headers: &StringRecord) -> Result<ColumnIndex, DataSourceError> {
        // Header names vary across extract versions ("Price" vs "UnitPrice",
        // "Customer ID" vs "CustomerID"); match case- and space-insensitively.
        let map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let key: String = name
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '_')
                    .collect::<String>()
                    .to_lowercase();
                (key, i)
            })
            .collect();

        let find = |names: &[&str], label: &'static str| {
            names
                .iter()
                .find_map(|n| map.get(*n).copied())
                .ok_or(DataSourceError::MissingColumn(label))
        };

        Ok(ColumnIndex {
            invoice_no: find(&["invoiceno", "invoice"], "InvoiceNo")?,
            description: find(&["description"], "Description")?,
            quantity: find(&["quantity"], "Quantity")?,
            unit_price: find(&["price", "unitprice"], "Price")?,
            customer_id: find(&["customerid"], "CustomerID")?,
            invoice_date: find(&["invoicedate"], "InvoiceDate")?,
            country: find(&["country"], "Country")?,
        })
    }

    fn parse_row(record: &StringRecord, cols: &ColumnIndex) -> Option<Transaction> {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let quantity: i64 = field(cols.quantity).trim().parse().ok()?;
        let unit_price: f64 = field(cols.unit_price).trim().parse().ok()?;
        let invoice_date = Self::parse_date(field(cols.invoice_date).trim())?;

        // Empty text cells become None; content is kept verbatim (the
        // cleaner owns whitespace normalization).
        let text = |idx: usize| {
            let s = field(idx);
            if s.trim().is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };

        Some(Transaction {
            invoice_no: text(cols.invoice_no),
            description: text(cols.description),
            quantity,
            unit_price,
            customer_id: text(cols.customer_id),
            invoice_date,
            country: text(cols.country),
            total: quantity as f64 * unit_price,
            year_month: YearMonth::from_datetime(invoice_date),
        })
    }

    fn parse_date(text: &str) -> Option<NaiveDateTime> {
        for fmt in DATE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(dt);
            }
        }
        for fmt in DATE_ONLY_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
                return d.and_hms_opt(0, 0, 0);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    const HEADER: &str = "Invoice,Description,Quantity,Price,Customer ID,InvoiceDate,Country\n";

    #[test]
    fn loads_rows_and_derives_columns() {
        let file = write_csv(
            format!(
                "{}536365,WHITE HANGING HEART,6,2.55,17850,12/1/2010 8:26,United Kingdom\n",
                HEADER
            )
            .as_bytes(),
        );

        let raw = TransactionLoader::load(file.path()).unwrap();
        assert_eq!(raw.len(), 1);
        let tx = &raw.rows[0];
        assert_eq!(tx.quantity, 6);
        assert!((tx.total - 15.3).abs() < 1e-9);
        assert_eq!(tx.year_month, YearMonth { year: 2010, month: 12 });
        assert_eq!(tx.country.as_deref(), Some("United Kingdom"));
    }

    #[test]
    fn decodes_latin1_descriptions() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"1,CAF\xC9 SET,1,3.00,100,2011-01-05 10:00:00,France\n");
        let file = write_csv(&bytes);

        let raw = TransactionLoader::load(file.path()).unwrap();
        assert_eq!(raw.rows[0].description.as_deref(), Some("CAF\u{c9} SET"));
    }

    #[test]
    fn empty_cells_become_none() {
        let file = write_csv(
            format!("{}536365,,6,2.55,,12/1/2010 8:26,United Kingdom\n", HEADER).as_bytes(),
        );

        let raw = TransactionLoader::load(file.path()).unwrap();
        let tx = &raw.rows[0];
        assert!(tx.description.is_none());
        assert!(tx.customer_id.is_none());
        assert!(tx.has_missing());
    }

    #[test]
    fn drops_malformed_rows() {
        let file = write_csv(
            format!(
                "{}1,A,not-a-number,2.55,100,12/1/2010 8:26,UK\n\
                 2,B,3,oops,100,12/1/2010 8:26,UK\n\
                 3,C,3,2.00,100,yesterday,UK\n\
                 4,D,3,2.00,100,12/1/2010 8:26,UK\n",
                HEADER
            )
            .as_bytes(),
        );

        let raw = TransactionLoader::load(file.path()).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.rows[0].invoice_no.as_deref(), Some("4"));
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let file = write_csv(b"Invoice,Description,Quantity,Customer ID,InvoiceDate,Country\n");
        let err = TransactionLoader::load(file.path()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn("Price")));
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let err = TransactionLoader::load(Path::new("no/such/file.csv")).unwrap_err();
        assert!(matches!(err, DataSourceError::Io(_)));
    }

    #[test]
    fn unit_price_header_variant_is_accepted() {
        let file = write_csv(
            b"InvoiceNo,Description,Quantity,UnitPrice,CustomerID,InvoiceDate,Country\n\
              1,A,2,1.50,100,2011-03-01 09:00:00,France\n",
        );
        let raw = TransactionLoader::load(file.path()).unwrap();
        assert_eq!(raw.len(), 1);
        assert!((raw.rows[0].total - 3.0).abs() < 1e-9);
    }
}
