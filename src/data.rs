//! Transaction records and CSV loading using Polars

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rust_decimal::Decimal;

use crate::error::{InputError, SegmentResult};

pub const CUSTOMER_ID_COLUMN: &str = "ID_cliente";
pub const PURCHASE_DATE_COLUMN: &str = "DiaCompra";
pub const PURCHASE_CODE_COLUMN: &str = "CodigoCompra";
pub const TOTAL_VALUE_COLUMN: &str = "ValorTotal";

/// Columns a transaction file must provide
pub const REQUIRED_COLUMNS: [&str; 4] = [
    CUSTOMER_ID_COLUMN,
    PURCHASE_DATE_COLUMN,
    PURCHASE_CODE_COLUMN,
    TOTAL_VALUE_COLUMN,
];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Customer identifier as it appears in the source data.
///
/// Numeric identifiers order numerically and come before any non-numeric
/// identifier, which order as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for CustomerId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CustomerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One purchase row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub customer_id: CustomerId,
    pub purchase_date: NaiveDateTime,
    /// Not deduplicated; repeated codes count as separate purchases
    pub purchase_code: String,
    pub total_value: Decimal,
}

/// An untyped row as handed over by a loader, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTransaction {
    /// 1-based data row number, used in error messages
    pub row: usize,
    pub customer_id: Option<String>,
    pub purchase_date: Option<String>,
    pub purchase_code: Option<String>,
    pub total_value: Option<String>,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = InputError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let row = raw.row;
        let customer_id = required(row, CUSTOMER_ID_COLUMN, raw.customer_id)?;
        let purchase_date = required(row, PURCHASE_DATE_COLUMN, raw.purchase_date)?;
        let purchase_code = required(row, PURCHASE_CODE_COLUMN, raw.purchase_code)?;
        let total_value = required(row, TOTAL_VALUE_COLUMN, raw.total_value)?;

        let purchase_date =
            parse_purchase_date(&purchase_date).ok_or_else(|| InputError::InvalidField {
                row,
                field: PURCHASE_DATE_COLUMN,
                value: purchase_date.clone(),
            })?;
        let total_value =
            parse_total_value(&total_value).ok_or_else(|| InputError::InvalidField {
                row,
                field: TOTAL_VALUE_COLUMN,
                value: total_value.clone(),
            })?;

        Ok(Transaction {
            customer_id: CustomerId::new(customer_id),
            purchase_date,
            purchase_code,
            total_value,
        })
    }
}

/// Trim a field and reject it when absent or blank
fn required(row: usize, field: &'static str, value: Option<String>) -> Result<String, InputError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(InputError::MissingField { row, field }),
    }
}

/// Parse a purchase date without any timezone conversion.
///
/// Offsets in RFC 3339 input are dropped and the wall-clock time is kept.
/// Date-only values resolve to midnight.
pub fn parse_purchase_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.naive_local())
}

/// Parse an amount as an exact decimal, accepting scientific notation
pub fn parse_total_value(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Load transactions from a CSV file
///
/// # Arguments
/// * `file_path` - Path to a CSV file with `ID_cliente`, `DiaCompra`,
///   `CodigoCompra` and `ValorTotal` columns
///
/// # Returns
/// * Parsed transactions in file order
pub fn load_transactions<P: AsRef<Path>>(file_path: P) -> SegmentResult<Vec<Transaction>> {
    let file_path = file_path.as_ref();

    // Schema inference disabled: every column is read as text so amounts keep
    // their exact decimal representation.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()?;

    log::debug!(
        "read {} rows from {}",
        df.height(),
        file_path.display()
    );

    transactions_from_frame(&df)
}

/// Check that every required column is present, first missing one reported
pub fn validate_columns(df: &DataFrame) -> Result<(), InputError> {
    let present = df.get_column_names();
    for column in REQUIRED_COLUMNS {
        if !present.iter().any(|name| name.as_str() == column) {
            return Err(InputError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Convert an already-read frame into validated transactions
pub fn transactions_from_frame(df: &DataFrame) -> SegmentResult<Vec<Transaction>> {
    validate_columns(df)?;

    let customer_ids = extract_text_column(df, CUSTOMER_ID_COLUMN)?;
    let purchase_dates = extract_text_column(df, PURCHASE_DATE_COLUMN)?;
    let purchase_codes = extract_text_column(df, PURCHASE_CODE_COLUMN)?;
    let total_values = extract_text_column(df, TOTAL_VALUE_COLUMN)?;

    let rows = customer_ids
        .into_iter()
        .zip(purchase_dates)
        .zip(purchase_codes)
        .zip(total_values)
        .enumerate();

    let mut transactions = Vec::with_capacity(df.height());
    for (i, (((customer_id, purchase_date), purchase_code), total_value)) in rows {
        let raw = RawTransaction {
            row: i + 1,
            customer_id,
            purchase_date,
            purchase_code,
            total_value,
        };
        transactions.push(Transaction::try_from(raw)?);
    }

    Ok(transactions)
}

/// Extract a column as optional text values
fn extract_text_column(df: &DataFrame, column_name: &str) -> SegmentResult<Vec<Option<String>>> {
    let column = df
        .column(column_name)
        .map_err(|_| InputError::MissingColumn {
            column: column_name.to_string(),
        })?
        .cast(&DataType::String)?;

    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_owned))
        .collect())
}
