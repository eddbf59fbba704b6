//! Error types for the segmentation pipeline

use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

/// Problems with the transaction data itself.
///
/// These are surfaced as soon as they are detected; nothing is coerced into a
/// default value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("transaction dataset is empty")]
    EmptyDataset,

    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: cannot parse {field} from '{value}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("customer {customer}: total value exceeds the decimal range")]
    ValueOverflow { customer: String },

    #[error("{metric} quartiles exceed the decimal range")]
    QuantileOverflow { metric: &'static str },
}

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SegmentError {
    /// True when the caller should ask for corrected input rather than retry.
    pub fn is_input_error(&self) -> bool {
        matches!(self, SegmentError::Input(_))
    }
}

pub type SegmentResult<T> = Result<T, SegmentError>;
