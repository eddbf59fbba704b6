//! RFVForge: customer segmentation by Recency, Frequency and Value
//!
//! Transactions are reduced to per-customer RFV metrics, each metric is
//! bucketed into quartile classes `A`..`D`, and the three class letters form
//! a segment score that maps to a suggested marketing action.

pub mod aggregate;
pub mod cli;
pub mod data;
pub mod error;
pub mod export;
pub mod model;
pub mod quantile;
pub mod report;

// Re-export public items for easier access
pub use aggregate::{aggregate_metrics, CustomerMetrics, RfvData};
pub use cli::Args;
pub use data::{
    load_transactions, transactions_from_frame, validate_columns, CustomerId, RawTransaction, Transaction,
};
pub use error::{InputError, SegmentError, SegmentResult};
pub use export::{
    to_csv_bytes, to_dataframe, to_xlsx_bytes, write_csv, write_export, write_xlsx, ExportFormat,
};
pub use model::{classify_customers, segment, suggested_action, ClassifiedCustomer, Score, Segmentation};
pub use quantile::{linear_quantile, Metric, Polarity, QuartileBoundaries, QuartileClass, RfvBoundaries};
