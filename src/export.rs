//! Serialization of the classified table, CSV through Polars and xlsx
//! through rust_xlsxwriter

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use polars::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::Workbook;

use crate::data::CUSTOMER_ID_COLUMN;
use crate::error::SegmentResult;
use crate::model::Segmentation;
use crate::quantile::Metric;

pub const R_CLASS_COLUMN: &str = "R_quartil";
pub const F_CLASS_COLUMN: &str = "F_quartil";
pub const V_CLASS_COLUMN: &str = "V_quartil";
pub const SCORE_COLUMN: &str = "RFV_Score";
pub const ACTION_COLUMN: &str = "Acoes";

/// Output columns in export order
pub const EXPORT_COLUMNS: [&str; 9] = [
    CUSTOMER_ID_COLUMN,
    "Recencia",
    "Frequencia",
    "Valor",
    R_CLASS_COLUMN,
    F_CLASS_COLUMN,
    V_CLASS_COLUMN,
    SCORE_COLUMN,
    ACTION_COLUMN,
];

/// Worksheet holding the table in xlsx exports
pub const SHEET_NAME: &str = "RFV";

/// File format of the exported table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Format implied by the output file extension, `None` when unknown
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }
}

/// Build the output table, one row per customer
pub fn to_dataframe(segmentation: &Segmentation) -> SegmentResult<DataFrame> {
    let rows = &segmentation.customers;

    let customer_ids: Vec<String> = rows.iter().map(|c| c.customer_id.to_string()).collect();
    let recency: Vec<i64> = rows.iter().map(|c| c.metrics.recency).collect();
    let frequency: Vec<u64> = rows.iter().map(|c| c.metrics.frequency).collect();
    // Kept as text so the exact decimal sum survives the round trip
    let value: Vec<String> = rows.iter().map(|c| c.metrics.value.to_string()).collect();
    let r_class: Vec<String> = rows.iter().map(|c| c.r_class().to_string()).collect();
    let f_class: Vec<String> = rows.iter().map(|c| c.f_class().to_string()).collect();
    let v_class: Vec<String> = rows.iter().map(|c| c.v_class().to_string()).collect();
    let scores: Vec<String> = rows.iter().map(|c| c.score.to_string()).collect();
    let actions: Vec<Option<String>> = rows
        .iter()
        .map(|c| c.suggested_action.map(str::to_owned))
        .collect();

    let df = DataFrame::new(vec![
        Column::new(CUSTOMER_ID_COLUMN.into(), &customer_ids),
        Column::new(Metric::Recency.label().into(), &recency),
        Column::new(Metric::Frequency.label().into(), &frequency),
        Column::new(Metric::Value.label().into(), &value),
        Column::new(R_CLASS_COLUMN.into(), &r_class),
        Column::new(F_CLASS_COLUMN.into(), &f_class),
        Column::new(V_CLASS_COLUMN.into(), &v_class),
        Column::new(SCORE_COLUMN.into(), &scores),
        Column::new(ACTION_COLUMN.into(), &actions),
    ])?;

    Ok(df)
}

/// Serialize the output table to CSV bytes, header included
pub fn to_csv_bytes(segmentation: &Segmentation) -> SegmentResult<Vec<u8>> {
    let mut df = to_dataframe(segmentation)?;
    let mut buffer = Vec::new();

    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;

    Ok(buffer)
}

/// Write the CSV export to a file
pub fn write_csv<P: AsRef<Path>>(segmentation: &Segmentation, output_path: P) -> SegmentResult<()> {
    let bytes = to_csv_bytes(segmentation)?;
    fs::write(output_path.as_ref(), &bytes)?;

    log::info!(
        "exported {} rows ({} bytes) to {}",
        segmentation.customers.len(),
        bytes.len(),
        output_path.as_ref().display()
    );
    Ok(())
}

/// Serialize the output table to an xlsx workbook, header in the first row
pub fn to_xlsx_bytes(segmentation: &Segmentation) -> SegmentResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (index, customer) in segmentation.customers.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, customer.customer_id.to_string())?;
        worksheet.write_number(row, 1, customer.metrics.recency as f64)?;
        worksheet.write_number(row, 2, customer.metrics.frequency as f64)?;
        match customer.metrics.value.to_f64() {
            Some(value) => worksheet.write_number(row, 3, value)?,
            None => worksheet.write_string(row, 3, customer.metrics.value.to_string())?,
        };
        worksheet.write_string(row, 4, customer.r_class().to_string())?;
        worksheet.write_string(row, 5, customer.f_class().to_string())?;
        worksheet.write_string(row, 6, customer.v_class().to_string())?;
        worksheet.write_string(row, 7, customer.score.to_string())?;
        // Scores without an action leave the cell blank
        if let Some(action) = customer.suggested_action {
            worksheet.write_string(row, 8, action)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write the xlsx export to a file
pub fn write_xlsx<P: AsRef<Path>>(segmentation: &Segmentation, output_path: P) -> SegmentResult<()> {
    let bytes = to_xlsx_bytes(segmentation)?;
    fs::write(output_path.as_ref(), &bytes)?;

    log::info!(
        "exported {} rows ({} bytes) to {}",
        segmentation.customers.len(),
        bytes.len(),
        output_path.as_ref().display()
    );
    Ok(())
}

/// Write the export in the requested format
pub fn write_export<P: AsRef<Path>>(
    segmentation: &Segmentation,
    output_path: P,
    format: ExportFormat,
) -> SegmentResult<()> {
    match format {
        ExportFormat::Csv => write_csv(segmentation, output_path),
        ExportFormat::Xlsx => write_xlsx(segmentation, output_path),
    }
}
