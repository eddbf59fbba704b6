//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::export::ExportFormat;

/// Customer segmentation CLI using quartile-based RFV scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the transaction CSV file
    /// (columns: ID_cliente, DiaCompra, CodigoCompra, ValorTotal)
    #[arg(short, long, default_value = "compras.csv")]
    pub input: String,

    /// Output path for the classified RFV table
    #[arg(short, long, default_value = "RFV_resultado.xlsx")]
    pub output: String,

    /// Output format, inferred from the output extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Number of classified rows to print
    #[arg(long, default_value = "5")]
    pub head: usize,

    /// Skip writing the output file
    #[arg(long)]
    pub no_export: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Default log filter for the logger, `RUST_LOG` takes precedence
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Export format: the explicit flag, else the output extension, else CSV
    pub fn export_format(&self) -> ExportFormat {
        self.format
            .or_else(|| ExportFormat::from_path(&self.output))
            .unwrap_or(ExportFormat::Csv)
    }
}
