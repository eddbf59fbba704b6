//! RFVForge: customer segmentation CLI using quartile-based RFV scoring
//!
//! This is the main entrypoint that orchestrates transaction loading,
//! segmentation, reporting and export.

use anyhow::{Context, Result};
use clap::Parser;
use rfvforge::{load_transactions, report, segment, write_export, Args};
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    if args.verbose {
        println!("RFVForge - Customer Segmentation using RFV quartiles");
        println!("====================================================\n");
    }

    run_pipeline(&args)
}

/// Run the full segmentation pipeline
fn run_pipeline(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Load transactions
    if args.verbose {
        println!("Step 1: Loading transactions");
        println!("  Input file: {}", args.input);
    }

    let data_start = Instant::now();
    let transactions = load_transactions(&args.input)
        .with_context(|| format!("failed to load transactions from {}", args.input))?;
    let data_time = data_start.elapsed();

    println!("✓ Data loaded: {} transactions", transactions.len());
    if args.verbose {
        println!("  Loading time: {:.2}s", data_time.as_secs_f64());
    }

    // Step 2: Aggregate, classify and score
    if args.verbose {
        println!("\nStep 2: Segmenting customers");
    }

    let segment_start = Instant::now();
    let segmentation = segment(&transactions).context("segmentation failed")?;
    let segment_time = segment_start.elapsed();

    println!("✓ Segmented {} customers", segmentation.customers.len());
    if args.verbose {
        println!("  Segmentation time: {:.2}s", segment_time.as_secs_f64());
    }

    // Step 3: Report
    report::print_segmentation_summary(&segmentation, args.head);

    // Step 4: Export
    if !args.no_export {
        write_export(&segmentation, &args.output, args.export_format())
            .with_context(|| format!("failed to write {}", args.output))?;
        println!("\n✓ RFV table saved to: {}", args.output);
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
