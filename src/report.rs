//! Console report of a segmentation run

use crate::model::Segmentation;
use crate::quantile::Metric;

/// Label printed for customers without a suggested action
const NO_ACTION: &str = "(none)";

/// Render the quartile boundary table
pub fn format_boundaries(segmentation: &Segmentation) -> String {
    let mut out = String::new();
    out.push_str("  Metric     |        Q25 |        Q50 |        Q75\n");
    out.push_str("  -----------|------------|------------|-----------\n");
    for metric in Metric::ALL {
        let b = segmentation.boundaries.get(metric);
        out.push_str(&format!(
            "  {:10} | {:>10} | {:>10} | {:>10}\n",
            metric.label(),
            b.q25.normalize().to_string(),
            b.q50.normalize().to_string(),
            b.q75.normalize().to_string()
        ));
    }
    out
}

/// Render the first `head` rows of the classified table
pub fn format_head(segmentation: &Segmentation, head: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:>10} | {:>8} | {:>10} | {:>12} | R | F | V | Score | Action\n",
        "ID_cliente", "Recencia", "Frequencia", "Valor"
    ));
    for customer in segmentation.customers.iter().take(head) {
        out.push_str(&format!(
            "  {:>10} | {:>8} | {:>10} | {:>12} | {} | {} | {} | {:5} | {}\n",
            customer.customer_id.as_str(),
            customer.metrics.recency,
            customer.metrics.frequency,
            customer.metrics.value.to_string(),
            customer.r_class(),
            customer.f_class(),
            customer.v_class(),
            customer.score.to_string(),
            customer.suggested_action.unwrap_or(NO_ACTION)
        ));
    }
    out
}

/// Render score and action tallies with their share of customers
pub fn format_counts(segmentation: &Segmentation) -> String {
    let total = segmentation.customers.len().max(1) as f64;
    let mut out = String::new();

    out.push_str("Customers per score:\n");
    for (score, count) in segmentation.score_counts() {
        let percentage = count as f64 / total * 100.0;
        out.push_str(&format!("  {}: {} ({:.1}%)\n", score, count, percentage));
    }

    out.push_str("Customers per action:\n");
    for (action, count) in segmentation.action_counts() {
        let percentage = count as f64 / total * 100.0;
        out.push_str(&format!(
            "  {}: {} ({:.1}%)\n",
            action.unwrap_or(NO_ACTION),
            count,
            percentage
        ));
    }
    out
}

/// Print the full summary to stdout
pub fn print_segmentation_summary(segmentation: &Segmentation, head: usize) {
    println!("\n=== RFV Segmentation ===");
    println!("Reference day: {}", segmentation.reference_day);
    println!("Total customers: {}", segmentation.customers.len());
    println!("Total transactions: {}", segmentation.transaction_count());

    println!("\nQuartile boundaries:");
    print!("{}", format_boundaries(segmentation));

    if head > 0 {
        println!("\nFirst {} customers:", head.min(segmentation.customers.len()));
        print!("{}", format_head(segmentation, head));
    }

    println!();
    print!("{}", format_counts(segmentation));
}
