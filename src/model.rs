//! Segment scores, suggested actions and the segmentation pipeline

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use chrono::NaiveDateTime;

use crate::aggregate::{aggregate_metrics, CustomerMetrics, RfvData};
use crate::data::{CustomerId, Transaction};
use crate::error::SegmentResult;
use crate::quantile::{Metric, QuartileClass, RfvBoundaries};

/// Known segment scores and the marketing action suggested for each.
///
/// Deliberately partial: any score not listed has no suggested action.
pub const ACTION_TABLE: [(&str, &str); 4] = [
    (
        "AAA",
        "high-value, recently-active, frequent — prioritize retention incentive",
    ),
    ("DDD", "low-value across all dimensions — no special action"),
    (
        "DAA",
        "high-value, high-frequency, but long absent — win-back incentive",
    ),
    (
        "CAA",
        "high-value, high-frequency, moderately absent — urgent win-back",
    ),
];

/// Three-letter RFV segment score, always in R, F, V order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Score {
    pub recency: QuartileClass,
    pub frequency: QuartileClass,
    pub value: QuartileClass,
}

impl Score {
    pub fn new(recency: QuartileClass, frequency: QuartileClass, value: QuartileClass) -> Self {
        Self {
            recency,
            frequency,
            value,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.recency, self.frequency, self.value)
    }
}

/// Look up the action for a score, `None` when the table has no entry
pub fn suggested_action(score: &Score) -> Option<&'static str> {
    let key = score.to_string();
    ACTION_TABLE
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, action)| *action)
}

/// Customer metrics with their classes, score and suggested action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCustomer {
    pub customer_id: CustomerId,
    pub metrics: CustomerMetrics,
    pub score: Score,
    pub suggested_action: Option<&'static str>,
}

impl ClassifiedCustomer {
    pub fn r_class(&self) -> QuartileClass {
        self.score.recency
    }

    pub fn f_class(&self) -> QuartileClass {
        self.score.frequency
    }

    pub fn v_class(&self) -> QuartileClass {
        self.score.value
    }
}

/// Result of one segmentation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub reference_day: NaiveDateTime,
    pub boundaries: RfvBoundaries,
    /// Ordered by customer id
    pub customers: Vec<ClassifiedCustomer>,
}

impl Segmentation {
    /// Number of transaction rows behind the table
    pub fn transaction_count(&self) -> u64 {
        self.customers.iter().map(|c| c.metrics.frequency).sum()
    }

    /// Number of customers per score, most common first
    pub fn score_counts(&self) -> Vec<(Score, usize)> {
        tally(self.customers.iter().map(|c| c.score))
    }

    /// Number of customers per suggested action, including those with none
    pub fn action_counts(&self) -> Vec<(Option<&'static str>, usize)> {
        tally(self.customers.iter().map(|c| c.suggested_action))
    }
}

/// Count occurrences, sorted by count descending then key ascending
fn tally<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut counts: Vec<(K, usize)> = counts.into_iter().collect();
    counts.sort_by(|(a_key, a_count), (b_key, b_count)| {
        b_count.cmp(a_count).then_with(|| a_key.cmp(b_key))
    });
    counts
}

/// Classify every customer of an aggregated table
///
/// # Arguments
/// * `rfv` - Aggregated metrics for all customers of the dataset
///
/// # Returns
/// * `Segmentation` with boundaries recomputed for this table
pub fn classify_customers(rfv: &RfvData) -> SegmentResult<Segmentation> {
    let boundaries = RfvBoundaries::compute(rfv)?;

    let customers = rfv
        .customers
        .iter()
        .map(|(customer_id, metrics)| {
            let score = Score::new(
                boundaries.classify(Metric::Recency, metrics.get(Metric::Recency)),
                boundaries.classify(Metric::Frequency, metrics.get(Metric::Frequency)),
                boundaries.classify(Metric::Value, metrics.get(Metric::Value)),
            );
            ClassifiedCustomer {
                customer_id: customer_id.clone(),
                metrics: metrics.clone(),
                score,
                suggested_action: suggested_action(&score),
            }
        })
        .collect();

    Ok(Segmentation {
        reference_day: rfv.reference_day,
        boundaries,
        customers,
    })
}

/// Run aggregation, classification and scoring over a transaction set
pub fn segment(transactions: &[Transaction]) -> SegmentResult<Segmentation> {
    let rfv = aggregate_metrics(transactions)?;
    let segmentation = classify_customers(&rfv)?;

    log::info!(
        "segmented {} customers into {} distinct scores",
        segmentation.customers.len(),
        segmentation.score_counts().len()
    );

    Ok(segmentation)
}
