//! Reduction of transaction rows into per-customer RFV metrics

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::data::{CustomerId, Transaction};
use crate::error::{InputError, SegmentResult};
use crate::quantile::Metric;

/// Recency, frequency and value for one customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerMetrics {
    /// Whole days between the reference day and the customer's last purchase
    pub recency: i64,
    /// Number of transaction rows
    pub frequency: u64,
    /// Sum of transaction amounts, refunds included
    pub value: Decimal,
}

impl CustomerMetrics {
    /// Metric value in the common decimal domain used for quartiles
    pub fn get(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Recency => Decimal::from(self.recency),
            Metric::Frequency => Decimal::from(self.frequency),
            Metric::Value => self.value,
        }
    }
}

/// Aggregated RFV table for one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfvData {
    /// Latest purchase date across the whole dataset
    pub reference_day: NaiveDateTime,
    pub customers: BTreeMap<CustomerId, CustomerMetrics>,
}

impl RfvData {
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// All values of one metric, in customer order
    pub fn metric_values(&self, metric: Metric) -> Vec<Decimal> {
        self.customers.values().map(|m| m.get(metric)).collect()
    }
}

struct Accumulator {
    last_purchase: NaiveDateTime,
    frequency: u64,
    value: Decimal,
}

/// Compute RFV metrics from transaction data
///
/// # Arguments
/// * `transactions` - Non-empty collection of purchase rows
///
/// # Returns
/// * `RfvData` with one entry per distinct customer
pub fn aggregate_metrics(transactions: &[Transaction]) -> SegmentResult<RfvData> {
    let reference_day = transactions
        .iter()
        .map(|t| t.purchase_date)
        .max()
        .ok_or(InputError::EmptyDataset)?;

    let mut accumulators: BTreeMap<CustomerId, Accumulator> = BTreeMap::new();
    for transaction in transactions {
        match accumulators.get_mut(&transaction.customer_id) {
            Some(acc) => {
                acc.last_purchase = acc.last_purchase.max(transaction.purchase_date);
                acc.frequency += 1;
                acc.value = acc
                    .value
                    .checked_add(transaction.total_value)
                    .ok_or_else(|| InputError::ValueOverflow {
                        customer: transaction.customer_id.to_string(),
                    })?;
            }
            None => {
                accumulators.insert(
                    transaction.customer_id.clone(),
                    Accumulator {
                        last_purchase: transaction.purchase_date,
                        frequency: 1,
                        value: transaction.total_value,
                    },
                );
            }
        }
    }

    let customers = accumulators
        .into_iter()
        .map(|(customer_id, acc)| {
            // Never negative, so truncation to whole days is a floor
            let recency = (reference_day - acc.last_purchase).num_days();
            let metrics = CustomerMetrics {
                recency,
                frequency: acc.frequency,
                value: acc.value,
            };
            (customer_id, metrics)
        })
        .collect::<BTreeMap<_, _>>();

    log::debug!(
        "aggregated {} transactions into {} customers (reference day {})",
        transactions.len(),
        customers.len(),
        reference_day
    );

    Ok(RfvData {
        reference_day,
        customers,
    })
}
