//! Quartile boundaries and ordinal class assignment

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::aggregate::RfvData;
use crate::error::{InputError, SegmentResult};

/// The three segmentation dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Recency,
    Frequency,
    Value,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Recency, Metric::Frequency, Metric::Value];

    pub fn polarity(self) -> Polarity {
        match self {
            Metric::Recency => Polarity::LowerIsBetter,
            Metric::Frequency | Metric::Value => Polarity::HigherIsBetter,
        }
    }

    /// Column label used in the exported table
    pub fn label(self) -> &'static str {
        match self {
            Metric::Recency => "Recencia",
            Metric::Frequency => "Frequencia",
            Metric::Value => "Valor",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
}

/// Ordinal class, `A` best through `D` worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuartileClass {
    A,
    B,
    C,
    D,
}

impl QuartileClass {
    pub fn as_char(self) -> char {
        match self {
            QuartileClass::A => 'A',
            QuartileClass::B => 'B',
            QuartileClass::C => 'C',
            QuartileClass::D => 'D',
        }
    }
}

impl fmt::Display for QuartileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 25th, 50th and 75th percentile of one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuartileBoundaries {
    pub q25: Decimal,
    pub q50: Decimal,
    pub q75: Decimal,
}

impl QuartileBoundaries {
    /// Compute boundaries for one metric over every customer in the table
    pub fn compute(rfv: &RfvData, metric: Metric) -> SegmentResult<Self> {
        let mut values = rfv.metric_values(metric);
        values.sort();
        Self::from_sorted(&values, metric).map_err(Into::into)
    }

    /// Boundaries over values of `metric` already sorted ascending
    pub fn from_sorted(sorted: &[Decimal], metric: Metric) -> Result<Self, InputError> {
        if sorted.is_empty() {
            return Err(InputError::EmptyDataset);
        }
        // Non-empty and p within [0, 1], so None only means the range overflowed
        let quartile = |p| {
            linear_quantile(sorted, p).ok_or(InputError::QuantileOverflow {
                metric: metric.label(),
            })
        };
        Ok(Self {
            q25: quartile(Decimal::new(25, 2))?,
            q50: quartile(Decimal::new(50, 2))?,
            q75: quartile(Decimal::new(75, 2))?,
        })
    }

    /// Bucket a value; ties at a boundary fall into the lower bucket.
    pub fn classify(&self, value: Decimal, polarity: Polarity) -> QuartileClass {
        let bucket = if value <= self.q25 {
            0
        } else if value <= self.q50 {
            1
        } else if value <= self.q75 {
            2
        } else {
            3
        };

        let classes = match polarity {
            Polarity::LowerIsBetter => [QuartileClass::A, QuartileClass::B, QuartileClass::C, QuartileClass::D],
            Polarity::HigherIsBetter => [QuartileClass::D, QuartileClass::C, QuartileClass::B, QuartileClass::A],
        };
        classes[bucket]
    }
}

/// Boundaries for all three metrics of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfvBoundaries {
    pub recency: QuartileBoundaries,
    pub frequency: QuartileBoundaries,
    pub value: QuartileBoundaries,
}

impl RfvBoundaries {
    pub fn compute(rfv: &RfvData) -> SegmentResult<Self> {
        if rfv.is_empty() {
            return Err(InputError::EmptyDataset.into());
        }

        let boundaries = Self {
            recency: QuartileBoundaries::compute(rfv, Metric::Recency)?,
            frequency: QuartileBoundaries::compute(rfv, Metric::Frequency)?,
            value: QuartileBoundaries::compute(rfv, Metric::Value)?,
        };
        log::debug!("quartile boundaries over {} customers: {:?}", rfv.len(), boundaries);

        Ok(boundaries)
    }

    pub fn get(&self, metric: Metric) -> &QuartileBoundaries {
        match metric {
            Metric::Recency => &self.recency,
            Metric::Frequency => &self.frequency,
            Metric::Value => &self.value,
        }
    }

    pub fn classify(&self, metric: Metric, value: Decimal) -> QuartileClass {
        self.get(metric).classify(value, metric.polarity())
    }
}

/// Continuous quantile with linear interpolation.
///
/// Position is `p * (n - 1)`; the result interpolates between the order
/// statistics at the floor and ceiling of that position. Returns `None` for
/// an empty slice, `p` outside `[0, 1]`, or when the interpolation leaves the
/// decimal range.
pub fn linear_quantile(sorted: &[Decimal], p: Decimal) -> Option<Decimal> {
    if p < Decimal::ZERO || p > Decimal::ONE {
        return None;
    }
    let last = sorted.len().checked_sub(1)?;

    let position = p * Decimal::from(last);
    let floor = position.floor();
    let index = floor.to_usize()?;
    let fraction = position - floor;

    let below = sorted[index];
    let above = sorted[(index + 1).min(last)];
    if fraction.is_zero() {
        return Some(below);
    }
    above
        .checked_sub(below)?
        .checked_mul(fraction)?
        .checked_add(below)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CustomerMetrics;
    use crate::data::CustomerId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn rfv_from(rows: &[(i64, u64, Decimal)]) -> RfvData {
        let customers = rows
            .iter()
            .enumerate()
            .map(|(i, &(recency, frequency, value))| {
                (
                    CustomerId::new(i.to_string()),
                    CustomerMetrics {
                        recency,
                        frequency,
                        value,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        RfvData {
            reference_day: NaiveDate::from_ymd_opt(2021, 12, 9)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            customers,
        }
    }

    #[test]
    fn test_linear_quantile() {
        let sorted = [dec!(1), dec!(2), dec!(3), dec!(4)];
        assert_eq!(linear_quantile(&sorted, dec!(0.25)), Some(dec!(1.75)));
        assert_eq!(linear_quantile(&sorted, dec!(0.5)), Some(dec!(2.5)));
        assert_eq!(linear_quantile(&sorted, dec!(0.75)), Some(dec!(3.25)));
        assert_eq!(linear_quantile(&sorted, dec!(0)), Some(dec!(1)));
        assert_eq!(linear_quantile(&sorted, dec!(1)), Some(dec!(4)));

        // Exact order statistic, no interpolation
        let five = [dec!(10), dec!(20), dec!(30), dec!(40), dec!(50)];
        assert_eq!(linear_quantile(&five, dec!(0.25)), Some(dec!(20)));

        assert_eq!(linear_quantile(&[], dec!(0.5)), None);
        assert_eq!(linear_quantile(&sorted, dec!(1.5)), None);
    }

    #[test]
    fn test_quantile_overflow() {
        // The spread between the extremes does not fit in a Decimal
        let extremes = [Decimal::MIN, Decimal::MAX];
        assert_eq!(linear_quantile(&extremes, dec!(0.25)), None);
        // Exact order statistics need no arithmetic
        assert_eq!(linear_quantile(&extremes, dec!(1)), Some(Decimal::MAX));

        assert_eq!(
            QuartileBoundaries::from_sorted(&extremes, Metric::Value),
            Err(InputError::QuantileOverflow { metric: "Valor" })
        );
        assert_eq!(
            QuartileBoundaries::from_sorted(&[], Metric::Recency),
            Err(InputError::EmptyDataset)
        );

        let rfv = rfv_from(&[(0, 1, Decimal::MAX), (5, 1, Decimal::MIN)]);
        let err = RfvBoundaries::compute(&rfv).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("Valor"));
    }

    #[test]
    fn test_single_value() {
        let boundaries = QuartileBoundaries::from_sorted(&[dec!(42.5)], Metric::Value).unwrap();
        assert_eq!(boundaries.q25, dec!(42.5));
        assert_eq!(boundaries.q50, dec!(42.5));
        assert_eq!(boundaries.q75, dec!(42.5));

        assert_eq!(
            boundaries.classify(dec!(42.5), Polarity::LowerIsBetter),
            QuartileClass::A
        );
        assert_eq!(
            boundaries.classify(dec!(42.5), Polarity::HigherIsBetter),
            QuartileClass::D
        );
    }

    #[test]
    fn test_recency_classes() {
        let boundaries = QuartileBoundaries {
            q25: dec!(10),
            q50: dec!(20),
            q75: dec!(30),
        };
        let classify = |v| boundaries.classify(v, Polarity::LowerIsBetter);

        assert_eq!(classify(dec!(0)), QuartileClass::A);
        assert_eq!(classify(dec!(10)), QuartileClass::A);
        assert_eq!(classify(dec!(10.01)), QuartileClass::B);
        assert_eq!(classify(dec!(20)), QuartileClass::B);
        assert_eq!(classify(dec!(30)), QuartileClass::C);
        assert_eq!(classify(dec!(31)), QuartileClass::D);
    }

    #[test]
    fn test_frequency_value_classes() {
        let boundaries = QuartileBoundaries {
            q25: dec!(1),
            q50: dec!(2),
            q75: dec!(5),
        };
        let classify = |v| boundaries.classify(v, Polarity::HigherIsBetter);

        assert_eq!(classify(dec!(-3)), QuartileClass::D);
        assert_eq!(classify(dec!(1)), QuartileClass::D);
        assert_eq!(classify(dec!(2)), QuartileClass::C);
        assert_eq!(classify(dec!(4)), QuartileClass::B);
        assert_eq!(classify(dec!(5)), QuartileClass::B);
        assert_eq!(classify(dec!(6)), QuartileClass::A);
    }

    #[test]
    fn test_identical_values_collapse() {
        let rfv = rfv_from(&[(7, 3, dec!(100)), (7, 3, dec!(100)), (7, 3, dec!(100))]);
        let boundaries = RfvBoundaries::compute(&rfv).unwrap();

        assert_eq!(boundaries.recency.q25, dec!(7));
        assert_eq!(boundaries.recency.q75, dec!(7));
        // Ties resolve with <=, so everyone lands in the first bucket
        assert_eq!(boundaries.classify(Metric::Recency, dec!(7)), QuartileClass::A);
        assert_eq!(boundaries.classify(Metric::Frequency, dec!(3)), QuartileClass::D);
        assert_eq!(boundaries.classify(Metric::Value, dec!(100)), QuartileClass::D);
    }

    #[test]
    fn test_rfv_boundaries_per_metric() {
        let rfv = rfv_from(&[
            (0, 4, dec!(400)),
            (10, 3, dec!(300)),
            (20, 2, dec!(200)),
            (30, 1, dec!(100)),
        ]);
        let boundaries = RfvBoundaries::compute(&rfv).unwrap();

        assert_eq!(boundaries.recency.q25, dec!(7.5));
        assert_eq!(boundaries.recency.q50, dec!(15));
        assert_eq!(boundaries.recency.q75, dec!(22.5));
        assert_eq!(boundaries.frequency.q50, dec!(2.5));
        assert_eq!(boundaries.value.q25, dec!(175));

        assert_eq!(boundaries.classify(Metric::Recency, dec!(0)), QuartileClass::A);
        assert_eq!(boundaries.classify(Metric::Recency, dec!(30)), QuartileClass::D);
        assert_eq!(boundaries.classify(Metric::Frequency, dec!(4)), QuartileClass::A);
        assert_eq!(boundaries.classify(Metric::Value, dec!(100)), QuartileClass::D);
    }

    #[test]
    fn test_empty_table() {
        let rfv = rfv_from(&[]);
        let err = RfvBoundaries::compute(&rfv).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_classification_is_monotonic() {
        let values: Vec<Decimal> = (0..23).map(|i| Decimal::from(i * i % 17)).collect();
        let mut sorted = values.clone();
        sorted.sort();
        let boundaries = QuartileBoundaries::from_sorted(&sorted, Metric::Value).unwrap();

        for polarity in [Polarity::LowerIsBetter, Polarity::HigherIsBetter] {
            for pair in sorted.windows(2) {
                let smaller = boundaries.classify(pair[0], polarity);
                let larger = boundaries.classify(pair[1], polarity);
                match polarity {
                    // Larger recency is never better
                    Polarity::LowerIsBetter => assert!(smaller <= larger),
                    // Smaller frequency/value is never better
                    Polarity::HigherIsBetter => assert!(smaller >= larger),
                }
            }
        }
    }
}
