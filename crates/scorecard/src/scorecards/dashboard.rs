use rust_decimal::Decimal;
use serde::Serialize;

use crate::periods::PeriodId;

/// Running sums kept per perspective and for the whole period.
///
/// Weight is added for every indicator; the score sums only move when the
/// indicator has a reported actual.
pub trait ScoreRollup: Default + Clone {
    type Actual;

    fn add_weight(&mut self, weight: Decimal);
    fn add_actual(&mut self, actual: &Self::Actual);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerspectiveBucket<Item, Totals> {
    pub perspective: String,
    pub items: Vec<Item>,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard<Item, Totals> {
    pub period_id: PeriodId,
    pub period_name: String,
    pub perspectives: Vec<PerspectiveBucket<Item, Totals>>,
    #[serde(flatten)]
    pub totals: Totals,
}

impl<Item, Totals> Dashboard<Item, Totals> {
    pub fn perspective(&self, name: &str) -> Option<&PerspectiveBucket<Item, Totals>> {
        self.perspectives
            .iter()
            .find(|bucket| bucket.perspective == name)
    }
}

/// Groups indicators into perspective buckets in the order they are discovered.
pub(crate) struct DashboardBuilder<Item, Totals> {
    period_id: PeriodId,
    period_name: String,
    buckets: Vec<PerspectiveBucket<Item, Totals>>,
    totals: Totals,
}

impl<Item, Totals> DashboardBuilder<Item, Totals>
where
    Totals: ScoreRollup,
{
    pub(crate) fn new(period_id: PeriodId, period_name: impl Into<String>) -> Self {
        Self {
            period_id,
            period_name: period_name.into(),
            buckets: Vec::new(),
            totals: Totals::default(),
        }
    }

    /// Add one indicator. `actual_of` picks the reported actual, if any, out of
    /// the stored item.
    pub(crate) fn push<F>(&mut self, perspective: &str, weight: Decimal, item: Item, actual_of: F)
    where
        F: FnOnce(&Item) -> Option<&Totals::Actual>,
    {
        let index = match self
            .buckets
            .iter()
            .position(|bucket| bucket.perspective == perspective)
        {
            Some(index) => index,
            None => {
                self.buckets.push(PerspectiveBucket {
                    perspective: perspective.to_string(),
                    items: Vec::new(),
                    totals: Totals::default(),
                });
                self.buckets.len() - 1
            }
        };

        let bucket = &mut self.buckets[index];
        bucket.totals.add_weight(weight);
        self.totals.add_weight(weight);
        bucket.items.push(item);

        if let Some(actual) = bucket.items.last().and_then(actual_of) {
            bucket.totals.add_actual(actual);
            self.totals.add_actual(actual);
        }
    }

    pub(crate) fn finish(self) -> Dashboard<Item, Totals> {
        Dashboard {
            period_id: self.period_id,
            period_name: self.period_name,
            perspectives: self.buckets,
            totals: self.totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Sums {
        weight: Decimal,
        score: Decimal,
    }

    impl ScoreRollup for Sums {
        type Actual = Decimal;

        fn add_weight(&mut self, weight: Decimal) {
            self.weight += weight;
        }

        fn add_actual(&mut self, actual: &Decimal) {
            self.score += *actual;
        }
    }

    #[test]
    fn buckets_follow_discovery_order_and_skip_missing_actuals() {
        let mut builder: DashboardBuilder<(&str, Option<Decimal>), Sums> =
            DashboardBuilder::new(PeriodId(Uuid::nil()), "Jan-25");
        fn reported<'a>(item: &'a (&str, Option<Decimal>)) -> Option<&'a Decimal> {
            item.1.as_ref()
        }

        builder.push("Customer", Decimal::new(20, 0), ("a", Some(Decimal::new(10, 0))), reported);
        builder.push("Financial", Decimal::new(30, 0), ("b", None), reported);
        builder.push("Customer", Decimal::new(15, 0), ("c", None), reported);

        let dashboard = builder.finish();
        let names: Vec<_> = dashboard
            .perspectives
            .iter()
            .map(|bucket| bucket.perspective.as_str())
            .collect();
        assert_eq!(names, vec!["Customer", "Financial"]);

        let customer = dashboard.perspective("Customer").expect("bucket");
        let items: Vec<_> = customer.items.iter().map(|item| item.0).collect();
        assert_eq!(items, vec!["a", "c"]);
        assert_eq!(customer.totals.weight, Decimal::new(35, 0));
        assert_eq!(customer.totals.score, Decimal::new(10, 0));

        assert_eq!(dashboard.totals.weight, Decimal::new(65, 0));
        assert_eq!(dashboard.totals.score, Decimal::new(10, 0));
    }
}
