use serde::{Deserialize, Serialize};

use crate::recipe::RecipeCost;

pub const DEFAULT_MARKUP_PERCENT: f64 = 60.0;

pub fn suggested_price(cost_per_serving: f64, markup_percent: f64) -> f64 {
    cost_per_serving * (1.0 + markup_percent / 100.0)
}

/// Gross margin as a percentage of the selling price. `None` for a zero price.
pub fn margin_percent(price: f64, cost: f64) -> Option<f64> {
    if price.abs() < f64::EPSILON {
        return None;
    }

    Some((price - cost) / price * 100.0)
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricedRecipe {
    #[serde(flatten)]
    pub cost: RecipeCost,
    pub markup_percent: f64,
    pub suggested_price: f64,
    pub margin_percent: Option<f64>,
}

impl PricedRecipe {
    pub fn new(cost: RecipeCost, markup_percent: f64) -> Self {
        let suggested_price = suggested_price(cost.cost_per_serving, markup_percent);
        let margin_percent = margin_percent(suggested_price, cost.cost_per_serving);

        Self {
            cost,
            markup_percent,
            suggested_price,
            margin_percent,
        }
    }

    /// Money fields rounded to cents, for display.
    #[must_use]
    pub fn rounded(mut self) -> Self {
        self.cost.total_cost = round_cents(self.cost.total_cost);
        self.cost.cost_per_serving = round_cents(self.cost.cost_per_serving);
        for line in &mut self.cost.lines {
            line.line_cost = round_cents(line.line_cost);
        }
        self.suggested_price = round_cents(self.suggested_price);
        self.margin_percent = self.margin_percent.map(round_cents);

        self
    }
}
