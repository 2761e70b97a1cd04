use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::units::try_convert;

/// One ingredient of a recipe, with the pricing of the ingredient it links to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientLine {
    #[serde(default)]
    pub ingredient_id: Option<Uuid>,
    pub name: String,
    pub quantity: f64,
    /// Unit the recipe asks for, e.g. `cup`.
    pub unit: String,
    /// Unit the ingredient is priced in, e.g. `l`.
    pub native_unit: String,
    pub cost_per_unit: f64,
}

impl IngredientLine {
    /// Quantity expressed in the native unit, and whether a conversion happened.
    ///
    /// Lines whose units don't convert fall back to the raw quantity.
    pub fn native_quantity(&self) -> (f64, bool) {
        match try_convert(self.quantity, &self.unit, &self.native_unit) {
            Some(quantity) => (quantity, true),
            None => (self.quantity, false),
        }
    }

    pub fn cost(&self) -> LineCost {
        let (quantity_in_native_unit, converted) = self.native_quantity();

        LineCost {
            ingredient_id: self.ingredient_id,
            name: self.name.clone(),
            quantity_in_native_unit,
            line_cost: quantity_in_native_unit * self.cost_per_unit,
            converted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeCostInput {
    pub servings: NonZeroU32,
    #[serde(default)]
    pub lines: Vec<IngredientLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineCost {
    pub ingredient_id: Option<Uuid>,
    pub name: String,
    pub quantity_in_native_unit: f64,
    pub line_cost: f64,
    pub converted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeCost {
    pub total_cost: f64,
    pub cost_per_serving: f64,
    pub servings: NonZeroU32,
    pub lines: Vec<LineCost>,
    /// Lines whose unit couldn't be converted into the ingredient's unit and
    /// were costed on the raw quantity.
    pub unconverted: Vec<String>,
}

#[tracing::instrument(
    name = "costing.recipe_cost",
    skip_all,
    fields(servings = input.servings.get(), lines = input.lines.len())
)]
pub fn calculate_recipe_cost(input: &RecipeCostInput) -> RecipeCost {
    let mut total_cost = 0.0;
    let mut lines = Vec::with_capacity(input.lines.len());
    let mut unconverted = Vec::new();

    for line in &input.lines {
        let cost = line.cost();

        if !cost.converted && !line.unit.trim().eq_ignore_ascii_case(line.native_unit.trim()) {
            tracing::warn!(
                ingredient = %line.name,
                unit = %line.unit,
                native_unit = %line.native_unit,
                "Units not convertible, costing raw quantity"
            );
            unconverted.push(line.name.clone());
        }

        total_cost += cost.line_cost;
        lines.push(cost);
    }

    let cost_per_serving = total_cost / f64::from(input.servings.get());

    RecipeCost {
        total_cost,
        cost_per_serving,
        servings: input.servings,
        lines,
        unconverted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn line(name: &str, quantity: f64, unit: &str, native_unit: &str, cost: f64) -> IngredientLine {
        IngredientLine {
            ingredient_id: None,
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            native_unit: native_unit.to_string(),
            cost_per_unit: cost,
        }
    }

    fn servings(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn cake() -> RecipeCostInput {
        RecipeCostInput {
            servings: servings(8),
            lines: vec![
                // 2 kg at 30/kg
                line("flour", 2000.0, "g", "kg", 30.0),
                // 500 ml at 48/l
                line("cream", 500.0, "ml", "l", 48.0),
                // 12 eggs at 25 each
                line("eggs", 1.0, "dozen", "unit", 25.0),
            ],
        }
    }

    #[test]
    fn test_sums_converted_lines() {
        let cost = calculate_recipe_cost(&cake());

        assert!(close(cost.lines[0].line_cost, 60.0));
        assert!(close(cost.lines[1].line_cost, 24.0));
        assert!(close(cost.lines[2].line_cost, 300.0));
        assert!(close(cost.total_cost, 384.0));
        assert!(close(cost.cost_per_serving, 48.0));
        assert!(cost.unconverted.is_empty());
        assert!(cost.lines.iter().all(|l| l.converted));
    }

    #[test]
    fn test_mismatched_units_use_raw_quantity() {
        let input = RecipeCostInput {
            servings: servings(1),
            lines: vec![line("butter", 2.0, "cup", "kg", 10.0)],
        };

        let cost = calculate_recipe_cost(&input);

        assert!(close(cost.total_cost, 20.0));
        assert!(!cost.lines[0].converted);
        assert_eq!(cost.unconverted, vec!["butter".to_string()]);
    }

    #[test]
    fn test_unknown_but_identical_units_are_not_flagged() {
        let input = RecipeCostInput {
            servings: servings(2),
            lines: vec![line("vanilla", 3.0, "pod", "pod", 4.0)],
        };

        let cost = calculate_recipe_cost(&input);

        assert!(close(cost.total_cost, 12.0));
        assert!(close(cost.cost_per_serving, 6.0));
        assert!(cost.unconverted.is_empty());
    }

    #[test]
    fn test_empty_recipe_costs_nothing() {
        let input = RecipeCostInput {
            servings: servings(4),
            lines: vec![],
        };

        let cost = calculate_recipe_cost(&input);

        assert_eq!(cost.total_cost, 0.0);
        assert_eq!(cost.cost_per_serving, 0.0);
    }

    #[test]
    fn test_cost_is_linear_in_quantity() {
        let base = calculate_recipe_cost(&cake());

        let mut doubled = cake();
        for line in &mut doubled.lines {
            line.quantity *= 2.0;
        }
        let doubled = calculate_recipe_cost(&doubled);

        assert!(close(doubled.total_cost, base.total_cost * 2.0));
        assert!(close(doubled.cost_per_serving, base.cost_per_serving * 2.0));
    }

    #[test]
    fn test_cost_per_serving_never_increases_with_servings() {
        let mut previous = f64::INFINITY;

        for n in 1..=50 {
            let mut input = cake();
            input.servings = servings(n);
            let cost = calculate_recipe_cost(&input);

            assert!(close(cost.total_cost, 384.0));
            assert!(cost.cost_per_serving <= previous);
            previous = cost.cost_per_serving;
        }
    }

    #[test]
    fn test_input_deserializes_and_rejects_zero_servings() {
        let input: RecipeCostInput = serde_json::from_str(
            r#"{
                "servings": 2,
                "lines": [
                    {"name": "sugar", "quantity": 1, "unit": "cup", "native_unit": "kg", "cost_per_unit": 2.5}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(input.servings.get(), 2);
        assert_eq!(input.lines[0].ingredient_id, None);

        let zero = serde_json::from_str::<RecipeCostInput>(r#"{"servings": 0, "lines": []}"#);
        assert!(zero.is_err());
    }
}
