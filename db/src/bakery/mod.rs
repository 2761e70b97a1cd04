use bigdecimal::{BigDecimal, ToPrimitive};
use color_eyre::{eyre::eyre, Result};

pub mod ingredients;
pub mod orders;
pub mod products;
pub mod recipe;

pub use ingredients::Ingredient;
pub use orders::{Order, OrderItem, OrderItemDetail, OrderStatus};
pub use products::Product;
pub use recipe::{
    recipe_ids_using_ingredient, Recipe, RecipeIngredient, RecipeIngredientDetail,
    RecipeWithDetails,
};

/// NUMERIC column as the `f64` the calculators work in.
pub(crate) fn decimal_to_f64(field: &str, value: &BigDecimal) -> Result<f64> {
    value
        .to_f64()
        .filter(|value| value.is_finite())
        .ok_or_else(|| eyre!("{field} of {value} doesn't fit a float"))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_decimal_to_f64() {
        let value = BigDecimal::from_str("4.8000").unwrap();
        assert!((decimal_to_f64("cost_per_unit", &value).unwrap() - 4.8).abs() < 1e-9);

        let huge = BigDecimal::from_str("1e400").unwrap();
        let err = decimal_to_f64("quantity", &huge).unwrap_err();
        assert!(err.to_string().starts_with("quantity of "));
    }
}
