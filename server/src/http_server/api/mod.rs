use std::str::FromStr;

use axum::http::StatusCode;
use bigdecimal::BigDecimal;
use color_eyre::eyre::{eyre, WrapErr};

use super::{errors::WithStatus as _, ResponseResult};

pub mod calculations;
pub mod ingredients;
pub mod orders;
pub mod products;
pub mod recipes;

pub(crate) const RECIPE_COST_PREFIX: &str = "recipe_cost:";

pub(crate) fn recipe_cost_key(recipe_id: uuid::Uuid) -> String {
    format!("{RECIPE_COST_PREFIX}{recipe_id}")
}

/// Numeric request fields go to `NUMERIC` columns through their decimal text.
pub(crate) fn decimal(field: &str, value: f64) -> ResponseResult<BigDecimal> {
    if !value.is_finite() {
        return Err(eyre!("{field} must be a finite number"))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    BigDecimal::from_str(&value.to_string())
        .wrap_err_with(|| format!("Invalid {field}: {value}"))
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_keeps_the_written_value() {
        assert_eq!(
            decimal("cost", 0.1).ok().unwrap(),
            BigDecimal::from_str("0.1").unwrap()
        );
        assert_eq!(
            decimal("cost", 12.0).ok().unwrap(),
            BigDecimal::from_str("12").unwrap()
        );
        assert!(decimal("cost", f64::NAN).is_err());
    }

    #[test]
    fn test_recipe_cost_key() {
        let id = uuid::Uuid::nil();

        assert_eq!(
            recipe_cost_key(id),
            "recipe_cost:00000000-0000-0000-0000-000000000000"
        );
    }
}
