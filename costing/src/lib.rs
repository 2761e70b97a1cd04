//! Calculation core for the bakery back office.
//!
//! Everything in here is pure and synchronous and works on records that were
//! already loaded from the store. Odd input degrades instead of failing:
//! incompatible units fall back to raw quantities, an empty recipe costs
//! nothing and a zero-length order still gets its buffer. The one hard
//! failure is a production time too long to place on the calendar.

pub mod pricing;
pub mod recipe;
pub mod schedule;
pub mod units;

pub use pricing::{margin_percent, round_cents, suggested_price, PricedRecipe};
pub use recipe::{calculate_recipe_cost, IngredientLine, LineCost, RecipeCost, RecipeCostInput};
pub use schedule::{
    compute_buffer, parse_local_datetime, plan, production_start, total_duration,
    OrderItemEstimate, ProductionSchedule, ScheduleOverflow,
};
pub use units::{
    are_compatible, convert, lookup, try_convert, UnitCategory, UnitDefinition, UnknownUnit,
};
