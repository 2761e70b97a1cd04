use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UnitCategory {
    #[serde(rename = "weight")]
    Weight,
    #[serde(rename = "volume")]
    Volume,
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "length")]
    Length,
    #[serde(rename = "area")]
    Area,
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitCategory::Weight => write!(f, "weight"),
            UnitCategory::Volume => write!(f, "volume"),
            UnitCategory::Count => write!(f, "count"),
            UnitCategory::Length => write!(f, "length"),
            UnitCategory::Area => write!(f, "area"),
        }
    }
}

impl std::str::FromStr for UnitCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(UnitCategory::Weight),
            "volume" => Ok(UnitCategory::Volume),
            "count" => Ok(UnitCategory::Count),
            "length" => Ok(UnitCategory::Length),
            "area" => Ok(UnitCategory::Area),
            _ => Err(format!("Unknown unit category: {s}")),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown unit: {0}")]
pub struct UnknownUnit(pub String);

/// One row of the conversion table.
///
/// `factor` is how many of `base_symbol` make up one of this unit, so
/// `value * factor` is the value expressed in the category's base unit.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct UnitDefinition {
    pub symbol: &'static str,
    pub category: UnitCategory,
    pub base_symbol: &'static str,
    pub factor: f64,
    pub aliases: &'static [&'static str],
}

impl UnitDefinition {
    const fn new(
        symbol: &'static str,
        category: UnitCategory,
        base_symbol: &'static str,
        factor: f64,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            symbol,
            category,
            base_symbol,
            factor,
            aliases,
        }
    }

    pub fn parse(tag: &str) -> Result<&'static Self, UnknownUnit> {
        lookup(tag).ok_or_else(|| UnknownUnit(tag.trim().to_string()))
    }

    pub fn is_base(&self) -> bool {
        self.symbol == self.base_symbol
    }

    pub fn is_compatible_with(&self, other: &UnitDefinition) -> bool {
        self.category == other.category && self.base_symbol == other.base_symbol
    }

    fn matches(&self, tag: &str) -> bool {
        self.symbol.eq_ignore_ascii_case(tag)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(tag))
    }
}

use UnitCategory::{Area, Count, Length, Volume, Weight};

static UNITS: &[UnitDefinition] = &[
    // weight, base gram
    UnitDefinition::new("mg", Weight, "g", 0.001, &["milligram", "milligrams"]),
    UnitDefinition::new("g", Weight, "g", 1.0, &["gr", "gram", "grams", "gramme"]),
    UnitDefinition::new("kg", Weight, "g", 1000.0, &["kilo", "kilos", "kilogram", "kilograms"]),
    UnitDefinition::new("oz", Weight, "g", 28.349_523_125, &["ounce", "ounces"]),
    UnitDefinition::new("lb", Weight, "g", 453.592_37, &["lbs", "pound", "pounds"]),
    // volume, base millilitre
    UnitDefinition::new("ml", Volume, "ml", 1.0, &["milliliter", "milliliters", "millilitre", "millilitres"]),
    UnitDefinition::new("cl", Volume, "ml", 10.0, &["centiliter", "centilitre"]),
    UnitDefinition::new("dl", Volume, "ml", 100.0, &["deciliter", "decilitre"]),
    UnitDefinition::new("l", Volume, "ml", 1000.0, &["lt", "liter", "liters", "litre", "litres"]),
    UnitDefinition::new("tsp", Volume, "ml", 4.928_921_593_75, &["teaspoon", "teaspoons"]),
    UnitDefinition::new("tbsp", Volume, "ml", 14.786_764_781_25, &["tablespoon", "tablespoons"]),
    UnitDefinition::new("fl_oz", Volume, "ml", 29.573_529_562_5, &["fl oz", "floz", "fluid ounce", "fluid ounces"]),
    UnitDefinition::new("cup", Volume, "ml", 236.588_236_5, &["cups"]),
    UnitDefinition::new("pt", Volume, "ml", 473.176_473, &["pint", "pints"]),
    UnitDefinition::new("qt", Volume, "ml", 946.352_946, &["quart", "quarts"]),
    UnitDefinition::new("gal", Volume, "ml", 3785.411_784, &["gallon", "gallons"]),
    // count, base single unit
    UnitDefinition::new("unit", Count, "unit", 1.0, &["u", "units", "pc", "pcs", "piece", "pieces", "each", "ea"]),
    UnitDefinition::new("dozen", Count, "unit", 12.0, &["dz", "doz", "dozens"]),
    // length, base centimetre
    UnitDefinition::new("mm", Length, "cm", 0.1, &["millimeter", "millimeters", "millimetre"]),
    UnitDefinition::new("cm", Length, "cm", 1.0, &["centimeter", "centimeters", "centimetre"]),
    UnitDefinition::new("m", Length, "cm", 100.0, &["meter", "meters", "metre", "metres"]),
    UnitDefinition::new("in", Length, "cm", 2.54, &["inch", "inches"]),
    UnitDefinition::new("ft", Length, "cm", 30.48, &["foot", "feet"]),
    // area, base square centimetre
    UnitDefinition::new("cm2", Area, "cm2", 1.0, &["cm²", "sq cm"]),
    UnitDefinition::new("m2", Area, "cm2", 10_000.0, &["m²", "sq m"]),
    UnitDefinition::new("in2", Area, "cm2", 6.4516, &["in²", "sq in"]),
];

pub fn all_units() -> impl Iterator<Item = &'static UnitDefinition> {
    UNITS.iter()
}

pub fn lookup(tag: &str) -> Option<&'static UnitDefinition> {
    let tag = tag.trim();

    UNITS.iter().find(|unit| unit.matches(tag))
}

/// Units are compatible when both are known and share category and base unit.
pub fn are_compatible(from: &str, to: &str) -> bool {
    match (lookup(from), lookup(to)) {
        (Some(from), Some(to)) => from.is_compatible_with(to),
        _ => false,
    }
}

/// Converts `value` from one unit tag to another, or returns `None` when the
/// pair can't be converted.
pub fn try_convert(value: f64, from: &str, to: &str) -> Option<f64> {
    let from = lookup(from)?;
    let to = lookup(to)?;

    if !from.is_compatible_with(to) {
        return None;
    }

    if std::ptr::eq(from, to) {
        return Some(value);
    }

    Some(value * from.factor / to.factor)
}

/// Like [`try_convert`] but hands the input back untouched when the units
/// aren't convertible.
pub fn convert(value: f64, from: &str, to: &str) -> f64 {
    try_convert(value, from, to).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_converts_within_a_category() {
        assert!(close(convert(2.0, "kg", "g"), 2000.0));
        assert!(close(convert(500.0, "g", "kg"), 0.5));
        assert!(close(convert(1.0, "cup", "ml"), 236.588_236_5));
        assert!(close(convert(3.0, "tsp", "tbsp"), 1.0));
        assert!(close(convert(1.0, "dozen", "unit"), 12.0));
        assert!(close(convert(1.0, "m2", "cm2"), 10_000.0));
    }

    #[test]
    fn test_compatible_round_trip() {
        for from in all_units() {
            for to in all_units().filter(|to| to.is_compatible_with(from)) {
                for x in [0.0, 0.25, 1.0, 7.5, 1234.5678] {
                    let there = convert(x, from.symbol, to.symbol);
                    let back = convert(there, to.symbol, from.symbol);
                    assert!(
                        close(back, x),
                        "{x} {} -> {} -> {} gave {back}",
                        from.symbol,
                        to.symbol,
                        from.symbol
                    );
                }
            }
        }
    }

    #[test]
    fn test_incompatible_units_pass_through() {
        for from in all_units() {
            for to in all_units().filter(|to| !to.is_compatible_with(from)) {
                assert_eq!(convert(42.5, from.symbol, to.symbol), 42.5);
                assert_eq!(try_convert(42.5, from.symbol, to.symbol), None);
            }
        }

        assert_eq!(convert(3.0, "g", "ml"), 3.0);
        assert_eq!(convert(3.0, "pinch", "g"), 3.0);
        assert_eq!(convert(3.0, "g", "handful"), 3.0);
    }

    #[test]
    fn test_same_unit_is_identity() {
        for unit in all_units() {
            assert_eq!(convert(0.1, unit.symbol, unit.symbol), 0.1);
        }

        assert_eq!(convert(9.0, "pinch", "pinch"), 9.0);
    }

    #[test]
    fn test_lookup_is_case_and_alias_insensitive() {
        assert_eq!(lookup(" Grams ").map(|u| u.symbol), Some("g"));
        assert_eq!(lookup("LITRE").map(|u| u.symbol), Some("l"));
        assert_eq!(lookup("Cups").map(|u| u.symbol), Some("cup"));
        assert_eq!(lookup("pcs").map(|u| u.symbol), Some("unit"));
        assert!(lookup("smidgen").is_none());
    }

    #[test]
    fn test_every_unit_points_at_a_base_in_its_category() {
        for unit in all_units() {
            let base = lookup(unit.base_symbol).unwrap();
            assert!(base.is_base());
            assert_eq!(base.category, unit.category);
        }
    }

    #[test]
    fn test_parse_reports_unknown_units() {
        assert_eq!(UnitDefinition::parse("kg").unwrap().symbol, "kg");
        assert_eq!(
            UnitDefinition::parse(" bushel "),
            Err(UnknownUnit("bushel".to_string()))
        );
    }

    #[test]
    fn test_unit_category_from_str() {
        assert_eq!("volume".parse::<UnitCategory>().unwrap(), UnitCategory::Volume);
        assert_eq!(UnitCategory::Area.to_string(), "area");
        assert!("temperature".parse::<UnitCategory>().is_err());
    }

    #[test]
    fn test_are_compatible() {
        assert!(are_compatible("lb", "kg"));
        assert!(are_compatible("cup", "l"));
        assert!(!are_compatible("cup", "kg"));
        assert!(!are_compatible("unknown", "unknown"));
    }
}
