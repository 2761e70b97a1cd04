use costing::{units::all_units, UnitCategory};

const CATEGORIES: [UnitCategory; 5] = [
    UnitCategory::Weight,
    UnitCategory::Volume,
    UnitCategory::Count,
    UnitCategory::Length,
    UnitCategory::Area,
];

pub(crate) fn print_units() {
    for category in CATEGORIES {
        println!("{category}");

        for unit in all_units().filter(|unit| unit.category == category) {
            let base = if unit.is_base() { " (base)" } else { "" };

            println!(
                "  {:<8} = {:>12} {}{base}  aliases: {}",
                unit.symbol,
                unit.factor,
                unit.base_symbol,
                unit.aliases.join(", ")
            );
        }
    }
}
