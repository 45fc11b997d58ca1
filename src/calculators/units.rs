//! Unit conversion tables.
//!
//! Linear categories store each unit's factor to a base unit (metre,
//! kilogram, litre, byte); converting is `value × from / to`. Temperature is
//! affine and goes through Celsius.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UnitError {
    #[error("unknown unit '{0}'")]
    Unknown(String),
    #[error("cannot convert {from} ({from_kind}) to {to} ({to_kind})")]
    Mismatch {
        from: String,
        from_kind: Category,
        to: String,
        to_kind: Category,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Length,
    Mass,
    Temperature,
    Volume,
    Data,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Length,
        Category::Mass,
        Category::Temperature,
        Category::Volume,
        Category::Data,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Length => "length",
            Self::Mass => "mass",
            Self::Temperature => "temperature",
            Self::Volume => "volume",
            Self::Data => "data size",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scale {
    /// Multiply by this to get the base unit.
    Linear(f64),
    Celsius,
    Fahrenheit,
    Kelvin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub symbol: &'static str,
    pub name: &'static str,
    pub category: Category,
    aliases: &'static [&'static str],
    scale: Scale,
}

const fn linear(
    symbol: &'static str,
    name: &'static str,
    category: Category,
    aliases: &'static [&'static str],
    factor: f64,
) -> Unit {
    Unit {
        symbol,
        name,
        category,
        aliases,
        scale: Scale::Linear(factor),
    }
}

pub const UNITS: &[Unit] = &[
    // Length (metre)
    linear("mm", "millimetre", Category::Length, &["millimeter", "millimeters", "millimetres"], 0.001),
    linear("cm", "centimetre", Category::Length, &["centimeter", "centimeters", "centimetres"], 0.01),
    linear("m", "metre", Category::Length, &["meter", "meters", "metres"], 1.0),
    linear("km", "kilometre", Category::Length, &["kilometer", "kilometers", "kilometres"], 1000.0),
    linear("in", "inch", Category::Length, &["inches", "\""], 0.0254),
    linear("ft", "foot", Category::Length, &["feet", "'"], 0.3048),
    linear("yd", "yard", Category::Length, &["yards"], 0.9144),
    linear("mi", "mile", Category::Length, &["miles"], 1609.344),
    linear("nmi", "nautical mile", Category::Length, &["nautical miles"], 1852.0),
    // Mass (kilogram)
    linear("mg", "milligram", Category::Mass, &["milligrams"], 1e-6),
    linear("g", "gram", Category::Mass, &["grams"], 0.001),
    linear("kg", "kilogram", Category::Mass, &["kilograms", "kilo", "kilos"], 1.0),
    linear("t", "tonne", Category::Mass, &["tonnes", "metric ton"], 1000.0),
    linear("oz", "ounce", Category::Mass, &["ounces"], 0.028_349_523_125),
    linear("lb", "pound", Category::Mass, &["pounds", "lbs"], 0.453_592_37),
    linear("st", "stone", Category::Mass, &["stones"], 6.350_293_18),
    // Volume (litre)
    linear("ml", "millilitre", Category::Volume, &["milliliter", "milliliters", "millilitres"], 0.001),
    linear("l", "litre", Category::Volume, &["liter", "liters", "litres"], 1.0),
    linear("m3", "cubic metre", Category::Volume, &["cubic meter", "cubic meters"], 1000.0),
    linear("tsp", "teaspoon", Category::Volume, &["teaspoons"], 0.004_928_921_593_75),
    linear("tbsp", "tablespoon", Category::Volume, &["tablespoons"], 0.014_786_764_781_25),
    linear("floz", "US fluid ounce", Category::Volume, &["fl oz", "fluid ounce", "fluid ounces"], 0.029_573_529_562_5),
    linear("cup", "US cup", Category::Volume, &["cups"], 0.236_588_236_5),
    linear("pt", "US pint", Category::Volume, &["pint", "pints"], 0.473_176_473),
    linear("qt", "US quart", Category::Volume, &["quart", "quarts"], 0.946_352_946),
    linear("gal", "US gallon", Category::Volume, &["gallon", "gallons"], 3.785_411_784),
    // Data (byte)
    linear("bit", "bit", Category::Data, &["bits"], 0.125),
    linear("B", "byte", Category::Data, &["bytes"], 1.0),
    linear("KB", "kilobyte", Category::Data, &["kilobytes"], 1e3),
    linear("MB", "megabyte", Category::Data, &["megabytes"], 1e6),
    linear("GB", "gigabyte", Category::Data, &["gigabytes"], 1e9),
    linear("TB", "terabyte", Category::Data, &["terabytes"], 1e12),
    linear("KiB", "kibibyte", Category::Data, &["kibibytes"], 1024.0),
    linear("MiB", "mebibyte", Category::Data, &["mebibytes"], 1_048_576.0),
    linear("GiB", "gibibyte", Category::Data, &["gibibytes"], 1_073_741_824.0),
    // Temperature
    Unit {
        symbol: "C",
        name: "degree Celsius",
        category: Category::Temperature,
        aliases: &["°c", "celsius", "centigrade"],
        scale: Scale::Celsius,
    },
    Unit {
        symbol: "F",
        name: "degree Fahrenheit",
        category: Category::Temperature,
        aliases: &["°f", "fahrenheit"],
        scale: Scale::Fahrenheit,
    },
    Unit {
        symbol: "K",
        name: "kelvin",
        category: Category::Temperature,
        aliases: &["kelvins"],
        scale: Scale::Kelvin,
    },
];

impl Unit {
    /// Look a unit up by symbol or alias.
    ///
    /// An exact symbol match wins (`K` is kelvin, `KB` kilobyte); otherwise
    /// symbols, names and aliases are compared case-insensitively.
    pub fn lookup(input: &str) -> Result<&'static Unit, UnitError> {
        let wanted = input.trim();
        UNITS
            .iter()
            .find(|u| u.symbol == wanted)
            .or_else(|| {
                UNITS.iter().find(|u| {
                    u.symbol.eq_ignore_ascii_case(wanted)
                        || u.name.eq_ignore_ascii_case(wanted)
                        || u.aliases.iter().any(|a| a.eq_ignore_ascii_case(wanted))
                })
            })
            .ok_or_else(|| UnitError::Unknown(input.trim().to_string()))
    }

    fn to_base(&self, value: f64) -> f64 {
        match self.scale {
            Scale::Linear(factor) => value * factor,
            Scale::Celsius => value,
            Scale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Scale::Kelvin => value - 273.15,
        }
    }

    fn from_base(&self, base: f64) -> f64 {
        match self.scale {
            Scale::Linear(factor) => base / factor,
            Scale::Celsius => base,
            Scale::Fahrenheit => base * 9.0 / 5.0 + 32.0,
            Scale::Kelvin => base + 273.15,
        }
    }
}

/// Convert `value` between two units of the same category.
pub fn convert(value: f64, from: &Unit, to: &Unit) -> Result<f64, UnitError> {
    if from.category != to.category {
        return Err(UnitError::Mismatch {
            from: from.symbol.to_string(),
            from_kind: from.category,
            to: to.symbol.to_string(),
            to_kind: to.category,
        });
    }
    Ok(to.from_base(from.to_base(value)))
}

/// Convert by unit names, e.g. `convert_named(5.0, "km", "mi")`.
pub fn convert_named(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    convert(value, Unit::lookup(from)?, Unit::lookup(to)?)
}

/// Units of one category, in table order.
pub fn units_in(category: Category) -> impl Iterator<Item = &'static Unit> {
    UNITS.iter().filter(move |u| u.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn metres_to_feet() {
        let feet = convert_named(1.0, "m", "ft").unwrap();
        assert!(close(feet, 3.280_839_895_013_123));
    }

    #[test]
    fn kilometres_to_miles() {
        assert!(close(convert_named(1.609_344, "km", "mi").unwrap(), 1.0));
    }

    #[test]
    fn pounds_to_kilograms() {
        assert!(close(convert_named(1.0, "lb", "kg").unwrap(), 0.453_592_37));
    }

    #[test]
    fn temperatures() {
        assert!(close(convert_named(100.0, "C", "F").unwrap(), 212.0));
        assert!(close(convert_named(32.0, "fahrenheit", "celsius").unwrap(), 0.0));
        assert!(close(convert_named(0.0, "K", "C").unwrap(), -273.15));
        assert!(close(convert_named(-40.0, "F", "C").unwrap(), -40.0));
    }

    #[test]
    fn volume_and_data() {
        assert!(close(convert_named(1.0, "gal", "l").unwrap(), 3.785_411_784));
        assert!(close(convert_named(1.0, "MiB", "KiB").unwrap(), 1024.0));
        assert!(close(convert_named(8.0, "bits", "B").unwrap(), 1.0));
    }

    #[test]
    fn symbol_case_matters_before_aliases() {
        assert_eq!(Unit::lookup("MB").unwrap().name, "megabyte");
        assert_eq!(Unit::lookup("Feet").unwrap().symbol, "ft");
        assert_eq!(Unit::lookup(" kg ").unwrap().symbol, "kg");
    }

    #[test]
    fn unknown_unit_errors() {
        assert_eq!(
            Unit::lookup("furlong"),
            Err(UnitError::Unknown("furlong".into()))
        );
    }

    #[test]
    fn cross_category_errors() {
        let err = convert_named(1.0, "kg", "m").unwrap_err();
        assert!(matches!(err, UnitError::Mismatch { .. }));
        assert_eq!(err.to_string(), "cannot convert kg (mass) to m (length)");
    }

    #[test]
    fn every_unit_lookup_by_symbol_returns_itself() {
        for unit in UNITS {
            assert_eq!(Unit::lookup(unit.symbol).unwrap().name, unit.name);
        }
    }

    #[test]
    fn units_in_category() {
        let lengths: Vec<&str> = units_in(Category::Length).map(|u| u.symbol).collect();
        assert!(lengths.contains(&"ft"));
        assert!(!lengths.contains(&"kg"));
    }

    proptest! {
        #[test]
        fn metres_feet_round_trip(x in -1.0e9f64..1.0e9) {
            let feet = convert_named(x, "m", "ft").unwrap();
            let back = convert_named(feet, "ft", "m").unwrap();
            prop_assert!(close(back, x), "{x} -> {feet} -> {back}");
        }

        #[test]
        fn celsius_fahrenheit_round_trip(x in -500.0f64..5000.0) {
            let f = convert_named(x, "C", "F").unwrap();
            let back = convert_named(f, "F", "C").unwrap();
            prop_assert!((back - x).abs() < 1e-9);
        }
    }
}
