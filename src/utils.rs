//! Small numeric helpers shared by the report stages.

/// Round a value to the given number of decimal digits.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Format a metric for CSV output, rounded to `digits` decimals.
///
/// Uses the shortest decimal representation so identical inputs always
/// produce identical output bytes.
pub fn format_metric(value: f64, digits: u32) -> String {
    format!("{}", round_to(value, digits))
}
