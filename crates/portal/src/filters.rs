//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Format a numeric value as Brazilian currency.
///
/// Usage in templates: `{{ payment.value|brl }}`
#[askama::filter_fn]
pub fn brl(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    let formatted = raw
        .parse::<f64>()
        .map_or(raw, |amount| format!("{amount:.2}").replace('.', ","));
    Ok(format!("R$ {formatted}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    #[test]
    fn brl_formats_two_decimals_with_comma() {
        // Filter functions are exercised through their generated modules in
        // templates; test the formatting logic directly.
        let raw = "159.9".parse::<f64>().unwrap();
        assert_eq!(format!("{raw:.2}").replace('.', ","), "159,90");
    }
}
