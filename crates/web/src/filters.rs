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

/// Renders a rating as five filled/empty stars, rounded to the nearest star.
///
/// Usage in templates: `{{ vendor.rating|stars }}`
#[askama::filter_fn]
pub fn stars(rating: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(star_string(&rating.to_string()))
}

/// Formats a distance in miles with one decimal.
///
/// Usage in templates: `{{ distance|miles }}`
#[askama::filter_fn]
pub fn miles(distance: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = distance.to_string();
    Ok(match text.parse::<f64>() {
        Ok(d) if d.is_finite() => format!("{d:.1} mi"),
        _ => text,
    })
}

fn star_string(rating: &str) -> String {
    let rating = rating.parse::<f64>().unwrap_or(0.0);
    let rating = if rating.is_finite() { rating.clamp(0.0, 5.0) } else { 0.0 };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = rating.round() as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_string_rounds_and_clamps() {
        assert_eq!(star_string("4.6"), "★★★★★");
        assert_eq!(star_string("4.2"), "★★★★☆");
        assert_eq!(star_string("0"), "☆☆☆☆☆");
        assert_eq!(star_string("9"), "★★★★★");
        assert_eq!(star_string("NaN"), "☆☆☆☆☆");
        assert_eq!(star_string("junk"), "☆☆☆☆☆");
    }
}
