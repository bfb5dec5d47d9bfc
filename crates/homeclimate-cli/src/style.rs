//! Visual styling utilities for the CLI.
//!
//! Colors follow the dashboard: zones use their own display color, metric
//! badges are green when optimal and yellow otherwise.

use owo_colors::OwoColorize;

use homeclimate_core::{ComfortLevel, TemperatureZone, Trend};

/// Parse a `#rrggbb` color.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Format a temperature zone label in the zone's color.
pub fn format_zone(zone: TemperatureZone, no_color: bool) -> String {
    let label = format!("[{}]", zone.label());
    if no_color {
        return label;
    }
    match hex_to_rgb(zone.color()) {
        Some((r, g, b)) => format!("{}", label.truecolor(r, g, b).bold()),
        None => label,
    }
}

/// Format a temperature colored by its zone, right-aligned to `width`.
///
/// Padding is applied before coloring so columns line up either way.
pub fn format_temp_colored(
    celsius: f64,
    zone: TemperatureZone,
    width: usize,
    no_color: bool,
) -> String {
    let formatted = format!("{celsius:>width$.1}");
    if no_color {
        return formatted;
    }
    match hex_to_rgb(zone.color()) {
        Some((r, g, b)) => format!("{}", formatted.truecolor(r, g, b)),
        None => formatted,
    }
}

/// Format a "Good"/"Check" badge.
pub fn format_status_badge(label: &str, optimal: bool, no_color: bool) -> String {
    if no_color {
        return format!("[{}]", label);
    }
    if optimal {
        format!("[{}]", label.green().bold())
    } else {
        format!("[{}]", label.yellow().bold())
    }
}

/// Format a comfort score colored by its level.
pub fn format_comfort_colored(score: u8, no_color: bool) -> String {
    let level = ComfortLevel::from_score(score);
    let formatted = format!("{}/100 ({})", score, level);
    if no_color {
        return formatted;
    }
    match level {
        ComfortLevel::Excellent => format!("{}", formatted.green()),
        ComfortLevel::Good => format!("{}", formatted.cyan()),
        ComfortLevel::Fair => format!("{}", formatted.yellow()),
        ComfortLevel::Poor => format!("{}", formatted.red()),
    }
}

/// Get trend indicator for a temperature trend.
pub fn trend_indicator(trend: Trend, no_color: bool) -> &'static str {
    match trend {
        Trend::Stable => "-",
        Trend::Rising if no_color => "^",
        Trend::Falling if no_color => "v",
        _ => trend.arrow(),
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let underline = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, underline)
    } else {
        format!("{}\n{}", title.bold(), underline.dimmed())
    }
}

/// Format a warning line.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("! {}", message)
    } else {
        format!("{} {}", "!".yellow().bold(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#8b5cf6"), Some((0x8b, 0x5c, 0xf6)));
        assert_eq!(hex_to_rgb("#ef4444"), Some((0xef, 0x44, 0x44)));
        assert_eq!(hex_to_rgb("8b5cf6"), None);
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb("#gggggg"), None);
    }

    #[test]
    fn test_every_zone_color_parses() {
        for zone in [
            TemperatureZone::Sleep,
            TemperatureZone::Comfort,
            TemperatureZone::Tolerable,
            TemperatureZone::Alert,
        ] {
            assert!(hex_to_rgb(zone.color()).is_some(), "{:?}", zone);
        }
    }

    #[test]
    fn test_no_color_output_is_plain() {
        assert_eq!(format_zone(TemperatureZone::Sleep, true), "[Sleep]");
        assert_eq!(
            format_temp_colored(21.04, TemperatureZone::Comfort, 0, true),
            "21.0"
        );
        assert_eq!(
            format_temp_colored(21.04, TemperatureZone::Comfort, 6, true),
            "  21.0"
        );
        assert_eq!(format_status_badge("Check", false, true), "[Check]");
        assert_eq!(format_comfort_colored(86, true), "86/100 (Excellent)");
        assert_eq!(format_warning("stale", true), "! stale");
    }

    #[test]
    fn test_colored_output_contains_label() {
        let zone = format_zone(TemperatureZone::Alert, false);
        assert!(zone.contains("Alert"));
        assert!(zone.contains("\x1b["));
    }

    #[test]
    fn test_colored_temperature_is_padded_inside_escape_codes() {
        let colored = format_temp_colored(21.0, TemperatureZone::Comfort, 6, false);
        assert!(colored.contains("\x1b["));
        assert!(colored.contains("  21.0"));
    }

    #[test]
    fn test_trend_indicator() {
        assert_eq!(trend_indicator(Trend::Rising, false), "↑");
        assert_eq!(trend_indicator(Trend::Rising, true), "^");
        assert_eq!(trend_indicator(Trend::Falling, true), "v");
        assert_eq!(trend_indicator(Trend::Stable, false), "-");
    }

    #[test]
    fn test_format_title() {
        assert_eq!(format_title("Home", true), "Home\n━━━━");
    }
}
