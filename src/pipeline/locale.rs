//! Number patterns and locale-aware rendering
//!
//! Patterns follow the familiar spreadsheet shape: literal text before and
//! after a numeric core made of `#`, `0`, `,` and `.`. `,` in the core turns
//! on digit grouping; zeros after `.` are required decimals and hashes are
//! optional ones. The separators actually written come from the locale.

use crate::config::LocaleSettings;

/// Parsed number pattern such as `$#,##0.00` or `#,##0.## kg`
#[derive(Debug, Clone, PartialEq)]
pub struct NumberPattern {
    prefix: String,
    suffix: String,
    grouping: bool,
    min_decimals: usize,
    max_decimals: usize,
}

impl NumberPattern {
    /// Parse a pattern; text without a numeric core becomes a prefix
    pub fn parse(pattern: &str) -> Self {
        let is_core = |c: char| matches!(c, '#' | '0' | ',' | '.');
        let Some(start) = pattern.find(['#', '0']) else {
            return Self {
                prefix: pattern.to_string(),
                suffix: String::new(),
                grouping: true,
                min_decimals: 0,
                max_decimals: 2,
            };
        };

        // The core starts at the first digit placeholder. A `.` or `,`
        // before it belongs to the prefix, as in `Rs. #,##0.00`.
        let run = pattern[start..]
            .find(|c: char| !is_core(c))
            .map_or(pattern.len(), |offset| start + offset);
        let end = start + pattern[start..run].trim_end_matches([',', '.']).len() - 1;

        let core = &pattern[start..=end];
        let (integer, fraction) = match core.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (core, ""),
        };

        Self {
            prefix: pattern[..start].to_string(),
            suffix: pattern[end + 1..].to_string(),
            grouping: integer.contains(','),
            min_decimals: fraction.chars().filter(|&c| c == '0').count(),
            max_decimals: fraction.chars().filter(|&c| c == '0' || c == '#').count(),
        }
    }

    /// Render a value with the locale's separators
    ///
    /// The sign goes in front of the prefix: `-$5.25`.
    pub fn format(&self, value: f64, locale: &LocaleSettings) -> String {
        let rounded = format!("{:.*}", self.max_decimals, value.abs());
        let (integer, fraction) = match rounded.split_once('.') {
            Some((integer, fraction)) => (integer.to_string(), fraction.to_string()),
            None => (rounded.clone(), String::new()),
        };

        let mut fraction = fraction;
        while fraction.len() > self.min_decimals && fraction.ends_with('0') {
            fraction.pop();
        }

        let integer = if self.grouping {
            group_digits(&integer, locale.thousands_separator)
        } else {
            integer
        };

        let is_zero = rounded.chars().all(|c| c == '0' || c == '.');
        let sign = if value < 0.0 && !is_zero { "-" } else { "" };

        if fraction.is_empty() {
            format!("{}{}{}{}", sign, self.prefix, integer, self.suffix)
        } else {
            format!(
                "{}{}{}{}{}{}",
                sign, self.prefix, integer, locale.decimal_separator, fraction, self.suffix
            )
        }
    }
}

/// Render a ratio as a percentage with two decimals: `0.125` -> `12.50%`
pub fn format_percentage(ratio: f64, locale: &LocaleSettings) -> String {
    let text = format!("{:.2}%", ratio * 100.0);
    if locale.decimal_separator == '.' {
        text
    } else {
        text.replace('.', &locale.decimal_separator.to_string())
    }
}

/// Recover a number from a formatted string
///
/// Everything except digits, `-` and the locale decimal separator is
/// stripped, so `-$1,234.50` reads as -1234.5 and `12.50%` as 12.5.
pub fn parse_formatted(text: &str, locale: &LocaleSettings) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter_map(|c| {
            if c.is_ascii_digit() || c == '-' {
                Some(c)
            } else if c == locale.decimal_separator {
                Some('.')
            } else {
                None
            }
        })
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}
