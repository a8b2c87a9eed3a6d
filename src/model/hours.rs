//! Lenient parsing of hour values.
//!
//! Hour cells arrive as numbers, as text with a period decimal separator (`7.5`) or with a comma
//! decimal separator (`7,5`). Malformed cells count as zero hours rather than failing the pass.

use crate::model::sheet::Cell;

/// Parses an hours cell. The first comma is read as a decimal separator and the longest numeric
/// prefix of the text is used, so `"7,5"` and `"7.5 h"` both give `7.5`. Blank, missing or
/// unparseable cells give `0.0`.
pub fn parse_hours(cell: Option<&Cell>) -> f64 {
    match cell {
        None | Some(Cell::Empty) => 0.0,
        Some(Cell::Number(n)) if n.is_finite() => *n,
        Some(Cell::Number(_)) => 0.0,
        Some(other) => {
            let text = other.to_text().replacen(',', ".", 1);
            parse_leading_float(&text).unwrap_or(0.0)
        }
    }
}

/// Parses the longest prefix of `s` (after leading whitespace) that forms a decimal number with an
/// optional sign, fraction and exponent.
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_digits = digits_from(end);
    end += int_digits;
    let mut digits = int_digits;

    if bytes.get(end) == Some(&b'.') {
        let frac_digits = digits_from(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
        digits += frac_digits;
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits_from(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
