//! Price text parsing that respects each region's separator convention.

use crate::regions::PriceFormat;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

/// Characters that may group thousands in addition to `.` and `,`
/// (space, no-break space, narrow no-break space, apostrophe).
const GROUPING_CHARS: [char; 5] = [' ', '\u{a0}', '\u{202f}', '\'', '’'];

/// Parses the first numeric run of a price string.
///
/// Currency symbols, codes and surrounding text are ignored. Returns `None`
/// when the text contains no digits or the run cannot be represented.
/// Never panics.
pub fn parse_price(text: &str, format: PriceFormat) -> Option<Decimal> {
    let run = first_numeric_run(text)?;
    let normalized = normalize_run(&run, format)?;
    trace!("Price text {:?} -> {}", text, normalized);
    Decimal::from_str(&normalized).ok()
}

/// Extracts the first run of digits joined by separators.
///
/// `.` and `,` continue a run when followed by a digit. Space-like and
/// apostrophe groupers continue it only before a group of exactly three digits.
fn first_numeric_run(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;

    let digit_at = |i: usize| chars.get(i).is_some_and(|c| c.is_ascii_digit());

    let mut run = String::new();
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            run.push(c);
        } else if (c == '.' || c == ',') && digit_at(i + 1) {
            run.push(c);
        } else if GROUPING_CHARS.contains(&c)
            && digit_at(i + 1)
            && digit_at(i + 2)
            && digit_at(i + 3)
            && !digit_at(i + 4)
        {
            // grouping char carries no value
        } else {
            break;
        }
        i += 1;
    }

    Some(run)
}

/// Rewrites a run of digits, `.` and `,` into `Decimal` syntax.
fn normalize_run(run: &str, format: PriceFormat) -> Option<String> {
    let dots = run.matches('.').count();
    let commas = run.matches(',').count();

    let decimal = match (dots, commas) {
        (0, 0) => return Some(run.to_string()),
        // Both present: whichever comes last separates the fraction
        (_, _) if dots > 0 && commas > 0 => {
            let last_dot = run.rfind('.')?;
            let last_comma = run.rfind(',')?;
            if last_dot > last_comma {
                '.'
            } else {
                ','
            }
        }
        _ => {
            let sep = if dots > 0 { '.' } else { ',' };
            let count = dots + commas;
            if count > 1 {
                // Repeated separator can only be grouping
                return Some(run.replace(sep, ""));
            }
            let fraction_len = run.rsplit(sep).next().map_or(0, str::len);
            if sep == format.decimal_separator() || fraction_len != 3 {
                sep
            } else {
                return Some(run.replace(sep, ""));
            }
        }
    };

    let group = if decimal == '.' { ',' } else { '.' };
    let mut cleaned = run.replace(group, "");
    if cleaned.matches(decimal).count() > 1 {
        cleaned = cleaned.replace(decimal, "");
    }
    Some(cleaned.replace(decimal, "."))
}
