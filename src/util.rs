// Numeric coercion and display formatting helpers.
//
// Everything that touches raw cell text or produces display strings lives
// here so the aggregation code can work with plain `f64` values.
use crate::types::Scalar;
use num_format::{Locale, ToFormattedString};

/// Rendered in place of any value that is missing or not finite.
pub const NO_VALUE: &str = "—";

/// Coerce a cell into a number.
///
/// - `Null` and empty text yield `None`.
/// - Numbers pass through untouched, including non-finite ones.
/// - Text goes through [`parse_number_str`].
///
/// Callers decide what to do with non-finite results; nothing is rounded here.
pub fn parse_number(v: &Scalar) -> Option<f64> {
    match v {
        Scalar::Null => None,
        Scalar::Number(n) => Some(*n),
        Scalar::Text(s) => parse_number_str(s),
    }
}

/// Parse decorated numeric text such as `"$1,234.50"`, `" 25 %"` or `"1 000"`.
///
/// Currency and percent signs, commas and every whitespace character are
/// removed before parsing. Only the empty string is rejected outright; text
/// that is empty once stripped (`"$"`, `" "`) reads as zero.
pub fn parse_number_str(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned.parse::<f64>().ok()
}

/// Header normalization used for alias matching: lowercase, no whitespace.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// Digits past the requested precision that are inspected when rounding. A
// finite f64 never sits closer than this to a rounding midpoint unless it is
// exactly on it.
const GUARD_DIGITS: usize = 30;

// Integer and fraction digits of a non-negative value rounded to `decimals`
// places, with midpoints rounded away from zero.
fn round_half_up(abs_n: f64, decimals: usize) -> (String, String) {
    let wide = format!("{:.*}", decimals + GUARD_DIGITS, abs_n);
    let (int_part, frac_part) = wide.split_once('.').unwrap_or((wide.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(decimals))
        .collect();
    if frac_part.as_bytes().get(decimals).is_some_and(|d| *d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }
    let split = digits.len() - decimals;
    let int_digits = digits[..split].iter().map(|&b| b as char).collect();
    let frac_digits = digits[split..].iter().map(|&b| b as char).collect();
    (int_digits, frac_digits)
}

// Thousands grouping of a plain digit string, any length.
fn group_digits(int_digits: &str) -> String {
    let sep = Locale::en.separator();
    let len = int_digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in int_digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

// Fixed-point rendering of a non-negative value with `,` thousands groups.
fn group_fixed(abs_n: f64, decimals: usize) -> String {
    let (int_digits, frac_digits) = round_half_up(abs_n, decimals);
    let mut res = group_digits(&int_digits);
    if decimals > 0 {
        res.push('.');
        res.push_str(&frac_digits);
    }
    res
}

/// Format a value with a fixed number of decimals and `,` grouping
/// (e.g. `1,234,567.89`). Negative values get a leading `-`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let body = group_fixed(n.abs(), decimals);
    if n < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

fn finite<T: Into<Option<f64>>>(x: T) -> Option<f64> {
    x.into().filter(|n| n.is_finite())
}

fn money(n: f64, decimals: usize) -> String {
    let body = group_fixed(n.abs(), decimals);
    if n < 0.0 {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// Whole-dollar currency, e.g. `$1,235`.
pub fn fmt_money<T: Into<Option<f64>>>(x: T) -> String {
    finite(x).map_or_else(|| NO_VALUE.to_string(), |n| money(n, 0))
}

/// Currency with cents, e.g. `$1,234.50`.
pub fn fmt_money2<T: Into<Option<f64>>>(x: T) -> String {
    finite(x).map_or_else(|| NO_VALUE.to_string(), |n| money(n, 2))
}

/// Grouped integer without a currency sign, e.g. `1,235`.
pub fn fmt_number<T: Into<Option<f64>>>(x: T) -> String {
    finite(x).map_or_else(|| NO_VALUE.to_string(), |n| format_number(n, 0))
}

/// Two fixed decimals followed by a literal `%`; no grouping.
pub fn fmt_pct<T: Into<Option<f64>>>(x: T) -> String {
    finite(x).map_or_else(
        || NO_VALUE.to_string(),
        |n| {
            let sign = if n < 0.0 { "-" } else { "" };
            let (int_digits, frac_digits) = round_half_up(n.abs(), 2);
            format!("{}{}.{}%", sign, int_digits, frac_digits)
        },
    )
}
