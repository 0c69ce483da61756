//! Text conversions at the edges of the projection: coercing form text into
//! numbers and rendering the countdown and budget cards.

const MAX_FRACTION_DIGITS: usize = 3;

pub const CURRENCY_SYMBOL: &str = "¥";

/// Renders a number with `,` thousands separators and at most three
/// fraction digits. Non-finite values render as `NaN`, `∞` or `-∞`.
pub fn group_thousands(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let symbol = if value > 0.0 { "∞" } else { "-∞" };
        return symbol.to_string();
    }

    let rounded = round_half_up(&value.abs().to_string(), MAX_FRACTION_DIGITS);
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Rounds a plain decimal string (no sign, no exponent) half away from zero
/// to `places` fraction digits. Works on the shortest decimal form rather
/// than the exact binary value.
fn round_half_up(decimal: &str, places: usize) -> String {
    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal, ""));
    if frac_part.len() <= places {
        return decimal.to_string();
    }

    let mut kept: Vec<char> = int_part.chars().chain(frac_part[..places].chars()).collect();
    if frac_part.as_bytes()[places] >= b'5' {
        let mut carry = true;
        for digit in kept.iter_mut().rev() {
            if *digit == '9' {
                *digit = '0';
            } else {
                *digit = char::from(*digit as u8 + 1);
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, '1');
        }
    }

    let (int_digits, frac_digits) = kept.split_at(kept.len() - places);
    format!(
        "{}.{}",
        int_digits.iter().collect::<String>(),
        frac_digits.iter().collect::<String>()
    )
}

pub fn format_countdown(remaining_days: f64) -> String {
    group_thousands(remaining_days)
}

pub fn format_daily_budget(daily_budget: f64) -> String {
    format!("{CURRENCY_SYMBOL}{} / DAY", group_thousands(daily_budget))
}

/// Coerces raw form text into a number.
///
/// Blank text is zero. `Infinity` (optionally signed) and `0x`/`0o`/`0b`
/// integer literals are accepted alongside plain decimals; everything else
/// becomes NaN and is left to propagate through the projection.
pub fn coerce_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }

    // The float parser also takes `inf` and `nan` spellings, which are not
    // numbers on a form.
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.contains("inf") || lowered.contains("nan") {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix_literal(text: &str) -> Option<f64> {
    let lowered = text.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lowered.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lowered.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lowered.strip_prefix("0b") {
        (2, rest)
    } else {
        return None;
    };

    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Some(f64::NAN);
    }
    Some(
        u128::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN),
    )
}
