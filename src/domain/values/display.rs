//! Display normalization for market numbers.
//!
//! Everything here is total: any `f64` (including NaN and infinities) produces
//! a string, and the same input always produces the same output. Formatting
//! follows en-US conventions: `,` grouping, `.` decimal point, `$` prefix.

/// Rendered in place of a number that cannot be shown (NaN, ±∞).
pub const NOT_AVAILABLE: &str = "N/A";

const COMPACT_SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// USD with exactly two fractional digits: `1234.5` → `$1,234.50`.
/// Ties round half away from zero.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let rounded = (value.abs() * 100.0).round() / 100.0;
    let fixed = format!("{rounded:.2}");
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && rounded > 0.0 { "-" } else { "" };
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Short compact notation: `28_500` → `29K`, `1_234` → `1.2K`, `28_500_000_000` → `29B`.
///
/// Scaled values under 100 keep two significant digits, larger ones round to
/// an integer. A value that rounds up to 1000 moves to the next suffix.
pub fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let magnitude = value.abs();
    let mut tier = 0;
    while tier + 1 < COMPACT_SUFFIXES.len() && magnitude >= 1000f64.powi(tier as i32 + 1) {
        tier += 1;
    }
    let (mut scaled, mut decimals) = round_compact(magnitude / 1000f64.powi(tier as i32));
    if scaled >= 1000.0 && tier + 1 < COMPACT_SUFFIXES.len() {
        tier += 1;
        (scaled, decimals) = round_compact(scaled / 1000.0);
    }

    let digits = trim_fraction(format!("{scaled:.decimals$}"));
    let sign = if value < 0.0 && scaled > 0.0 { "-" } else { "" };
    format!("{sign}{digits}{}", COMPACT_SUFFIXES[tier])
}

/// Signed percentage with two decimals: `2.3` → `+2.30%`, `-1.2` → `-1.20%`.
pub fn format_change(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0.00%".to_string();
    }
    format!("{rounded:+.2}%")
}

/// Resolve a possibly-absent provider change field to a definite percentage.
/// Absent or non-finite values yield `fallback`; everything else passes through.
pub fn normalize_change(raw: Option<f64>, fallback: f64) -> f64 {
    match raw {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    }
}

/// Round to the compact precision. Returns the rounded value and the number
/// of fraction digits needed to print it.
fn round_compact(magnitude: f64) -> (f64, usize) {
    if magnitude == 0.0 || magnitude >= 10.0 {
        return (magnitude.round(), 0);
    }
    // Two significant digits below 10.
    let decimals = (1 - magnitude.log10().floor() as i32).max(0) as usize;
    let scale = 10f64.powi(decimals as i32);
    ((magnitude * scale).round() / scale, decimals)
}

fn trim_fraction(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
