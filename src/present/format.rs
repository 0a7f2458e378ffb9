//! Display formatting for counts, currency, shares and densities (en-US).

pub const NOT_AVAILABLE: &str = "N/A";

/// Insert thousands separators into a run of ASCII digits.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 { out.push(',') }
        out.push(ch);
    }
    out
}

/// Fixed-point text with grouped integer part and at most `decimals` fraction
/// digits, trailing zeros dropped.
fn grouped(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac = frac.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && text.bytes().any(|b| matches!(b, b'1'..=b'9')) { out.push('-') }
    out.push_str(&group_digits(int));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// "4,485,414"; up to three fraction digits are kept.
pub fn format_number(value: impl Into<Option<f64>>) -> String {
    match value.into() {
        Some(v) if v.is_finite() => grouped(v, 3),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// "$69,872", rounded to whole dollars.
pub fn format_currency(value: impl Into<Option<f64>>) -> String {
    match value.into() {
        Some(v) if v.is_finite() => {
            let text = grouped(v.round(), 0);
            match text.strip_prefix('-') {
                Some(rest) => format!("-${rest}"),
                None => format!("${text}"),
            }
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// `part / total` as a percentage with one decimal ("23.0%").
pub fn format_percent(part: impl Into<Option<f64>>, total: impl Into<Option<f64>>) -> String {
    match (part.into(), total.into()) {
        (Some(part), Some(total)) if total != 0.0 && (part / total).is_finite() => {
            format!("{:.1}%", part / total * 100.0)
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// "486.3 per sq mi"
pub fn format_density(value: impl Into<Option<f64>>) -> String {
    match value.into() {
        Some(v) if v.is_finite() => format!("{v:.1} per sq mi"),
        _ => NOT_AVAILABLE.to_string(),
    }
}
