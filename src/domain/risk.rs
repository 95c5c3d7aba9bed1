//! Position sizing and money formatting.

/// Fraction of the balance used when no stop distance is known.
const FALLBACK_SIZE_FRACTION: f64 = 0.01;

/// Size a position so that hitting the stop loses `risk_percent` of `balance`.
pub fn position_size(balance: f64, risk_percent: f64, stop_loss_distance: f64) -> f64 {
    if stop_loss_distance <= 0.0 {
        return balance * FALLBACK_SIZE_FRACTION;
    }
    balance * (risk_percent / 100.0) / stop_loss_distance
}

/// Format as dollars with thousands separators, e.g. `$12,345.68`.
pub fn format_currency(amount: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    // -0.00 rounds to zero and is shown unsigned
    let negative = amount < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}${grouped}.{f}"),
        None => format!("{sign}${grouped}"),
    }
}
