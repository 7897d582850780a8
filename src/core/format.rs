/// Compact suffixes round halves away from zero; whole dollars round halves
/// up, so `-2.5` renders as `-$2`.
pub fn format_currency(amount: f64, compact: bool) -> String {
    if compact {
        let magnitude = amount.abs();
        let sign = if amount < 0.0 { "-" } else { "" };
        if magnitude >= 1_000_000.0 {
            let millions = (magnitude / 1_000_000.0 * 10.0).round() / 10.0;
            return format!("{sign}${millions:.1}M");
        }
        if magnitude >= 1_000.0 {
            let thousands = (magnitude / 1_000.0).round();
            return format!("{sign}${thousands:.0}K");
        }
    }

    let rounded = (amount + 0.5).floor();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs() as u64))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn risk_profile(stocks_percent: u32) -> &'static str {
    match stocks_percent {
        80.. => "Aggressive",
        60..=79 => "Growth",
        40..=59 => "Moderate",
        20..=39 => "Conservative",
        _ => "Very Conservative",
    }
}
