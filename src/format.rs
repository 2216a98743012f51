//! @acp:module "Number Formatting"
//! @acp:summary "Display helpers shared by reports and documents"
//! @acp:domain subsidy
//! @acp:layer output

/// Group digits with commas: `1234567` → `"1,234,567"`
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Percentage with explicit sign and one decimal: `+12.3`
pub fn signed_percent(rate: f64) -> String {
    format!("{:+.1}", rate)
}
