//! Display formatting for money amounts.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

/// Render an amount with two decimals and `,` thousands grouping.
///
/// `1234.5` becomes `"1,234.50"`; negative amounts keep a leading `-`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}
