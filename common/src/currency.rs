/// Digit group separator used by ru-RU number formatting (narrow no-break space).
const GROUP_SEPARATOR: char = '\u{202F}';

/// Currency sign appended to every price.
pub const ROUBLE_SIGN: &str = "₽";

/// Format a whole-rouble amount the way the storefront displays prices,
/// e.g. `6500` → `"6 500 ₽"`.
pub fn format_price(amount: u64) -> String {
    format!("{} {ROUBLE_SIGN}", group_digits(amount))
}

/// Group digits in threes from the right.
pub fn group_digits(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}
