use chrono::Datelike;

use crate::store::PriceValue;

/// French month names used on printed invoices, indexed by month - 1.
pub const MONTH_NAMES: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Lenient amount coercion: keep the ASCII digits, drop everything else.
///
/// `"1 200 Ar"` -> 1200, `""` -> 0, `"gratuit"` -> 0. Decimal separators and
/// signs are discarded too; the smallest currency unit is atomic. Total
/// function, used for every money computation in the crate.
pub fn coerce_digits(value: &str) -> i64 {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Coerce a stored price (number or string) to whole ariary.
///
/// Numbers go through their display form first so the rule stays uniform:
/// `2000.5` -> `"2000.5"` -> 20005, same as the string `"2000.5"` would.
pub fn coerce_amount(value: &PriceValue) -> i64 {
    match value {
        PriceValue::Number(n) => coerce_digits(&n.to_string()),
        PriceValue::Text(s) => coerce_digits(s),
    }
}

/// Group digits in threes with an ordinary space: 1234567 -> "1 234 567".
pub fn group_digits(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format an amount for display: grouped digits plus the currency suffix.
///
/// Plain U+0020 separators only; locale formatters emit non-breaking spaces
/// that break downstream text matching, so grouping is done by hand here.
pub fn format_mga(value: i64) -> String {
    format!("{} MGA", group_digits(value))
}

/// Render an ISO `YYYY-MM-DD` date as "<day> <month> <year>" in French.
/// Anything unparsable (including the empty string) renders as "".
pub fn format_long_date(iso: &str) -> String {
    match chrono::NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(d) => format!("{} {} {}", d.day(), MONTH_NAMES[d.month0() as usize], d.year()),
        Err(_) => String::new(),
    }
}
