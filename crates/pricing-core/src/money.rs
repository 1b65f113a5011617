//! Currency Formatting
//!
//! en-US currency display with exactly two fraction digits. Amounts arrive
//! in minor units and are converted with `Decimal`, never floating point.

use rust_decimal::Decimal;

/// Format a minor-unit amount, e.g. `(1999, "usd")` → `$19.99`
pub fn format_currency(amount_minor: i64, currency: &str) -> String {
    format_decimal(Decimal::new(amount_minor, 2), currency)
}

/// Format a major-unit amount with en-US grouping and symbol placement
pub fn format_decimal(amount: Decimal, currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = group_thousands(&format!("{:.2}", rounded.abs()));

    match currency_symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{digits}"),
        // en-US shows the ISO code followed by a no-break space
        None => format!("{sign}{code}\u{a0}{digits}"),
    }
}

/// Symbol en-US uses for the given ISO 4217 code
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "INR" => "₹",
        "KRW" => "₩",
        "ILS" => "₪",
        "VND" => "₫",
        "PHP" => "₱",
        "CAD" => "CA$",
        "AUD" => "A$",
        "NZD" => "NZ$",
        "HKD" => "HK$",
        "MXN" => "MX$",
        "BRL" => "R$",
        "TWD" => "NT$",
        _ => return None,
    };
    Some(symbol)
}

fn group_thousands(plain: &str) -> String {
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    grouped
}
