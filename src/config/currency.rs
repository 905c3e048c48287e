use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub label: &'static str,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

const fn currency(code: &'static str, symbol: &'static str, label: &'static str) -> Currency {
    Currency {
        code,
        symbol,
        label,
    }
}

/// Currencies offered in the selector, default first.
pub const CURRENCIES: &[Currency] = &[
    currency("USD", "$", "US Dollar ($)"),
    currency("EUR", "€", "Euro (€)"),
    currency("GBP", "£", "British Pound (£)"),
    currency("NGN", "₦", "Naira (₦)"),
    currency("CAD", "$", "Canadian Dollar ($)"),
    currency("AUD", "$", "Australian Dollar ($)"),
    currency("JPY", "¥", "Japanese Yen (¥)"),
    currency("CNY", "¥", "Chinese Yuan (¥)"),
    currency("INR", "₹", "Indian Rupee (₹)"),
    currency("ZAR", "R", "South African Rand (R)"),
    currency("BRL", "R$", "Brazilian Real (R$)"),
    currency("MXN", "$", "Mexican Peso ($)"),
    currency("CHF", "CHF", "Swiss Franc (CHF)"),
    currency("SEK", "kr", "Swedish Krona (kr)"),
    currency("NOK", "kr", "Norwegian Krone (kr)"),
    currency("DKK", "kr", "Danish Krone (kr)"),
    currency("RUB", "₽", "Russian Ruble (₽)"),
    currency("KRW", "₩", "South Korean Won (₩)"),
    currency("SGD", "$", "Singapore Dollar ($)"),
    currency("HKD", "$", "Hong Kong Dollar ($)"),
];

pub fn default_currency() -> &'static Currency {
    &CURRENCIES[0]
}

/// Look up a currency by ISO code, ignoring case.
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find_currency("eur").map(|c| c.symbol), Some("€"));
        assert_eq!(find_currency(" BRL ").map(|c| c.symbol), Some("R$"));
        assert!(find_currency("XYZ").is_none());
        assert_eq!(default_currency().code, "USD");
    }
}
