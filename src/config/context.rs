use super::currency::{default_currency, find_currency, Currency};
use crate::error::{InvoiceError, Result};

/// Per-invocation settings shared by every command: the selected currency
/// and the signed-in user, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct AppContext {
    pub currency: &'static Currency,
    pub user_id: Option<String>,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            user_id: None,
        }
    }
}

impl AppContext {
    pub fn new(currency_code: &str, user_id: Option<String>) -> Result<Self> {
        let currency = find_currency(currency_code)
            .ok_or_else(|| InvoiceError::UnknownCurrency(currency_code.to_string()))?;
        let user_id = user_id.filter(|id| !id.trim().is_empty());
        Ok(Self { currency, user_id })
    }

    pub fn with_currency(mut self, code: &str) -> Result<Self> {
        self.currency =
            find_currency(code).ok_or_else(|| InvoiceError::UnknownCurrency(code.to_string()))?;
        Ok(self)
    }

    pub fn require_user(&self) -> Result<&str> {
        self.user_id.as_deref().ok_or(InvoiceError::NotSignedIn)
    }

    /// Format an amount with the currency symbol, two decimals.
    pub fn money(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency.symbol, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_currency_is_rejected() {
        let err = AppContext::new("ZZZ", None).unwrap_err();
        assert!(matches!(err, InvoiceError::UnknownCurrency(code) if code == "ZZZ"));
    }

    #[test]
    fn blank_user_counts_as_signed_out() {
        let ctx = AppContext::new("usd", Some("  ".into())).unwrap();
        assert!(matches!(ctx.require_user(), Err(InvoiceError::NotSignedIn)));

        let ctx = AppContext::new("gbp", Some("u-1".into())).unwrap();
        assert_eq!(ctx.require_user().unwrap(), "u-1");
        assert_eq!(ctx.money(12.5), "£12.50");
    }
}
