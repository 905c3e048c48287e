use serde::{Deserialize, Serialize};
use std::fmt;

use super::item::{parse_amount, LineItem};

/// A tax or discount, either a share of the subtotal or a flat amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Adjustment {
    Percent(f64),
    Fixed(f64),
}

impl Default for Adjustment {
    fn default() -> Self {
        Adjustment::Percent(0.0)
    }
}

impl Adjustment {
    /// Parse entered text for this kind of adjustment. Invalid input is 0 and
    /// percentages are capped at 100.
    pub fn parse_percent(input: &str) -> Self {
        Adjustment::Percent(parse_amount(input).min(100.0))
    }

    pub fn parse_fixed(input: &str) -> Self {
        Adjustment::Fixed(parse_amount(input))
    }

    /// Same kind, new value from user input.
    pub fn with_input(self, input: &str) -> Self {
        match self {
            Adjustment::Percent(_) => Self::parse_percent(input),
            Adjustment::Fixed(_) => Self::parse_fixed(input),
        }
    }

    /// Flip between percent and fixed. The value starts over at 0.
    pub fn switch_kind(self) -> Self {
        match self {
            Adjustment::Percent(_) => Adjustment::Fixed(0.0),
            Adjustment::Fixed(_) => Adjustment::Percent(0.0),
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Adjustment::Percent(v) | Adjustment::Fixed(v) => v,
        }
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, Adjustment::Percent(_))
    }

    /// Money amount this adjustment represents against `subtotal`.
    pub fn amount(&self, subtotal: f64) -> f64 {
        match *self {
            Adjustment::Percent(p) => subtotal * (p / 100.0),
            Adjustment::Fixed(v) => v,
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::Percent(p) => write!(f, "{p}%"),
            Adjustment::Fixed(v) => write!(f, "{v:.2} flat"),
        }
    }
}

/// Values a [`Toggle`] can hold.
pub trait Zeroed: Clone {
    fn zeroed(&self) -> Self;
}

impl Zeroed for f64 {
    fn zeroed(&self) -> Self {
        0.0
    }
}

impl Zeroed for Adjustment {
    fn zeroed(&self) -> Self {
        match self {
            Adjustment::Percent(_) => Adjustment::Percent(0.0),
            Adjustment::Fixed(_) => Adjustment::Fixed(0.0),
        }
    }
}

/// An adjustment that can be switched off. Switching off remembers the value
/// and zeroes it; switching back on restores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toggle<T> {
    pub enabled: bool,
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remembered: Option<T>,
}

impl<T: Default> Default for Toggle<T> {
    fn default() -> Self {
        Self {
            enabled: false,
            value: T::default(),
            remembered: None,
        }
    }
}

impl<T: Zeroed> Toggle<T> {
    pub fn enabled(value: T) -> Self {
        Self {
            enabled: true,
            value,
            remembered: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        if enabled {
            if let Some(prev) = self.remembered.take() {
                self.value = prev;
            }
        } else {
            self.remembered = Some(self.value.clone());
            self.value = self.value.zeroed();
        }
        self.enabled = enabled;
    }

    /// The value, if the adjustment currently applies.
    pub fn active(&self) -> Option<&T> {
        self.enabled.then_some(&self.value)
    }
}

/// Tax, discount and shipping settings for one invoice
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Adjustments {
    #[serde(default)]
    pub tax: Toggle<Adjustment>,
    #[serde(default)]
    pub discount: Toggle<Adjustment>,
    #[serde(default)]
    pub shipping: Toggle<f64>,
}

impl Adjustments {
    /// Raw tax figure as the backend expects it (`tax_percent`).
    pub fn tax_value(&self) -> f64 {
        self.tax.active().map(Adjustment::value).unwrap_or(0.0)
    }

    /// Raw discount figure (`discount_percent`).
    pub fn discount_value(&self) -> f64 {
        self.discount.active().map(Adjustment::value).unwrap_or(0.0)
    }

    pub fn shipping_value(&self) -> f64 {
        self.shipping.active().copied().unwrap_or(0.0)
    }
}

/// Money figures derived from the line items and adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub shipping_amount: f64,
    pub total: f64,
}

impl InvoiceTotals {
    pub fn compute<'a, I>(items: I, adjustments: &Adjustments) -> Self
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        let subtotal: f64 = items.into_iter().map(LineItem::amount).sum();
        let tax_amount = adjustments
            .tax
            .active()
            .map(|a| a.amount(subtotal))
            .unwrap_or(0.0);
        let discount_amount = adjustments
            .discount
            .active()
            .map(|a| a.amount(subtotal))
            .unwrap_or(0.0);
        let shipping_amount = adjustments.shipping_value();

        Self {
            subtotal,
            tax_amount,
            discount_amount,
            shipping_amount,
            total: subtotal + tax_amount - discount_amount + shipping_amount,
        }
    }
}
