use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use super::item::{LineItem, LineItems};
use super::totals::{Adjustment, Adjustments, InvoiceTotals, Toggle};
use crate::config::AppContext;
use crate::error::{InvoiceError, Result};

pub const MISSING_PARTIES: &str = "Fill \"From\" and \"To\" fields.";
pub const NO_VALID_ITEMS: &str = "Add at least one valid item.";

pub const LOGO_UPLOADED: &str = "Logo uploaded successfully!";
pub const LOGO_LOCAL_ONLY: &str = "Logo preview only (upload failed)";

/// Everything the user has entered for one invoice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceForm {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub issued_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_details: String,
    #[serde(default)]
    pub payment_instructions: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Logo kept for local preview when the upload did not go through.
    #[serde(default)]
    pub logo_file: Option<PathBuf>,
    #[serde(default)]
    pub logo_status: String,
    /// Backend id once the invoice has been saved or loaded.
    #[serde(default)]
    pub saved_id: Option<String>,
    #[serde(default)]
    pub items: LineItems,
    #[serde(default)]
    pub adjustments: Adjustments,
}

/// A line item as sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadItem {
    pub name: String,
    pub description: String,
    pub quantity: f64,
    pub unit_cost: f64,
}

impl From<&LineItem> for PayloadItem {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone().unwrap_or_default(),
            quantity: item.quantity,
            unit_cost: item.unit_cost,
        }
    }
}

/// Request body for generate and preview calls
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePayload {
    pub from: String,
    pub to: String,
    pub items: Vec<PayloadItem>,
    pub tax_percent: f64,
    pub discount_percent: f64,
    pub payment_details: String,
    pub payment_instructions: String,
    pub logo_url: Option<String>,
    pub invoice_number: String,
    pub issued_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    #[default]
    Percent,
    Fixed,
}

impl AdjustmentKind {
    fn of(adjustment: &Adjustment) -> Self {
        if adjustment.is_percent() {
            AdjustmentKind::Percent
        } else {
            AdjustmentKind::Fixed
        }
    }

    fn with_value(self, value: f64) -> Adjustment {
        match self {
            AdjustmentKind::Percent => Adjustment::Percent(value),
            AdjustmentKind::Fixed => Adjustment::Fixed(value),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Accepts a date, an empty string or null.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

/// Full form state as the backend stores it under an invoice's `data` key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceData {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub issued_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_details: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub tax_percent: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub shipping_amount: f64,
    #[serde(default)]
    pub tax_type: AdjustmentKind,
    #[serde(default)]
    pub discount_type: AdjustmentKind,
    #[serde(default = "default_true")]
    pub show_tax: bool,
    #[serde(default)]
    pub show_discount: bool,
    #[serde(default = "default_true")]
    pub show_shipping: bool,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default, skip_deserializing)]
    pub currency: String,
    #[serde(default, skip_deserializing)]
    pub currency_symbol: String,
    #[serde(default, skip_deserializing)]
    pub currency_label: String,
}

/// Body of `POST /api/invoices`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveInvoiceRequest {
    pub user_id: String,
    pub client_id: Option<String>,
    pub data: InvoiceData,
    pub issued_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: &'static str,
    pub currency: String,
    pub currency_symbol: String,
    pub currency_label: String,
}

/// An invoice as listed by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedInvoice {
    pub id: String,
    #[serde(default)]
    pub data: InvoiceData,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl InvoiceForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(&self.items, &self.adjustments)
    }

    /// Set the issue date, filling in the due date from `due_days` if none
    /// has been chosen yet.
    pub fn set_issued_date(&mut self, date: NaiveDate, due_days: u32) {
        self.issued_date = Some(date);
        if self.due_date.is_none() && due_days > 0 {
            self.due_date = date.checked_add_days(chrono::Days::new(due_days as u64));
        }
    }

    /// Record the outcome of a logo upload. Without a hosted URL the file is
    /// still kept for local preview.
    pub fn set_logo(&mut self, file: Option<PathBuf>, url: Option<String>) {
        self.logo_status = if url.is_some() {
            LOGO_UPLOADED.to_string()
        } else {
            LOGO_LOCAL_ONLY.to_string()
        };
        self.logo_file = file;
        self.logo_url = url;
    }

    pub fn clear_logo(&mut self) {
        self.logo_file = None;
        self.logo_url = None;
        self.logo_status.clear();
    }

    fn validate_parties(&self) -> Result<()> {
        if is_blank(&self.from) || is_blank(&self.to) {
            return Err(InvoiceError::Validation(MISSING_PARTIES.to_string()));
        }
        Ok(())
    }

    /// Build the generate/preview request body. Unnamed rows are left out;
    /// it is an error if that leaves nothing.
    pub fn payload(&self, include_total: bool) -> Result<InvoicePayload> {
        self.validate_parties()?;

        let items: Vec<PayloadItem> = self
            .items
            .iter()
            .filter(|item| item.is_named())
            .map(PayloadItem::from)
            .collect();
        if items.is_empty() {
            return Err(InvoiceError::Validation(NO_VALID_ITEMS.to_string()));
        }

        Ok(InvoicePayload {
            from: self.from.clone(),
            to: self.to.clone(),
            items,
            tax_percent: self.adjustments.tax_value(),
            discount_percent: self.adjustments.discount_value(),
            payment_details: self.payment_details.clone(),
            payment_instructions: self.payment_instructions.clone(),
            logo_url: self.logo_url.clone(),
            invoice_number: self.invoice_number.clone(),
            issued_date: self.issued_date,
            due_date: self.due_date,
            total: include_total.then(|| self.totals().total),
        })
    }

    /// Name offered when saving the generated PDF.
    pub fn download_filename(&self) -> String {
        let mut name = String::from("invoice-");
        let mut in_space = false;
        for ch in self.to.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    name.push('_');
                }
                in_space = true;
                continue;
            }
            in_space = false;
            name.push(if matches!(ch, '/' | '\\') { '_' } else { ch });
        }
        name.push_str(".pdf");
        name
    }

    fn data(&self, ctx: &AppContext) -> InvoiceData {
        let tax = &self.adjustments.tax;
        let discount = &self.adjustments.discount;
        InvoiceData {
            from: self.from.clone(),
            to: self.to.clone(),
            items: self.items.as_slice().to_vec(),
            invoice_number: self.invoice_number.clone(),
            issued_date: self.issued_date,
            due_date: self.due_date,
            payment_details: self.payment_details.clone(),
            terms: self.terms.clone(),
            tax_percent: tax.value.value(),
            discount_percent: discount.value.value(),
            shipping_amount: self.adjustments.shipping.value,
            tax_type: AdjustmentKind::of(&tax.value),
            discount_type: AdjustmentKind::of(&discount.value),
            show_tax: tax.enabled,
            show_discount: discount.enabled,
            show_shipping: self.adjustments.shipping.enabled,
            logo_url: self.logo_url.clone(),
            currency: ctx.currency.code.to_string(),
            currency_symbol: ctx.currency.symbol.to_string(),
            currency_label: ctx.currency.label.to_string(),
        }
    }

    /// Build the save request. Saving needs a signed-in user, an invoice
    /// number and both parties.
    pub fn save_request(&self, ctx: &AppContext, client_id: Option<String>) -> Result<SaveInvoiceRequest> {
        let user_id = ctx.require_user()?.to_string();
        self.validate_parties()?;
        if is_blank(&self.invoice_number) {
            return Err(InvoiceError::Validation(
                "Set an invoice number before saving.".to_string(),
            ));
        }

        Ok(SaveInvoiceRequest {
            user_id,
            client_id,
            data: self.data(ctx),
            issued_date: self.issued_date,
            due_date: self.due_date,
            status: "draft",
            currency: ctx.currency.code.to_string(),
            currency_symbol: ctx.currency.symbol.to_string(),
            currency_label: ctx.currency.label.to_string(),
        })
    }

    /// Restore a form from a saved invoice.
    pub fn from_saved(invoice: SavedInvoice) -> Self {
        let d = invoice.data;
        let toggle = |enabled: bool, value: Adjustment| {
            let mut t = Toggle::enabled(value);
            t.set_enabled(enabled);
            t
        };

        let mut form = Self {
            from: d.from,
            to: d.to,
            invoice_number: d.invoice_number,
            issued_date: d.issued_date,
            due_date: d.due_date,
            payment_details: d.payment_details,
            terms: d.terms,
            saved_id: Some(invoice.id),
            items: LineItems::from_items(d.items),
            adjustments: Adjustments {
                tax: toggle(d.show_tax, d.tax_type.with_value(d.tax_percent)),
                discount: toggle(d.show_discount, d.discount_type.with_value(d.discount_percent)),
                shipping: {
                    let mut t = Toggle::enabled(d.shipping_amount.max(0.0));
                    t.set_enabled(d.show_shipping);
                    t
                },
            },
            ..Self::default()
        };
        form.logo_url = d.logo_url;
        form
    }
}
