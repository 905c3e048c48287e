use serde::{Deserialize, Serialize};
use std::fmt;

use crate::invoice::SavedInvoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    #[serde(other)]
    Other,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Other => "-",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub pending_amount: f64,
    pub total_invoices: u64,
    pub total_clients: u64,
    pub paid_invoices: u64,
    pub overdue_invoices: u64,
    pub monthly_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardInvoice {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub amount: f64,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `GET /api/dashboard`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default)]
    pub recent_invoices: Vec<DashboardInvoice>,
}

impl DashboardData {
    /// Recent invoices whose client name or number contains `term`,
    /// ignoring case. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&DashboardInvoice> {
        let term = term.trim().to_lowercase();
        self.recent_invoices
            .iter()
            .filter(|inv| {
                term.is_empty()
                    || inv.client_name.to_lowercase().contains(&term)
                    || inv.invoice_number.to_lowercase().contains(&term)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub subscription_status: Option<String>,
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self.subscription_status.as_deref(), Some("active") | Some("trialing"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct LogoUploadResponse {
    pub logo_url: Option<String>,
}

/// Outcome of a logo upload. A failed upload still leaves the logo usable
/// for local preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoUpload {
    Hosted { logo_url: String },
    LocalOnly { reason: String },
}

impl LogoUpload {
    pub fn url(&self) -> Option<&str> {
        match self {
            LogoUpload::Hosted { logo_url } => Some(logo_url),
            LogoUpload::LocalOnly { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct InvoiceList {
    #[serde(default)]
    pub invoices: Vec<SavedInvoice>,
}

/// A client of the signed-in user, as `GET /api/clients` lists it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Client {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub invoice_count: u64,
}

/// Body of `POST /api/clients`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewClient {
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ClientList {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub clients: Vec<Client>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ClientCreated {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub client: Option<Client>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct SaveResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> DashboardData {
        serde_json::from_value(serde_json::json!({
            "stats": { "total_revenue": 1200.5, "total_invoices": 2 },
            "recent_invoices": [
                { "invoice_number": "INV-001", "client_name": "Acme Corp", "amount": 200, "status": "paid" },
                { "invoice_number": "INV-002", "client_name": "Globex", "amount": 50, "status": "void" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn dashboard_decodes_with_missing_fields() {
        let data = dashboard();
        assert_eq!(data.stats.total_invoices, 2);
        assert_eq!(data.stats.pending_amount, 0.0);
        assert_eq!(data.recent_invoices[0].status, InvoiceStatus::Paid);
        assert_eq!(data.recent_invoices[1].status, InvoiceStatus::Other);
    }

    #[test]
    fn search_matches_client_or_number() {
        let data = dashboard();
        assert_eq!(data.search("acme").len(), 1);
        assert_eq!(data.search("inv-00").len(), 2);
        assert_eq!(data.search("").len(), 2);
        assert!(data.search("initech").is_empty());
    }

    #[test]
    fn client_list_tolerates_nulls() {
        let list: ClientList = serde_json::from_str(
            r#"{"success":true,"clients":[{"id":"c1","name":"Acme","email":null,"phone":null,"invoice_count":3}],
                "pagination":{"page":1}}"#,
        )
        .unwrap();
        assert_eq!(list.clients[0].name, "Acme");
        assert_eq!(list.clients[0].email, None);
        assert_eq!(list.clients[0].invoice_count, 3);
    }

    #[test]
    fn new_client_leaves_out_empty_fields() {
        let body = serde_json::to_value(NewClient {
            user_id: "u1".into(),
            name: "Globex".into(),
            email: Some("ap@globex.test".into()),
            address: None,
            phone: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"user_id":"u1","name":"Globex","email":"ap@globex.test"}));
    }

    #[test]
    fn subscription_activity() {
        let active: SubscriptionStatus =
            serde_json::from_str(r#"{"subscription_status":"active"}"#).unwrap();
        assert!(active.is_active());
        let none: SubscriptionStatus = serde_json::from_str("{}").unwrap();
        assert!(!none.is_active());
    }
}
