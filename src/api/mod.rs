//! Blocking client for the invoice backend.

mod response;
mod types;

pub use response::{BodyKind, Preview, RawResponse};
pub use types::{
    CheckoutSession, Client, DashboardData, DashboardInvoice, DashboardStats, InvoiceStatus,
    LogoUpload, NewClient, SubscriptionStatus,
};

use std::path::Path;
use std::time::Duration;
use ureq::http::Response;
use ureq::unversioned::multipart::{Form, Part};
use ureq::{Agent, Body};

use crate::config::ApiSettings;
use crate::error::{InvoiceError, Result};
use crate::invoice::{InvoicePayload, SaveInvoiceRequest, SavedInvoice};
use types::{ClientCreated, ClientList, InvoiceList, LogoUploadResponse, SaveResponse};

pub struct ApiClient {
    base_url: String,
    agent: Agent,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        // Non-2xx responses carry the error text we show, so read them
        // instead of failing in the transport.
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(&settings.base_url, Duration::from_secs(settings.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn read(path: &str, mut response: Response<Body>) -> Result<RawResponse> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.body_mut().read_to_vec()?;
        tracing::debug!(path, status, bytes = body.len(), "response received");
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<RawResponse> {
        tracing::info!(path, "POST");
        let response = self.agent.post(&self.url(path)).send_json(body)?;
        Self::read(path, response)
    }

    fn put_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<RawResponse> {
        tracing::info!(path, "PUT");
        let response = self.agent.put(&self.url(path)).send_json(body)?;
        Self::read(path, response)
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RawResponse> {
        tracing::info!(path, "GET");
        let mut request = self.agent.get(&self.url(path));
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let response = request.call()?;
        Self::read(path, response)
    }

    /// `POST /generate-invoice`. Returns the PDF bytes.
    pub fn generate_invoice(&self, payload: &InvoicePayload) -> Result<Vec<u8>> {
        let response = self
            .post_json("/generate-invoice", payload)?
            .ok_or_backend("Generate")?;

        match response.kind() {
            BodyKind::Binary => Ok(response.body),
            kind => Err(InvoiceError::UnexpectedResponse(format!(
                "expected a PDF, got {kind:?} ({})",
                response.content_type.as_deref().unwrap_or("no content type")
            ))),
        }
    }

    /// `POST /preview-invoice`
    pub fn preview_invoice(&self, payload: &InvoicePayload) -> Result<Preview> {
        let response = self
            .post_json("/preview-invoice", payload)?
            .ok_or_backend("Preview")?;
        Preview::from_response(response)
    }

    /// `POST /upload-logo` as multipart with a `logo` field. Never fails:
    /// any problem leaves the logo local-only.
    pub fn upload_logo(&self, file: &Path) -> LogoUpload {
        match self.try_upload_logo(file) {
            Ok(logo_url) => LogoUpload::Hosted { logo_url },
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "logo upload failed, keeping local preview");
                LogoUpload::LocalOnly {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_upload_logo(&self, file: &Path) -> Result<String> {
        // Part::file guesses the MIME type from the extension.
        let form = Form::new().part("logo", Part::file(file)?);

        tracing::info!(path = "/upload-logo", file = %file.display(), "POST");
        let response = self.agent.post(&self.url("/upload-logo")).send(form)?;
        let response = Self::read("/upload-logo", response)?.ok_or_backend("Logo upload")?;

        response
            .json::<LogoUploadResponse>()?
            .logo_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| InvoiceError::UnexpectedResponse("no logo_url in response".to_string()))
    }

    /// `GET /api/dashboard`
    pub fn dashboard(&self) -> Result<DashboardData> {
        self.get("/api/dashboard", &[])?
            .ok_or_backend("Dashboard")?
            .json()
    }

    /// `GET /api/subscription-status/{user_id}`
    pub fn subscription_status(&self, user_id: &str) -> Result<SubscriptionStatus> {
        self.get(&format!("/api/subscription-status/{user_id}"), &[])?
            .ok_or_backend("Subscription status")?
            .json()
    }

    /// `POST /create-checkout-session`. The caller sends the user to the
    /// returned URL.
    pub fn create_checkout_session(&self) -> Result<CheckoutSession> {
        tracing::info!(path = "/create-checkout-session", "POST");
        let response = self
            .agent
            .post(&self.url("/create-checkout-session"))
            .header("Content-Type", "application/json")
            .send_empty()?;
        Self::read("/create-checkout-session", response)?
            .ok_or_backend("Checkout")?
            .json()
    }

    /// `GET /api/invoices?user_id=`
    pub fn list_invoices(&self, user_id: &str) -> Result<Vec<SavedInvoice>> {
        let list: InvoiceList = self
            .get("/api/invoices", &[("user_id", user_id)])?
            .ok_or_backend("Loading invoices")?
            .json()?;
        Ok(list.invoices)
    }

    /// `POST /api/invoices`. Returns the saved invoice id when the server
    /// reports one.
    pub fn save_invoice(&self, request: &SaveInvoiceRequest) -> Result<Option<String>> {
        let raw = self.post_json("/api/invoices", request)?;
        Self::save_outcome(raw, "Save")
    }

    /// `PUT /api/invoices/{id}`: overwrite an invoice saved earlier.
    pub fn update_invoice(&self, id: &str, request: &SaveInvoiceRequest) -> Result<()> {
        let raw = self.put_json(&format!("/api/invoices/{id}"), request)?;
        Self::save_outcome(raw, "Update").map(|_| ())
    }

    fn save_outcome(raw: RawResponse, action: &str) -> Result<Option<String>> {
        let status = raw.status;
        let saved: SaveResponse = raw.ok_or_backend(action)?.json()?;
        if saved.success {
            Ok(saved.id)
        } else {
            Err(InvoiceError::Backend {
                status,
                message: saved
                    .error
                    .unwrap_or_else(|| format!("{action} failed: invoice was not stored.")),
            })
        }
    }

    /// `GET /api/clients?user_id=`
    pub fn list_clients(&self, user_id: &str) -> Result<Vec<Client>> {
        let list: ClientList = self
            .get("/api/clients", &[("user_id", user_id)])?
            .ok_or_backend("Loading clients")?
            .json()?;
        if !list.success {
            return Err(InvoiceError::UnexpectedResponse(
                list.error.unwrap_or_else(|| "Failed to fetch clients".to_string()),
            ));
        }
        Ok(list.clients)
    }

    /// `POST /api/clients`. Returns the stored client.
    pub fn create_client(&self, client: &NewClient) -> Result<Client> {
        let raw = self.post_json("/api/clients", client)?;
        let status = raw.status;
        let created: ClientCreated = raw.ok_or_backend("Create client")?.json()?;
        match created.client {
            Some(client) if created.success => Ok(client),
            _ => Err(InvoiceError::Backend {
                status,
                message: created
                    .error
                    .unwrap_or_else(|| "Failed to create client".to_string()),
            }),
        }
    }
}
