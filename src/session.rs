//! One editing session: the form, the backend client and the request
//! flags that views read.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{ApiClient, Client, LogoUpload, NewClient, Preview};
use crate::config::AppContext;
use crate::error::Result;
use crate::invoice::{InvoiceForm, SavedInvoice};

/// A request-in-flight flag.
#[derive(Debug, Default)]
pub struct LoadingFlag(Cell<bool>);

impl LoadingFlag {
    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    /// Set the flag until the returned guard is dropped.
    pub fn begin(&self) -> BusyGuard<'_> {
        self.0.set(true);
        BusyGuard(&self.0)
    }
}

/// Clears its [`LoadingFlag`] on drop, on every exit path.
pub struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct Session {
    pub context: AppContext,
    pub form: InvoiceForm,
    api: ApiClient,
    pub loading: LoadingFlag,
    pub preview_loading: LoadingFlag,
    last_error: Option<String>,
}

impl Session {
    pub fn new(context: AppContext, form: InvoiceForm, api: ApiClient) -> Self {
        Self {
            context,
            form,
            api,
            loading: LoadingFlag::default(),
            preview_loading: LoadingFlag::default(),
            last_error: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Message from the most recent failed request, cleared when the next
    /// request starts.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record<T>(last_error: &mut Option<String>, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::debug!(error = %e, "request failed");
            *last_error = Some(e.to_string());
        }
        result
    }

    /// Validate, generate the PDF and save it into `out_dir` under the
    /// download name. Returns the written path.
    pub fn download(&mut self, out_dir: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
        let _busy = self.loading.begin();
        self.last_error = None;

        let form = &self.form;
        let api = &self.api;
        let result = (|| -> Result<PathBuf> {
            let payload = form.payload(true)?;
            let pdf = api.generate_invoice(&payload)?;
            let path = output.unwrap_or_else(|| out_dir.join(form.download_filename()));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, pdf)?;
            Ok(path)
        })();
        Self::record(&mut self.last_error, result)
    }

    /// Validate and fetch a preview. `include_total` mirrors the two preview
    /// variants the server accepts.
    pub fn preview(&mut self, include_total: bool) -> Result<Preview> {
        let _busy = self.preview_loading.begin();
        self.last_error = None;

        let result = self
            .form
            .payload(include_total)
            .and_then(|payload| self.api.preview_invoice(&payload));
        Self::record(&mut self.last_error, result)
    }

    /// Upload a logo and record the outcome on the form. A failed upload
    /// keeps the file for local preview.
    pub fn upload_logo(&mut self, file: &Path) -> LogoUpload {
        let _busy = self.loading.begin();
        let outcome = self.api.upload_logo(file);
        self.form
            .set_logo(Some(file.to_path_buf()), outcome.url().map(str::to_string));
        outcome
    }

    /// Save the form to the backend. A form that was saved or loaded before
    /// updates that invoice in place; otherwise a new one is created and its
    /// id remembered.
    pub fn save(&mut self, client_id: Option<String>) -> Result<Option<String>> {
        let _busy = self.loading.begin();
        self.last_error = None;

        let existing = self.form.saved_id.clone();
        let api = &self.api;
        let result = self
            .form
            .save_request(&self.context, client_id)
            .and_then(|request| match &existing {
                Some(id) => api.update_invoice(id, &request).map(|_| existing.clone()),
                None => api.save_invoice(&request),
            });
        let result = Self::record(&mut self.last_error, result);
        if let Ok(Some(id)) = &result {
            self.form.saved_id = Some(id.clone());
        }
        result
    }

    /// Clients of the signed-in user.
    pub fn clients(&mut self) -> Result<Vec<Client>> {
        let _busy = self.loading.begin();
        self.last_error = None;

        let result = self
            .context
            .require_user()
            .and_then(|user| self.api.list_clients(user));
        Self::record(&mut self.last_error, result)
    }

    pub fn add_client(
        &mut self,
        name: String,
        email: Option<String>,
        address: Option<String>,
        phone: Option<String>,
    ) -> Result<Client> {
        let _busy = self.loading.begin();
        self.last_error = None;

        let result = self.context.require_user().and_then(|user| {
            self.api.create_client(&NewClient {
                user_id: user.to_string(),
                name,
                email,
                address,
                phone,
            })
        });
        Self::record(&mut self.last_error, result)
    }

    pub fn saved_invoices(&mut self) -> Result<Vec<SavedInvoice>> {
        let _busy = self.loading.begin();
        self.last_error = None;

        let result = self
            .context
            .require_user()
            .and_then(|user| self.api.list_invoices(user));
        Self::record(&mut self.last_error, result)
    }

    /// Replace the form with a saved invoice.
    pub fn load(&mut self, invoice: SavedInvoice) {
        self.form = InvoiceForm::from_saved(invoice);
    }

    /// Start over with an empty form.
    pub fn reset(&mut self) {
        self.form = InvoiceForm::new();
    }
}
