pub mod api;
pub mod config;
pub mod error;
pub mod invoice;
pub mod logging;
pub mod session;

pub use api::{ApiClient, LogoUpload, Preview};
pub use config::{AppContext, Config, Draft};
pub use error::{InvoiceError, Result};
pub use invoice::{Adjustment, InvoiceForm, InvoicePayload, InvoiceTotals, LineItems};
pub use session::Session;
