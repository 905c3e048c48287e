use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Config directory not found at {0}. Run 'invoicer init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write draft: {0}")]
    DraftSerialize(#[from] toml::ser::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Unknown currency '{0}'. Use 'invoicer currency' to list supported codes.")]
    UnknownCurrency(String),

    #[error("No line item at position {index} (invoice has {count} item(s))")]
    InvalidItemIndex { index: usize, count: usize },

    /// Form state that must be fixed before anything is sent.
    #[error("{0}")]
    Validation(String),

    #[error("You need to sign in first. Set account.user_id in config.toml.")]
    NotSignedIn,

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Client '{0}' not found. Use 'invoicer clients' to list them.")]
    ClientNotFound(String),

    /// Non-OK HTTP status; `message` is extracted from the response body.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Could not reach the invoice server: {0}")]
    Http(String),

    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for InvoiceError {
    fn from(err: ureq::Error) -> Self {
        InvoiceError::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
