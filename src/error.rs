use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactureError {
    #[error("Data directory not found at {0}. Run 'facture init' to create it.")]
    DataDirNotFound(PathBuf),

    #[error("Data file not found: {0}")]
    DataFileNotFound(PathBuf),

    #[error("Failed to parse data file {path}: {source}")]
    DataParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Client '{0}' not found in clients.toml")]
    ClientNotFound(String),

    #[error("Product '{0}' not found in products.toml")]
    ProductNotFound(String),

    #[error("Invoice '{number}' references unknown client '{client}'")]
    MissingClient { number: String, client: String },

    #[error("Invalid quantity '{qty}' for product '{product}': {reason}")]
    InvalidQuantity {
        product: String,
        qty: String,
        reason: String,
    },

    #[error("Invalid item format '{0}'. Expected 'product:quantity' (e.g., 'savon:3')")]
    InvalidItemFormat(String),

    #[error("No items specified. Use --item <product>:<quantity> to add line items.")]
    NoItems,

    #[error("Invalid amount '{0}'. Paid amount must be a whole number of ariary, zero or more.")]
    InvalidAmount(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid invoice type '{0}'. Use 'commercial' or 'proforma'.")]
    InvalidKind(String),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'facture list' to see available invoices.")]
    InvalidInvoiceIndex(String),

    #[error("Failed to write PDF: {0}")]
    PdfWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data directory already exists at {0}")]
    AlreadyInitialized(PathBuf),
}

pub type Result<T> = std::result::Result<T, FactureError>;
