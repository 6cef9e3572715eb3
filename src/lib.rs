pub mod error;
pub mod invoice;
pub mod metrics;
pub mod money;
pub mod pdf;
pub mod report;
pub mod store;

pub use error::{FactureError, Result};
pub use metrics::{aggregate, DashboardMetrics};
pub use report::{render, DocumentDescription, DrawOp};
pub use store::{Client, Company, Invoice, InvoiceKind, Ledger, LineItem, PriceValue, Product};
