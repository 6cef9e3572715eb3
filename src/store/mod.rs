mod client;
mod company;
mod ledger;
mod product;

pub use client::Client;
pub use company::Company;
pub use ledger::{Invoice, InvoiceKind, Ledger, LineItem, PaymentStatus};
pub use product::{PriceValue, Product};

use crate::error::{FactureError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Get the data directory path (~/.facture or XDG config)
pub fn data_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "facture") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.facture/
    let home = dirs_home().ok_or_else(|| {
        FactureError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".facture"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Where generated PDFs land.
pub fn output_dir(data_dir: &PathBuf) -> PathBuf {
    data_dir.join("output")
}

/// Load company.toml
pub fn load_company(data_dir: &PathBuf) -> Result<Company> {
    let path = data_dir.join("company.toml");
    if !path.exists() {
        return Err(FactureError::DataFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| FactureError::DataParse { path, source: e })
}

/// Load clients.toml as a HashMap
pub fn load_clients(data_dir: &PathBuf) -> Result<HashMap<String, Client>> {
    let path = data_dir.join("clients.toml");
    if !path.exists() {
        return Err(FactureError::DataFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| FactureError::DataParse { path, source: e })
}

/// Load products.toml as a HashMap
pub fn load_products(data_dir: &PathBuf) -> Result<HashMap<String, Product>> {
    let path = data_dir.join("products.toml");
    if !path.exists() {
        return Err(FactureError::DataFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| FactureError::DataParse { path, source: e })
}

/// Load invoices.toml (creates default if missing)
pub fn load_ledger(data_dir: &PathBuf) -> Result<Ledger> {
    let path = data_dir.join("invoices.toml");
    if !path.exists() {
        return Ok(Ledger::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| FactureError::DataParse { path, source: e })
}

/// Save invoices.toml
pub fn save_ledger(data_dir: &PathBuf, ledger: &Ledger) -> Result<()> {
    let path = data_dir.join("invoices.toml");
    let content = toml::to_string_pretty(ledger).map_err(|e| {
        FactureError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for company.toml
pub const COMPANY_TEMPLATE: &str = r#"# Company identity printed at the top of every invoice.
name = "Mada Perfect"
nif = ""          # Numéro d'Identification Fiscale
stat = ""         # Numéro statistique
address = "Antananarivo"
contact = "+261 34 00 000 00"
"#;

/// Template content for clients.toml
pub const CLIENTS_TEMPLATE: &str = r#"# Define your clients here. The table name (e.g., [rakoto]) is used
# as the client identifier in the create command.
#
# Example:
#   facture create --client rakoto --item savon:3

[rakoto]
name = "Rakoto Jean"
address = "Lot II A 25 Ambatomaro"
phone = "+261 33 11 222 33"
email = "rakoto@example.com"
"#;

/// Template content for products.toml
pub const PRODUCTS_TEMPLATE: &str = r#"# Define your catalog here. The table name (e.g., [savon]) is used
# as the product identifier in the create command. Prices are in ariary;
# a plain number or a decorated string ("15 000 Ar") both work.
#
# Example:
#   facture create --client rakoto --item savon:3 --item huile:1

[savon]
name = "Savon artisanal"
price = 2000
description = "Savon au beurre de karité"

[huile]
name = "Huile essentielle"
price = "15 000 Ar"
"#;
