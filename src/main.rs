mod error;
mod invoice;
mod metrics;
mod money;
mod pdf;
mod report;
mod store;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use crate::error::{FactureError, Result};
use crate::invoice::{build_line_items, next_invoice_number};
use crate::metrics::aggregate;
use crate::money::{format_long_date, format_mga, group_digits};
use crate::store::{
    data_dir, load_clients, load_company, load_ledger, load_products, output_dir, save_ledger,
    Invoice, InvoiceKind, CLIENTS_TEMPLATE, COMPANY_TEMPLATE, PRODUCTS_TEMPLATE,
};

#[derive(Parser)]
#[command(name = "facture")]
#[command(version, about = "Minimal CLI invoicing and sales dashboard (MGA)", long_about = None)]
struct Cli {
    /// Path to data directory (default: ~/.facture or XDG config)
    #[arg(short = 'C', long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory with template files
    Init,

    /// List configured clients
    Clients,

    /// List the product catalog
    Products,

    /// Show data directory status and counts
    Status,

    /// List invoices
    List {
        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Create a new invoice
    Create {
        /// Client identifier from clients.toml
        #[arg(short, long)]
        client: String,

        /// Line items in format "product:quantity" (can be repeated)
        #[arg(short, long, value_name = "PRODUCT:QTY")]
        item: Vec<String>,

        /// Invoice type: commercial or proforma
        #[arg(short, long, default_value = "commercial")]
        kind: String,

        /// Delivery date (YYYY-MM-DD)
        #[arg(long)]
        delivery_date: Option<String>,

        /// Delivery address
        #[arg(long)]
        delivery_address: Option<String>,
    },

    /// Replace an existing invoice's line items
    Edit {
        /// Invoice number or index from 'list' (e.g., 1 or INV-1700000000123)
        invoice: String,

        /// New line items in format "product:quantity" (replaces existing items)
        #[arg(short, long, value_name = "PRODUCT:QTY")]
        item: Vec<String>,
    },

    /// Record the amount a client has paid on an invoice
    SetPaid {
        /// Invoice number or index from 'list'
        invoice: String,

        /// Paid amount in whole ariary
        amount: String,
    },

    /// Delete an invoice
    Delete {
        /// Invoice number or index from 'list'
        invoice: String,
    },

    /// Export an invoice as PDF
    Pdf {
        /// Invoice number or index from 'list'
        invoice: String,

        /// Custom output file path (default: output_dir/<number>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Show the sales dashboard
    Dashboard {
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine data directory
    let dir = match cli.data_dir {
        Some(p) => p,
        None => data_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&dir),
        Commands::Clients => cmd_clients(&dir),
        Commands::Products => cmd_products(&dir),
        Commands::Status => cmd_status(&dir),
        Commands::List { limit } => cmd_list(&dir, limit),
        Commands::Create {
            client,
            item,
            kind,
            delivery_date,
            delivery_address,
        } => cmd_create(&dir, &client, &item, &kind, delivery_date, delivery_address),
        Commands::Edit { invoice, item } => cmd_edit(&dir, &invoice, &item),
        Commands::SetPaid { invoice, amount } => cmd_set_paid(&dir, &invoice, &amount),
        Commands::Delete { invoice } => cmd_delete(&dir, &invoice),
        Commands::Pdf {
            invoice,
            output,
            open,
        } => cmd_pdf(&dir, &invoice, output, open),
        Commands::Dashboard { date } => cmd_dashboard(&dir, date),
    }
}

/// Initialize the data directory with template files
fn cmd_init(dir: &PathBuf) -> Result<()> {
    use std::fs;

    if dir.exists() {
        return Err(FactureError::AlreadyInitialized(dir.clone()));
    }

    fs::create_dir_all(dir)?;
    fs::create_dir_all(dir.join("output"))?;

    fs::write(dir.join("company.toml"), COMPANY_TEMPLATE)?;
    fs::write(dir.join("clients.toml"), CLIENTS_TEMPLATE)?;
    fs::write(dir.join("products.toml"), PRODUCTS_TEMPLATE)?;

    println!("Initialized facture data at: {}", dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company details:  $EDITOR {}/company.toml",
        dir.display()
    );
    println!(
        "  2. Add your clients:           $EDITOR {}/clients.toml",
        dir.display()
    );
    println!(
        "  3. Fill in your catalog:       $EDITOR {}/products.toml",
        dir.display()
    );
    println!();
    println!("Then create your first invoice:");
    println!("  facture create --client <client-id> --item <product>:<quantity>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NOM")]
    name: String,
    #[tabled(rename = "TÉLÉPHONE")]
    phone: String,
    #[tabled(rename = "EMAIL")]
    email: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NOM")]
    name: String,
    #[tabled(rename = "PRIX")]
    price: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMÉRO")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUT")]
    status: String,
}

#[derive(Tabled)]
struct TopProductRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "PRODUIT")]
    name: String,
    #[tabled(rename = "QUANTITÉ")]
    quantity: u64,
}

/// Append TOTAL / PAYÉ / RESTE summary rows under the invoice table,
/// merging the five leading columns into one label cell and keeping the
/// TOTAL column aligned.
fn add_financial_footer(table: &str, total: &str, paid: &str, remaining: &str) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() < 7 {
        return table.to_string();
    }

    // Merge #, NUMÉRO, DATE, TYPE, CLIENT into one label cell; keep the
    // TOTAL column; drop STATUT
    let left_width = widths[0] + widths[1] + widths[2] + widths[3] + widths[4] + 4;
    let total_width = widths[5];
    let status_width = widths[6];

    let rows = [("TOTAL", total), ("(-) PAYÉ", paid), ("(=) RESTE", remaining)];

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    // First separator: merge left 5 columns, keep TOTAL, close off STATUT
    out.push_str(&format!(
        "├{}┴{}┴{}┴{}┴{}┼{}┼{}╯\n",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(widths[3]),
        "─".repeat(widths[4]),
        "─".repeat(total_width),
        "─".repeat(status_width),
    ));

    // Summary rows with separators between them
    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>total$} │\n",
            label,
            value,
            left = left_width - 2,
            total = total_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(total_width)
            ));
        }
    }

    // Bottom border
    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(total_width)
    ));

    out
}

/// List configured clients
fn cmd_clients(dir: &PathBuf) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    let clients = load_clients(dir)?;

    if clients.is_empty() {
        println!("No clients configured.");
        println!("Add clients to: {}/clients.toml", dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = clients.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ClientRow> = sorted
        .iter()
        .map(|(id, client)| ClientRow {
            id: id.to_string(),
            name: client.name.clone(),
            phone: client.phone.clone().unwrap_or_default(),
            email: client.email.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// List the product catalog
fn cmd_products(dir: &PathBuf) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    let products = load_products(dir)?;

    if products.is_empty() {
        println!("No products configured.");
        println!("Add products to: {}/products.toml", dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = products.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ProductRow> = sorted
        .iter()
        .map(|(id, product)| ProductRow {
            id: id.to_string(),
            name: product.name.clone(),
            price: format_mga(money::coerce_amount(&product.price)),
            description: product.description.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show data directory status
fn cmd_status(dir: &PathBuf) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    let company = load_company(dir)?;
    let clients = load_clients(dir)?;
    let products = load_products(dir)?;
    let ledger = load_ledger(dir)?;

    println!("Facture Status");
    println!("{}", "-".repeat(50));
    println!("Data directory: {}", dir.display());
    println!("Company:        {}", company.name);
    println!("Clients:        {}", clients.len());
    println!("Products:       {}", products.len());
    println!("Invoices:       {}", ledger.invoices.len());

    if !ledger.invoices.is_empty() {
        println!();
        println!("Recent invoices:");
        for inv in ledger.invoices.iter().rev().take(5) {
            println!(
                "  {} - {} - {}",
                inv.number,
                inv.client,
                format_mga(inv.total())
            );
        }
    }

    Ok(())
}

/// List invoices with totals footer
fn cmd_list(dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    let clients = load_clients(dir)?;
    let ledger = load_ledger(dir)?;

    if ledger.invoices.is_empty() {
        println!("No invoices yet.");
        return Ok(());
    }

    let invoices: Vec<_> = ledger.invoices.iter().rev().enumerate().collect();
    let invoices = match limit {
        Some(n) => &invoices[..n.min(invoices.len())],
        None => &invoices[..],
    };

    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|(idx, inv)| InvoiceRow {
            index: idx + 1,
            number: inv.number.clone(),
            date: inv.date.clone(),
            kind: inv.kind.to_string(),
            client: clients
                .get(&inv.client)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| inv.client.clone()),
            total: format_mga(inv.total()),
            status: inv.status().to_string(),
        })
        .collect();

    // Financial summary over the shown invoices
    let shown_total: i64 = invoices.iter().map(|(_, inv)| inv.total()).sum();
    let shown_paid: i64 = invoices.iter().map(|(_, inv)| inv.paid).sum();
    let shown_remaining = shown_total - shown_paid;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(
        &table,
        &format_mga(shown_total),
        &format_mga(shown_paid),
        &format_mga(shown_remaining),
    );

    println!("{table}");

    println!();
    println!("Total: {} invoices", ledger.invoices.len());
    println!("Use index number with edit/set-paid/delete/pdf (e.g., 'facture pdf 1')");

    Ok(())
}

/// Resolve an invoice reference to the actual invoice number.
/// Accepts either an index (1-based) from 'list' or the full invoice number.
fn resolve_invoice_number(dir: &PathBuf, reference: &str) -> Result<String> {
    let ledger = load_ledger(dir)?;

    // Try to parse as an index first
    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 {
            return Err(FactureError::InvalidInvoiceIndex(reference.to_string()));
        }
        // Invoices are displayed in reverse order (newest first), 1-indexed
        let invoices: Vec<_> = ledger.invoices.iter().rev().collect();
        if idx > invoices.len() {
            return Err(FactureError::InvalidInvoiceIndex(reference.to_string()));
        }
        return Ok(invoices[idx - 1].number.clone());
    }

    // Otherwise, treat as invoice number - verify it exists
    if ledger.invoices.iter().any(|inv| inv.number == reference) {
        Ok(reference.to_string())
    } else {
        Err(FactureError::InvoiceNotFound(reference.to_string()))
    }
}

fn parse_kind(kind: &str) -> Result<InvoiceKind> {
    match kind {
        "commercial" => Ok(InvoiceKind::Commercial),
        "proforma" => Ok(InvoiceKind::Proforma),
        other => Err(FactureError::InvalidKind(other.to_string())),
    }
}

/// Create a new invoice
fn cmd_create(
    dir: &PathBuf,
    client_id: &str,
    items_input: &[String],
    kind: &str,
    delivery_date: Option<String>,
    delivery_address: Option<String>,
) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    if items_input.is_empty() {
        return Err(FactureError::NoItems);
    }

    let kind = parse_kind(kind)?;

    if let Some(d) = &delivery_date {
        NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| FactureError::InvalidDate(d.clone()))?;
    }

    let clients = load_clients(dir)?;
    let products = load_products(dir)?;
    let mut ledger = load_ledger(dir)?;

    let client = clients
        .get(client_id)
        .ok_or_else(|| FactureError::ClientNotFound(client_id.to_string()))?;

    let items = build_line_items(&products, items_input)?;

    let now = Local::now();
    let number = next_invoice_number(now);

    let invoice = Invoice {
        number: number.clone(),
        kind,
        date: now.date_naive().format("%Y-%m-%d").to_string(),
        delivery_date,
        delivery_address,
        client: client_id.to_string(),
        items,
        paid: 0,
    };
    let total = invoice.total();

    ledger.invoices.push(invoice);
    save_ledger(dir, &ledger)?;

    println!("Created {number}");
    println!("  Client: {}", client.name);
    println!("  Total:  {}", format_mga(total));

    Ok(())
}

/// Replace an existing invoice's line items
fn cmd_edit(dir: &PathBuf, invoice_ref: &str, items_input: &[String]) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    if items_input.is_empty() {
        return Err(FactureError::NoItems);
    }

    let number = resolve_invoice_number(dir, invoice_ref)?;
    let products = load_products(dir)?;
    let mut ledger = load_ledger(dir)?;

    let items = build_line_items(&products, items_input)?;

    let entry = ledger
        .invoices
        .iter_mut()
        .find(|inv| inv.number == number)
        .ok_or_else(|| FactureError::InvoiceNotFound(number.clone()))?;

    entry.items = items;
    let total = entry.total();

    save_ledger(dir, &ledger)?;

    println!("Updated {number}");
    println!("  Items: {}", items_input.join(", "));
    println!("  Total: {}", format_mga(total));

    Ok(())
}

/// Record the amount a client has paid on an invoice
fn cmd_set_paid(dir: &PathBuf, invoice_ref: &str, amount_str: &str) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    // Non-numeric and negative input is rejected here; the stored paid
    // value is always a valid whole amount. Overpayment is allowed and
    // shows up as a negative remainder.
    let amount: i64 = amount_str
        .trim()
        .parse()
        .map_err(|_| FactureError::InvalidAmount(amount_str.to_string()))?;
    if amount < 0 {
        return Err(FactureError::InvalidAmount(amount_str.to_string()));
    }

    let number = resolve_invoice_number(dir, invoice_ref)?;
    let mut ledger = load_ledger(dir)?;

    let entry = ledger
        .invoices
        .iter_mut()
        .find(|inv| inv.number == number)
        .ok_or_else(|| FactureError::InvoiceNotFound(number.clone()))?;

    entry.paid = amount;
    let total = entry.total();
    let remaining = entry.remaining();
    let status = entry.status();

    save_ledger(dir, &ledger)?;

    println!(
        "Recorded {} paid on {number} (total {}, reste {})",
        format_mga(amount),
        format_mga(total),
        format_mga(remaining)
    );
    println!("  Status: {status}");

    Ok(())
}

/// Delete an invoice
fn cmd_delete(dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    let number = resolve_invoice_number(dir, invoice_ref)?;
    let mut ledger = load_ledger(dir)?;

    ledger.invoices.retain(|inv| inv.number != number);
    save_ledger(dir, &ledger)?;

    println!("Deleted {number}");

    Ok(())
}

/// Export an invoice as PDF
fn cmd_pdf(dir: &PathBuf, invoice_ref: &str, output: Option<PathBuf>, open: bool) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    let number = resolve_invoice_number(dir, invoice_ref)?;
    let company = load_company(dir)?;
    let clients = load_clients(dir)?;
    let ledger = load_ledger(dir)?;

    let invoice = ledger
        .invoices
        .iter()
        .find(|inv| inv.number == number)
        .ok_or_else(|| FactureError::InvoiceNotFound(number.clone()))?;

    let description = report::render(invoice, &clients, &company)?;

    let pdf_path = match output {
        Some(path) => path,
        None => {
            let out_dir = output_dir(dir);
            std::fs::create_dir_all(&out_dir)?;
            out_dir.join(description.file_name())
        }
    };

    pdf::write_pdf(&description, &pdf_path)?;

    println!("Generated {number}");
    println!("  Pages: {}", description.page_count);
    println!("  Saved: {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

/// Show the sales dashboard
fn cmd_dashboard(dir: &PathBuf, date: Option<String>) -> Result<()> {
    if !dir.exists() {
        return Err(FactureError::DataDirNotFound(dir.clone()));
    }

    // The reference date is resolved here, never inside the aggregation
    let as_of = match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|_| FactureError::InvalidDate(s.clone()))?,
        None => Local::now().date_naive(),
    };

    let clients = load_clients(dir)?;
    let products = load_products(dir)?;
    let ledger = load_ledger(dir)?;

    let m = aggregate(&ledger.invoices, &clients, &products, as_of);
    let as_of_iso = as_of.format("%Y-%m-%d").to_string();

    println!("Tableau de bord ({})", format_long_date(&as_of_iso));
    println!("{}", "-".repeat(50));
    println!("Ventes du jour:     {}", format_mga(m.today_sales));
    println!("Ventes du mois:     {}", format_mga(m.month_sales));
    println!("Factures impayées:  {}", m.unpaid_count);
    println!("Ticket moyen:       {}", format_mga(m.average_ticket));
    println!("Total payé:         {}", format_mga(m.paid_total));
    println!("Reste à encaisser:  {}", format_mga(m.remaining_total));
    println!(
        "Produits: {}   Clients: {}   Factures: {}",
        m.product_count, m.client_count, m.invoice_count
    );

    // Daily entries are dense in the metrics; only active days are shown
    let active_days: Vec<(usize, i64)> = m
        .daily_series
        .iter()
        .enumerate()
        .filter(|(_, sales)| **sales != 0)
        .map(|(i, sales)| (i + 1, *sales))
        .collect();

    println!();
    if active_days.is_empty() {
        println!("Aucune vente ce mois-ci.");
    } else {
        println!("Ventes par jour:");
        for (day, sales) in active_days {
            println!("  {day:02}: {}", format_mga(sales));
        }
    }

    if !m.top_products.is_empty() {
        let rows: Vec<TopProductRow> = m
            .top_products
            .iter()
            .enumerate()
            .map(|(idx, p)| TopProductRow {
                rank: idx + 1,
                name: p.name.clone(),
                quantity: p.quantity,
            })
            .collect();
        println!();
        println!("Meilleurs produits:");
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    // Show the outstanding balance in USD when a rate is available
    if m.remaining_total > 0 {
        if let Some(rate) = fetch_mga_to_usd_rate() {
            let usd = (m.remaining_total as f64 * rate).round() as i64;
            println!();
            println!(
                "Reste en USD: ${} (1 USD = {:.0} MGA)",
                group_digits(usd),
                1.0 / rate
            );
        }
    }

    Ok(())
}

/// Fetch the current MGA to USD exchange rate.
/// Returns None on any failure (network, timeout, parse error) so the
/// caller can silently skip the USD line.
fn fetch_mga_to_usd_rate() -> Option<f64> {
    use std::time::Duration;
    use ureq::Agent;

    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(3)))
        .build()
        .into();

    let body: String = agent
        .get("https://open.er-api.com/v6/latest/MGA")
        .call()
        .ok()?
        .body_mut()
        .read_to_string()
        .ok()?;

    let json: serde_json::Value = serde_json::from_str(&body).ok()?;
    json["rates"]["USD"].as_f64()
}

fn open_path(pdf_path: &PathBuf) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(pdf_path)
            .spawn()
            .map_err(FactureError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(pdf_path)
            .spawn()
            .map_err(FactureError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", pdf_path.to_str().unwrap_or("")])
            .spawn()
            .map_err(FactureError::Io)?;
    }
    Ok(())
}
