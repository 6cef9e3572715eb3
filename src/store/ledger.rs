use serde::{Deserialize, Serialize};
use std::fmt;

use super::product::PriceValue;
use crate::money::coerce_amount;

/// The invoice collection as persisted in invoices.toml.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Ledger {
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    #[default]
    Commercial,
    Proforma,
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceKind::Commercial => write!(f, "commercial"),
            InvoiceKind::Proforma => write!(f, "proforma"),
        }
    }
}

/// One product entry on an invoice. Name and price are snapshots taken when
/// the line was added; later catalog edits never touch a saved invoice.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LineItem {
    /// Local ordinal within the invoice, used when editing line items.
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub product: Option<String>,
    pub name: String,
    pub qty: u32,
    #[serde(default)]
    pub price: PriceValue,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Invoice {
    pub number: String,
    #[serde(default)]
    pub kind: InvoiceKind,
    /// Issue date in ISO `YYYY-MM-DD` form, compared textually everywhere.
    pub date: String,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    pub client: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Amount already paid, in whole ariary.
    #[serde(default)]
    pub paid: i64,
}

impl Invoice {
    /// Invoice total: sum of quantity times coerced unit price.
    pub fn total(&self) -> i64 {
        self.items
            .iter()
            .map(|item| i64::from(item.qty) * coerce_amount(&item.price))
            .sum()
    }

    /// Amount still due. Negative when the client overpaid; not clamped.
    pub fn remaining(&self) -> i64 {
        self.total() - self.paid
    }

    /// Strictly less than the total: an invoice paid exactly in full is
    /// not unpaid.
    pub fn is_unpaid(&self) -> bool {
        self.paid < self.total()
    }

    pub fn status(&self) -> PaymentStatus {
        if self.paid >= self.total() {
            PaymentStatus::Paid
        } else if self.paid > 0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "PAYÉ"),
            PaymentStatus::Partial => write!(f, "PARTIEL"),
            PaymentStatus::Unpaid => write!(f, "IMPAYÉ"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, qty: u32, price: PriceValue) -> LineItem {
        LineItem {
            id: 0,
            product: None,
            name: name.to_string(),
            qty,
            price,
        }
    }

    fn invoice(items: Vec<LineItem>, paid: i64) -> Invoice {
        Invoice {
            number: "INV-1".to_string(),
            kind: InvoiceKind::Commercial,
            date: "2026-01-10".to_string(),
            delivery_date: None,
            delivery_address: None,
            client: "rakoto".to_string(),
            items,
            paid,
        }
    }

    #[test]
    fn total_coerces_every_price_representation() {
        let inv = invoice(
            vec![
                item("Savon", 3, PriceValue::Number(2000.0)),
                item("Huile", 1, PriceValue::Text("15 000 Ar".into())),
            ],
            0,
        );
        assert_eq!(inv.total(), 21000);
    }

    #[test]
    fn garbage_prices_count_as_zero_without_panicking() {
        let inv = invoice(vec![item("Mystère", 4, PriceValue::Text("???".into()))], 0);
        assert_eq!(inv.total(), 0);
    }

    #[test]
    fn remaining_may_go_negative_on_overpayment() {
        let inv = invoice(vec![item("Savon", 1, PriceValue::Number(2000.0))], 5000);
        assert_eq!(inv.remaining(), -3000);
    }

    #[test]
    fn line_prices_are_snapshots() {
        // The catalog price changes; the saved line keeps its own copy.
        let mut catalog_price = PriceValue::Number(2000.0);
        let inv = invoice(vec![item("Savon", 3, catalog_price.clone())], 0);
        catalog_price = PriceValue::Number(9999.0);
        let _ = catalog_price;
        assert_eq!(inv.total(), 6000);
    }

    #[test]
    fn exactly_paid_is_not_unpaid() {
        let inv = invoice(vec![item("Savon", 1, PriceValue::Number(2000.0))], 2000);
        assert!(!inv.is_unpaid());
        assert_eq!(inv.status(), PaymentStatus::Paid);
    }

    #[test]
    fn status_is_three_way() {
        let unpaid = invoice(vec![item("Savon", 1, PriceValue::Number(2000.0))], 0);
        let partial = invoice(vec![item("Savon", 1, PriceValue::Number(2000.0))], 500);
        assert_eq!(unpaid.status(), PaymentStatus::Unpaid);
        assert_eq!(partial.status(), PaymentStatus::Partial);
    }
}
