use chrono::{DateTime, Local};
use std::collections::HashMap;

use crate::error::{FactureError, Result};
use crate::store::{LineItem, Product};

/// Parse item input like "savon:3" into (product_id, quantity)
fn parse_item_input(input: &str) -> Result<(&str, u32)> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 2 {
        return Err(FactureError::InvalidItemFormat(input.to_string()));
    }

    let product_id = parts[0];
    let qty_str = parts[1];

    let qty: u32 = qty_str.parse().map_err(|_| FactureError::InvalidQuantity {
        product: product_id.to_string(),
        qty: qty_str.to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if qty == 0 {
        return Err(FactureError::InvalidQuantity {
            product: product_id.to_string(),
            qty: qty_str.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok((product_id, qty))
}

/// Resolve "product:qty" inputs against the catalog, snapshotting the
/// product name and price into the line. The snapshot is deliberate:
/// a catalog price change must not rewrite existing invoices.
pub fn build_line_items(
    catalog: &HashMap<String, Product>,
    inputs: &[String],
) -> Result<Vec<LineItem>> {
    let mut items: Vec<LineItem> = Vec::new();

    for (idx, input) in inputs.iter().enumerate() {
        let (product_id, qty) = parse_item_input(input)?;

        let product = catalog
            .get(product_id)
            .ok_or_else(|| FactureError::ProductNotFound(product_id.to_string()))?;

        items.push(LineItem {
            id: idx as u64 + 1,
            product: Some(product_id.to_string()),
            name: product.name.clone(),
            qty,
            price: product.price.clone(),
        });
    }

    Ok(items)
}

/// Auto-generated invoice numbers are INV-<millisecond timestamp>.
pub fn next_invoice_number(now: DateTime<Local>) -> String {
    format!("INV-{}", now.timestamp_millis())
}
