//! Dashboard aggregation.
//!
//! Pure derivations over the loaded collections; `as_of` is always passed
//! in by the caller so the same inputs give the same dashboard.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::store::{Client, Invoice, Product};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    /// Sum of totals for invoices issued on `as_of`.
    pub today_sales: i64,
    /// Sum of totals for invoices issued in `as_of`'s month.
    pub month_sales: i64,
    /// Invoices with paid strictly below total.
    pub unpaid_count: usize,
    /// Rounded mean invoice total; 0 when there are no invoices.
    pub average_ticket: i64,
    /// One entry per calendar day of `as_of`'s month, zeros included.
    pub daily_series: Vec<i64>,
    /// Paid across all invoices, ever.
    pub paid_total: i64,
    /// Total of all invoices minus paid_total; negative on overpayment.
    pub remaining_total: i64,
    /// Top 6 products by summed quantity, ties in first-encountered order.
    pub top_products: Vec<ProductSales>,
    pub product_count: usize,
    pub client_count: usize,
    pub invoice_count: usize,
}

/// Number of days in `as_of`'s month.
fn days_in_month(as_of: NaiveDate) -> u32 {
    let (year, month) = (as_of.year(), as_of.month());
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month_start
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

pub fn aggregate(
    invoices: &[Invoice],
    clients: &HashMap<String, Client>,
    products: &HashMap<String, Product>,
    as_of: NaiveDate,
) -> DashboardMetrics {
    let today_key = as_of.format("%Y-%m-%d").to_string();
    let month_key = as_of.format("%Y-%m").to_string();

    let mut today_sales = 0i64;
    let mut month_sales = 0i64;
    let mut unpaid_count = 0usize;
    let mut grand_total = 0i64;
    let mut paid_total = 0i64;

    let days = days_in_month(as_of);
    let mut daily_series = vec![0i64; days as usize];

    // Encounter-ordered tally; the stable sort below keeps that order
    // for equal quantities.
    let mut sales_order: Vec<String> = Vec::new();
    let mut sales_by_key: HashMap<String, ProductSales> = HashMap::new();

    for invoice in invoices {
        let total = invoice.total();
        grand_total += total;
        paid_total += invoice.paid;

        if invoice.is_unpaid() {
            unpaid_count += 1;
        }
        if invoice.date == today_key {
            today_sales += total;
        }
        if invoice.date.starts_with(&month_key) {
            month_sales += total;
            for day in 1..=days {
                if invoice.date == format!("{month_key}-{day:02}") {
                    daily_series[day as usize - 1] += total;
                }
            }
        }

        for item in &invoice.items {
            let key = item
                .product
                .clone()
                .unwrap_or_else(|| item.name.clone());
            let entry = sales_by_key.entry(key.clone()).or_insert_with(|| {
                sales_order.push(key);
                ProductSales {
                    name: item.name.clone(),
                    quantity: 0,
                }
            });
            entry.quantity += u64::from(item.qty);
        }
    }

    let average_ticket = if invoices.is_empty() {
        0
    } else {
        (grand_total as f64 / invoices.len() as f64).round() as i64
    };

    let mut top_products: Vec<ProductSales> = sales_order
        .iter()
        .map(|key| sales_by_key[key].clone())
        .collect();
    top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    top_products.truncate(6);

    DashboardMetrics {
        today_sales,
        month_sales,
        unpaid_count,
        average_ticket,
        daily_series,
        paid_total,
        remaining_total: grand_total - paid_total,
        top_products,
        product_count: products.len(),
        client_count: clients.len(),
        invoice_count: invoices.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InvoiceKind, LineItem, PriceValue};

    fn item(product: Option<&str>, name: &str, qty: u32, price: i64) -> LineItem {
        LineItem {
            id: 0,
            product: product.map(str::to_string),
            name: name.to_string(),
            qty,
            price: PriceValue::Number(price as f64),
        }
    }

    fn invoice(date: &str, items: Vec<LineItem>, paid: i64) -> Invoice {
        Invoice {
            number: format!("INV-{date}"),
            kind: InvoiceKind::Commercial,
            date: date.to_string(),
            delivery_date: None,
            delivery_address: None,
            client: "rakoto".to_string(),
            items,
            paid,
        }
    }

    fn run(invoices: &[Invoice], as_of: &str) -> DashboardMetrics {
        let as_of = NaiveDate::parse_from_str(as_of, "%Y-%m-%d").unwrap();
        aggregate(invoices, &HashMap::new(), &HashMap::new(), as_of)
    }

    #[test]
    fn empty_collections_aggregate_to_zeros() {
        let m = run(&[], "2026-02-10");
        assert_eq!(m.today_sales, 0);
        assert_eq!(m.month_sales, 0);
        assert_eq!(m.unpaid_count, 0);
        assert_eq!(m.average_ticket, 0);
        assert_eq!(m.paid_total, 0);
        assert_eq!(m.remaining_total, 0);
        assert!(m.top_products.is_empty());
        // February 2026: still one dense entry per day
        assert_eq!(m.daily_series.len(), 28);
        assert!(m.daily_series.iter().all(|v| *v == 0));
    }

    #[test]
    fn today_matches_on_exact_date_only() {
        let invoices = [
            invoice("2026-03-05", vec![item(None, "Savon", 1, 500)], 0),
            invoice("2026-03-06", vec![item(None, "Savon", 1, 700)], 0),
        ];
        let m = run(&invoices, "2026-03-05");
        assert_eq!(m.today_sales, 500);
        assert_eq!(m.month_sales, 1200);
    }

    #[test]
    fn month_sales_ignore_other_months() {
        let invoices = [
            invoice("2026-03-05", vec![item(None, "Savon", 1, 500)], 0),
            invoice("2026-02-28", vec![item(None, "Savon", 1, 9000)], 0),
        ];
        let m = run(&invoices, "2026-03-15");
        assert_eq!(m.month_sales, 500);
    }

    #[test]
    fn unpaid_is_a_strict_comparison() {
        let invoices = [
            invoice("2026-03-01", vec![item(None, "Savon", 1, 1000)], 1000),
            invoice("2026-03-02", vec![item(None, "Savon", 1, 1000)], 999),
            invoice("2026-03-03", vec![item(None, "Savon", 1, 1000)], 2000),
        ];
        let m = run(&invoices, "2026-03-10");
        assert_eq!(m.unpaid_count, 1);
    }

    #[test]
    fn average_ticket_rounds_and_survives_empty_input() {
        assert_eq!(run(&[], "2026-03-10").average_ticket, 0);
        let invoices = [
            invoice("2026-03-01", vec![item(None, "A", 1, 100)], 0),
            invoice("2026-03-02", vec![item(None, "B", 1, 300)], 0),
        ];
        assert_eq!(run(&invoices, "2026-03-10").average_ticket, 200);
        let odd = [
            invoice("2026-03-01", vec![item(None, "A", 1, 100)], 0),
            invoice("2026-03-02", vec![item(None, "B", 1, 101)], 0),
        ];
        // 100.5 rounds away from zero
        assert_eq!(run(&odd, "2026-03-10").average_ticket, 101);
    }

    #[test]
    fn daily_series_is_dense_over_the_whole_month() {
        let invoices = [
            invoice("2026-04-05", vec![item(None, "Savon", 1, 500)], 0),
            invoice("2026-04-05", vec![item(None, "Huile", 1, 300)], 0),
        ];
        let m = run(&invoices, "2026-04-20");
        assert_eq!(m.daily_series.len(), 30);
        assert_eq!(m.daily_series[4], 800);
        let zeros = m.daily_series.iter().filter(|v| **v == 0).count();
        assert_eq!(zeros, 29);
    }

    #[test]
    fn paid_vs_remaining_spans_all_time_and_is_not_clamped() {
        let invoices = [
            invoice("2025-11-01", vec![item(None, "Savon", 1, 1000)], 5000),
            invoice("2026-03-01", vec![item(None, "Huile", 1, 2000)], 0),
        ];
        let m = run(&invoices, "2026-03-10");
        assert_eq!(m.paid_total, 5000);
        assert_eq!(m.remaining_total, -2000);
    }

    #[test]
    fn top_products_group_by_id_with_name_fallback() {
        let invoices = [
            invoice(
                "2026-03-01",
                vec![
                    item(Some("a"), "Savon", 3, 100),
                    item(Some("b"), "Huile", 5, 100),
                ],
                0,
            ),
            invoice(
                "2026-03-02",
                vec![
                    item(Some("a"), "Savon", 2, 100),
                    item(None, "Bougie", 4, 100),
                ],
                0,
            ),
        ];
        let m = run(&invoices, "2026-03-10");
        assert_eq!(m.top_products.len(), 3);
        assert_eq!(m.top_products[0].quantity, 5);
        assert_eq!(m.top_products[1].quantity, 5);
        assert_eq!(m.top_products[2], ProductSales { name: "Bougie".to_string(), quantity: 4 });
    }

    #[test]
    fn equal_quantities_rank_in_first_encounter_order() {
        let invoices = [
            invoice(
                "2026-03-01",
                vec![
                    item(Some("a"), "Savon", 3, 100),
                    item(Some("b"), "Huile", 5, 100),
                    item(Some("a"), "Savon", 2, 100),
                ],
                0,
            ),
        ];
        let m = run(&invoices, "2026-03-10");
        // both reach 5; "a" was encountered first
        assert_eq!(m.top_products[0].name, "Savon");
        assert_eq!(m.top_products[1].name, "Huile");
        assert_eq!(m.top_products[0].quantity, 5);
        assert_eq!(m.top_products[1].quantity, 5);
    }

    #[test]
    fn top_products_cap_at_six() {
        let items: Vec<LineItem> = (0..9)
            .map(|i| item(None, &format!("P{i}"), 9 - i, 100))
            .collect();
        let m = run(&[invoice("2026-03-01", items, 0)], "2026-03-10");
        assert_eq!(m.top_products.len(), 6);
        assert_eq!(m.top_products[0].name, "P0");
        assert_eq!(m.top_products[5].name, "P5");
    }

    #[test]
    fn catalog_counts_come_from_the_supplied_collections() {
        let mut clients = HashMap::new();
        clients.insert(
            "rakoto".to_string(),
            Client {
                name: "Rakoto".to_string(),
                address: None,
                phone: None,
                email: None,
            },
        );
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let m = aggregate(&[], &clients, &HashMap::new(), as_of);
        assert_eq!(m.client_count, 1);
        assert_eq!(m.product_count, 0);
        assert_eq!(m.invoice_count, 0);
    }
}
