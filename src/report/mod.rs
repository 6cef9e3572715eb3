//! Invoice document layout.
//!
//! `render` turns an invoice and its resolved client into a flat, ordered
//! list of draw instructions. The PDF backend (`crate::pdf`) owns fonts and
//! binary encoding; nothing here touches the filesystem, and identical
//! inputs always produce identical instruction sequences.

mod wrap;

use std::collections::HashMap;

use crate::error::{FactureError, Result};
use crate::money::{coerce_amount, format_long_date, format_mga, group_digits};
use crate::store::{Client, Company, Invoice, InvoiceKind};
use wrap::wrap_text;

// A4 portrait, in PostScript points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

const MARGIN: f32 = 40.0;
const TOP_Y: f32 = 40.0;
const BOTTOM_LIMIT: f32 = PAGE_HEIGHT - 60.0;

const HEADER_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;

const LINE_STEP: f32 = 16.0;
const LINE_HEIGHT: f32 = 14.0;
const MIN_ROW_HEIGHT: f32 = 18.0;
const CELL_PADDING: f32 = 4.0;
const HEADER_ROW_HEIGHT: f32 = 20.0;
// First baseline sits this far below a row's top edge.
const BASELINE_DROP: f32 = CELL_PADDING + 10.0;

const TABLE_LEFT: f32 = MARGIN;
const TABLE_RIGHT: f32 = PAGE_WIDTH - MARGIN;
const COL_QTY_X: f32 = TABLE_LEFT + 6.0;
const COL_NAME_X: f32 = TABLE_LEFT + 60.0;
const COL_UNIT_X: f32 = 330.0;
const COL_AMOUNT_X: f32 = 455.0;
const NAME_COL_WIDTH: f32 = COL_UNIT_X - COL_NAME_X - 12.0;

/// One primitive operation for the rendering backend. Coordinates are
/// top-down page points; `y` is the text baseline or the rectangle's top.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text { x: f32, y: f32, size: f32, text: String },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Rect { x: f32, y: f32, w: f32, h: f32, filled: bool },
    PageBreak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDescription {
    pub ops: Vec<DrawOp>,
    pub page_count: usize,
    file_stem: String,
}

impl DocumentDescription {
    /// Download name for the backend: `<invoice number>.pdf`, or
    /// `invoice.pdf` when the record carries no number.
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.file_stem)
    }
}

/// Cursor-based instruction writer. `y` advances down the page; crossing
/// the bottom limit inserts a page break and resets to the top margin.
struct Sheet {
    ops: Vec<DrawOp>,
    y: f32,
    pages: usize,
}

impl Sheet {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            y: TOP_Y,
            pages: 1,
        }
    }

    fn text(&mut self, x: f32, size: f32, text: impl Into<String>) {
        self.ops.push(DrawOp::Text {
            x,
            y: self.y,
            size,
            text: text.into(),
        });
    }

    fn text_at(&mut self, x: f32, y: f32, size: f32, text: impl Into<String>) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            text: text.into(),
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push(DrawOp::Line { x1, y1, x2, y2 });
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, filled: bool) {
        self.ops.push(DrawOp::Rect { x, y, w, h, filled });
    }

    fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.y + needed > BOTTOM_LIMIT {
            self.ops.push(DrawOp::PageBreak);
            self.y = TOP_Y;
            self.pages += 1;
        }
    }
}

/// Lay out one invoice. Fails with `MissingClient` when the invoice's
/// client reference does not resolve; no partial output in that case.
pub fn render(
    invoice: &Invoice,
    clients: &HashMap<String, Client>,
    company: &Company,
) -> Result<DocumentDescription> {
    let client = clients
        .get(&invoice.client)
        .ok_or_else(|| FactureError::MissingClient {
            number: invoice.number.clone(),
            client: invoice.client.clone(),
        })?;

    let total = invoice.total();
    let paid = invoice.paid;
    let remaining = invoice.remaining();

    let mut sheet = Sheet::new();

    // Company header
    sheet.text(MARGIN, HEADER_SIZE, company.name.clone());
    sheet.advance(LINE_STEP);
    sheet.text(
        MARGIN,
        BODY_SIZE,
        format!("NIF : {}   STAT : {}", company.nif, company.stat),
    );
    sheet.advance(LINE_STEP);
    sheet.text(MARGIN, BODY_SIZE, format!("Adresse : {}", company.address));
    sheet.advance(LINE_STEP);
    sheet.text(MARGIN, BODY_SIZE, format!("Contact : {}", company.contact));
    sheet.advance(26.0);

    // Title wording is a legal requirement, not cosmetics: a proforma must
    // not read as a commercial invoice.
    let title = match invoice.kind {
        InvoiceKind::Proforma => "FACTURE PROFORMA",
        InvoiceKind::Commercial => "FACTURE COMMERCIALE",
    };
    sheet.text(MARGIN, TITLE_SIZE, title);
    sheet.advance(26.0);

    sheet.text(MARGIN, BODY_SIZE, format!("Facture No : {}", invoice.number));
    sheet.text(
        COL_UNIT_X,
        BODY_SIZE,
        format!("Date : {}", format_long_date(&invoice.date)),
    );
    sheet.advance(24.0);

    draw_info_box(&mut sheet, client, invoice);
    draw_item_table(&mut sheet, invoice);
    draw_totals_box(&mut sheet, total, paid, remaining);

    let kind_label = match invoice.kind {
        InvoiceKind::Proforma => "Proforma",
        InvoiceKind::Commercial => "Commerciale",
    };
    sheet.text(
        MARGIN,
        BODY_SIZE,
        format!(
            "Arrêtée la présente facture {} à la somme : {} Ariary",
            kind_label,
            group_digits(total)
        ),
    );
    sheet.advance(LINE_STEP);
    sheet.text(MARGIN, BODY_SIZE, "Merci pour votre confiance.");

    let file_stem = if invoice.number.is_empty() {
        "invoice".to_string()
    } else {
        invoice.number.clone()
    };

    Ok(DocumentDescription {
        ops: sheet.ops,
        page_count: sheet.pages,
        file_stem,
    })
}

/// Two-cell box: addressee on the left ("Doit :"), delivery terms on the
/// right, with the original's fallback wording when delivery is unset.
fn draw_info_box(sheet: &mut Sheet, client: &Client, invoice: &Invoice) {
    let mut left: Vec<String> = vec!["Doit :".to_string(), client.name.clone()];
    if let Some(address) = client.address.as_deref().filter(|s| !s.is_empty()) {
        left.push(address.to_string());
    }
    if let Some(phone) = client.phone.as_deref().filter(|s| !s.is_empty()) {
        left.push(phone.to_string());
    }

    let delivery_date = invoice
        .delivery_date
        .as_deref()
        .map(format_long_date)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Non définie".to_string());
    let delivery_address = invoice
        .delivery_address
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Non défini".to_string());
    let right = [
        format!("Livraison : {delivery_date}"),
        format!("Lieu : {delivery_address}"),
    ];

    let rows = left.len().max(right.len());
    let box_h = rows as f32 * LINE_HEIGHT + 2.0 * CELL_PADDING;
    let mid = (TABLE_LEFT + TABLE_RIGHT) / 2.0;

    sheet.rect(TABLE_LEFT, sheet.y, TABLE_RIGHT - TABLE_LEFT, box_h, false);
    sheet.line(mid, sheet.y, mid, sheet.y + box_h);

    let first_baseline = sheet.y + BASELINE_DROP;
    for (i, text) in left.iter().enumerate() {
        sheet.text_at(
            TABLE_LEFT + 8.0,
            first_baseline + LINE_HEIGHT * i as f32,
            BODY_SIZE,
            text.clone(),
        );
    }
    for (i, text) in right.iter().enumerate() {
        sheet.text_at(
            mid + 8.0,
            first_baseline + LINE_HEIGHT * i as f32,
            BODY_SIZE,
            text.clone(),
        );
    }

    sheet.advance(box_h + 18.0);
}

fn draw_item_table(sheet: &mut Sheet, invoice: &Invoice) {
    // Shaded header row, emitted once per document.
    sheet.rect(
        TABLE_LEFT,
        sheet.y,
        TABLE_RIGHT - TABLE_LEFT,
        HEADER_ROW_HEIGHT,
        true,
    );
    let label_y = sheet.y + HEADER_ROW_HEIGHT - 6.0;
    sheet.text_at(COL_QTY_X, label_y, BODY_SIZE, "Quantité");
    sheet.text_at(COL_NAME_X, label_y, BODY_SIZE, "Désignation");
    sheet.text_at(COL_UNIT_X, label_y, BODY_SIZE, "Prix unitaire");
    sheet.text_at(COL_AMOUNT_X, label_y, BODY_SIZE, "Montant");
    sheet.advance(HEADER_ROW_HEIGHT);

    for item in &invoice.items {
        let unit = coerce_amount(&item.price);
        let amount = i64::from(item.qty) * unit;
        let lines = wrap_text(&item.name, NAME_COL_WIDTH, BODY_SIZE);

        // Height first, placement second: the break decision needs the
        // full wrapped height of the row it is about to place.
        let row_h = (lines.len() as f32 * LINE_HEIGHT + 2.0 * CELL_PADDING).max(MIN_ROW_HEIGHT);
        sheet.ensure_room(row_h);

        let first_baseline = sheet.y + BASELINE_DROP;
        sheet.text_at(COL_QTY_X, first_baseline, BODY_SIZE, item.qty.to_string());
        for (i, line) in lines.iter().enumerate() {
            sheet.text_at(
                COL_NAME_X,
                first_baseline + LINE_HEIGHT * i as f32,
                BODY_SIZE,
                line.clone(),
            );
        }
        sheet.text_at(COL_UNIT_X, first_baseline, BODY_SIZE, format_mga(unit));
        sheet.text_at(COL_AMOUNT_X, first_baseline, BODY_SIZE, format_mga(amount));

        sheet.advance(row_h);
        sheet.line(TABLE_LEFT, sheet.y, TABLE_RIGHT, sheet.y);
    }

    sheet.advance(18.0);
}

fn draw_totals_box(sheet: &mut Sheet, total: i64, paid: i64, remaining: i64) {
    let box_h = 3.0 * LINE_HEIGHT + 2.0 * CELL_PADDING;
    // Keep the box and the two closing lines on the same page.
    sheet.ensure_room(box_h + 60.0);

    let box_left = COL_UNIT_X;
    sheet.rect(box_left, sheet.y, TABLE_RIGHT - box_left, box_h, false);

    let rows = [("Total", total), ("Payé", paid), ("Reste", remaining)];
    let first_baseline = sheet.y + BASELINE_DROP;
    for (i, (label, value)) in rows.iter().enumerate() {
        let y = first_baseline + LINE_HEIGHT * i as f32;
        sheet.text_at(box_left + 8.0, y, BODY_SIZE, (*label).to_string());
        sheet.text_at(COL_AMOUNT_X, y, BODY_SIZE, format_mga(*value));
    }

    sheet.advance(box_h + 24.0);
}
