//! Rendering backend: turns the report's draw instructions into PDF bytes.
//!
//! Owns everything the layout must not know about: font objects, color,
//! the bottom-left coordinate system, binary encoding and file naming.

use std::io::BufWriter;
use std::path::Path;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;

use crate::error::{FactureError, Result};
use crate::report::{DocumentDescription, DrawOp, PAGE_HEIGHT, PAGE_WIDTH};

const PT_TO_MM: f32 = 25.4 / 72.0;

const PAGE_W_MM: f32 = PAGE_WIDTH * PT_TO_MM;
const PAGE_H_MM: f32 = PAGE_HEIGHT * PT_TO_MM;

fn x_mm(x: f32) -> Mm {
    Mm(x * PT_TO_MM)
}

// Instructions use top-down coordinates; PDF pages grow upward.
fn y_mm(y: f32) -> Mm {
    Mm((PAGE_HEIGHT - y) * PT_TO_MM)
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn shade() -> Color {
    Color::Rgb(Rgb::new(0.92, 0.92, 0.92, None))
}

/// Encode a document description as PDF bytes.
pub fn render_to_bytes(desc: &DocumentDescription) -> Result<Vec<u8>> {
    let file_name = desc.file_name();
    let title = file_name.trim_end_matches(".pdf");
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_W_MM), Mm(PAGE_H_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| FactureError::PdfWrite(format!("{e:?}")))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    layer.set_outline_thickness(0.5);

    for op in &desc.ops {
        match op {
            DrawOp::Text { x, y, size, text } => {
                layer.use_text(text, *size, x_mm(*x), y_mm(*y), &font);
            }
            DrawOp::Line { x1, y1, x2, y2 } => {
                layer.add_line(Line {
                    points: vec![
                        (Point::new(x_mm(*x1), y_mm(*y1)), false),
                        (Point::new(x_mm(*x2), y_mm(*y2)), false),
                    ],
                    is_closed: false,
                });
            }
            DrawOp::Rect { x, y, w, h, filled } => {
                let corners = vec![
                    (Point::new(x_mm(*x), y_mm(*y)), false),
                    (Point::new(x_mm(*x + *w), y_mm(*y)), false),
                    (Point::new(x_mm(*x + *w), y_mm(*y + *h)), false),
                    (Point::new(x_mm(*x), y_mm(*y + *h)), false),
                ];
                if *filled {
                    // Fill color doubles as text color in PDF; restore
                    // black before any text lands on the shade.
                    layer.set_fill_color(shade());
                    layer.add_polygon(Polygon {
                        rings: vec![corners],
                        mode: PaintMode::Fill,
                        winding_order: WindingOrder::NonZero,
                    });
                    layer.set_fill_color(black());
                } else {
                    layer.add_polygon(Polygon {
                        rings: vec![corners],
                        mode: PaintMode::Stroke,
                        winding_order: WindingOrder::NonZero,
                    });
                }
            }
            DrawOp::PageBreak => {
                let (page, layer_idx) = doc.add_page(Mm(PAGE_W_MM), Mm(PAGE_H_MM), "Layer");
                layer = doc.get_page(page).get_layer(layer_idx);
                layer.set_outline_thickness(0.5);
            }
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| FactureError::PdfWrite(format!("{e:?}")))?;
    buf.into_inner()
        .map_err(|e| FactureError::PdfWrite(e.to_string()))
}

/// Encode and save to `path`.
pub fn write_pdf(desc: &DocumentDescription, path: &Path) -> Result<()> {
    let bytes = render_to_bytes(desc)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report;
    use crate::store::{Client, Company, Invoice, InvoiceKind, LineItem, PriceValue};
    use std::collections::HashMap;

    #[test]
    fn produces_a_pdf_header() {
        let company = Company {
            name: "Mada Perfect".to_string(),
            nif: String::new(),
            stat: String::new(),
            address: String::new(),
            contact: String::new(),
        };
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
        let invoice = Invoice {
            number: "INV-1".to_string(),
            kind: InvoiceKind::Commercial,
            date: "2026-01-10".to_string(),
            delivery_date: None,
            delivery_address: None,
            client: "rakoto".to_string(),
            items: vec![LineItem {
                id: 1,
                product: None,
                name: "Savon".to_string(),
                qty: 2,
                price: PriceValue::Number(2000.0),
            }],
            paid: 0,
        };
        let desc = report::render(&invoice, &clients, &company).unwrap();
        let bytes = render_to_bytes(&desc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
