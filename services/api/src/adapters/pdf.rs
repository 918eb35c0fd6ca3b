//! services/api/src/adapters/pdf.rs
//!
//! In-memory PDF rendering for finalized documents. Produces an A4 page
//! stream with the document type as title and one paragraph per line of
//! generated text. The bytes are returned to the caller, never persisted.

use printpdf::{BuiltinFont, Mm, PdfDocument};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const LINE_STEP_MM: f32 = 6.0;
// Helvetica at 11pt fits roughly this many characters across an A4 text column.
const WRAP_COLUMNS: usize = 90;

/// Renders a titled document body as PDF bytes.
pub fn render_pdf(title: &str, body: &str) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut current_layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    current_layer.use_text(title, TITLE_SIZE, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 2.0 * LINE_STEP_MM;

    for line in body.lines() {
        for wrapped in wrap_line(line, WRAP_COLUMNS) {
            if y < MARGIN_MM {
                let (next_page, next_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                current_layer = doc.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            if !wrapped.is_empty() {
                current_layer.use_text(wrapped, BODY_SIZE, Mm(MARGIN_MM), Mm(y), &font);
            }
            y -= LINE_STEP_MM;
        }
    }

    doc.save_to_bytes()
}

/// Greedy word wrap; a blank line yields a single empty entry so vertical
/// spacing is preserved.
fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    if line.trim().is_empty() {
        return vec![String::new()];
    }
    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > columns {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_pdf_magic_bytes() {
        let bytes = render_pdf("NDA", "Line one.\n\nLine two.").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_body_spills_to_more_pages() {
        let body = "A fairly long paragraph of agreement text. ".repeat(200);
        let bytes = render_pdf("CONTRACT", &body).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_line_respects_column_budget() {
        let wrapped = wrap_line(&"word ".repeat(50), 20);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| l.len() <= 20));
    }

    #[test]
    fn blank_line_keeps_vertical_space() {
        assert_eq!(wrap_line("   ", 80), vec![String::new()]);
    }
}
