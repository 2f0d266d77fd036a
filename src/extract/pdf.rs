use std::fs;
use std::path::Path;

use super::ExtractError;

/// Extracts the text of every page, in order.
pub fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path).map_err(|e| ExtractError::io(path, e))?;
    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    Ok(join_pages(pages))
}

/// Concatenates page texts; pages with no extractable text add nothing.
/// Page text is kept verbatim, including any form feeds it contains.
fn join_pages(pages: Vec<String>) -> String {
    pages
        .into_iter()
        .filter(|page| !page.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds an uncompressed PDF with one Helvetica text line per page.
    /// An empty string produces a page with an empty content stream.
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let page_count = pages.len();
        let font_id = 3 + page_count;
        let first_content_id = font_id + 1;
        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", 3 + i))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids, page_count
            ),
        ];
        for i in 0..page_count {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
                font_id,
                first_content_id + i
            ));
        }
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        for text in pages {
            let content = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", text)
            };
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ));
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_at = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        pdf.extend_from_slice(xref.as_bytes());
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn concatenates_pages_in_order() {
        let pages = vec!["\n\nFirst page.\n".to_string(), "\n\nSecond page.\n".to_string()];
        assert_eq!(join_pages(pages), "\n\nFirst page.\n\n\nSecond page.\n");
    }

    #[test]
    fn blank_pages_contribute_nothing() {
        let pages = vec![
            "\n\nAlpha".to_string(),
            String::new(),
            "  \n ".to_string(),
            "\n\nOmega".to_string(),
        ];
        assert_eq!(join_pages(pages), "\n\nAlpha\n\nOmega");
    }

    #[test]
    fn form_feeds_inside_page_text_are_kept() {
        let pages = vec!["Intro\u{000C}Appendix".to_string()];
        assert_eq!(join_pages(pages), "Intro\u{000C}Appendix");
    }

    #[test]
    fn document_without_text_is_empty() {
        assert_eq!(join_pages(vec![String::new(), "\n".to_string()]), "");
        assert_eq!(join_pages(Vec::new()), "");
    }

    #[test]
    fn multi_page_document_keeps_page_order_and_skips_empty_pages() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("three-pages.pdf");
        fs::write(&path, build_pdf(&["Alpha", "", "Omega"])).unwrap();

        let text = extract_pdf(&path).unwrap();
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["Alpha", "Omega"]);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.pdf");
        fs::write(&path, b"not really a pdf").unwrap();

        assert!(matches!(extract_pdf(&path), Err(ExtractError::Pdf(_))));
    }
}
