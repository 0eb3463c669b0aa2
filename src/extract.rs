//! Page-structured text extraction for source documents.
//!
//! The document ingest path needs text per page (chunk headings carry
//! page labels), so extraction returns one string per page rather than
//! a single flattened body. Pre-chunked JSON input bypasses this module
//! entirely.

use crate::error::PipelineError;

/// Extract one text string per page from a PDF byte buffer.
///
/// A page with no extractable text stays in the sequence as an empty
/// string; the chunker drops it later. An unreadable document fails
/// with [`PipelineError::DocumentParse`], aborting that ingest only.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, PipelineError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| PipelineError::DocumentParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal valid single-page PDF containing "paperbase test phrase".
    /// Builds body then xref with correct byte offsets so pdf-extract
    /// can parse it.
    fn minimal_pdf() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");
        let o1 = out.len();
        out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
        let o2 = out.len();
        out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
        let o3 = out.len();
        out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
        let o4 = out.len();
        out.extend_from_slice(b"4 0 obj << /Length 54 >> stream\nBT /F1 12 Tf 100 700 Td (paperbase test phrase) Tj ET\nendstream endobj\n");
        let o5 = out.len();
        out.extend_from_slice(
            b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
        );
        let xref_start = out.len();
        out.extend_from_slice(b"xref\n0 6\n");
        out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
        out.extend_from_slice(format!("{:010} 00000 n \n", o1).as_bytes());
        out.extend_from_slice(format!("{:010} 00000 n \n", o2).as_bytes());
        out.extend_from_slice(format!("{:010} 00000 n \n", o3).as_bytes());
        out.extend_from_slice(format!("{:010} 00000 n \n", o4).as_bytes());
        out.extend_from_slice(format!("{:010} 00000 n \n", o5).as_bytes());
        out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
        out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
        out.extend_from_slice(b"%%EOF\n");
        out
    }

    #[test]
    fn invalid_pdf_is_a_parse_error() {
        let err = extract_pages(b"not a pdf").unwrap_err();
        assert!(matches!(err, PipelineError::DocumentParse(_)));
    }

    #[test]
    fn single_page_pdf_yields_one_page() {
        let pages = extract_pages(&minimal_pdf()).unwrap();
        assert_eq!(pages.len(), 1);
    }
}
