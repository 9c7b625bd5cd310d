// src/extractors/metadata.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::filing::{DocumentMetadata, FormType};

// SGML header fields of an EDGAR submission.
static SUBMISSION_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)SUBMISSION\s+TYPE:\s*(10-[KQ])\b")
        .expect("Failed to compile SUBMISSION_TYPE_RE")
});

static FILED_AS_OF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"FILED AS OF DATE:\s*(\d{8})").expect("Failed to compile FILED_AS_OF_RE")
});

static CIK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"CENTRAL INDEX KEY:\s*(\d+)").expect("Failed to compile CIK_RE")
});

// Cover-page mention, e.g. "FORM 10-K" or "Form 10-Q".
static FORM_MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bForm\s+(10-[KQ])\b").expect("Failed to compile FORM_MENTION_RE")
});

/// Best-effort metadata from the whole-document visible text.
pub fn extract_metadata(full_text: &str) -> DocumentMetadata {
    let form_type = first_capture(&SUBMISSION_TYPE_RE, full_text)
        .or_else(|| first_capture(&FORM_MENTION_RE, full_text))
        .and_then(FormType::from_label);

    let metadata = DocumentMetadata {
        form_type,
        filing_date: first_capture(&FILED_AS_OF_RE, full_text).map(str::to_string),
        cik: first_capture(&CIK_RE, full_text).map(str::to_string),
    };

    tracing::debug!(
        "Document metadata: form={:?} filed={:?} cik={:?}",
        metadata.form_type,
        metadata.filing_date,
        metadata.cik
    );
    metadata
}

fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sgml_header_fields() {
        let text = "ACCESSION NUMBER: 0000320193-18-000145\n\
                    CONFORMED SUBMISSION TYPE: 10-K\n\
                    FILED AS OF DATE: 20181105\n\
                    COMPANY DATA: COMPANY CONFORMED NAME: APPLE INC \
                    CENTRAL INDEX KEY: 0000320193";
        let meta = extract_metadata(text);
        assert_eq!(meta.form_type, Some(FormType::TenK));
        assert_eq!(meta.filing_date.as_deref(), Some("20181105"));
        assert_eq!(meta.cik.as_deref(), Some("0000320193"));
    }

    #[test]
    fn test_cover_page_form_mention() {
        let meta = extract_metadata("UNITED STATES\nFORM 10-Q\nQuarterly report");
        assert_eq!(meta.form_type, Some(FormType::TenQ));
        assert_eq!(meta.filing_date, None);
        assert_eq!(meta.cik, None);
    }

    #[test]
    fn test_absent_fields_are_none() {
        let meta = extract_metadata("Form 8-K current report, filed 2021");
        assert_eq!(meta, DocumentMetadata::default());
    }
}
