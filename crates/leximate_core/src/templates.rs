//! crates/leximate_core/src/templates.rs
//!
//! Pure template rendering for the three supported legal document types.
//! `(DocumentType, field bag) -> formatted text block`; no I/O, no storage.

use crate::domain::DocumentType;

/// The full bag of party/term fields a generation request can carry. Only a
/// subset is interpolated per template; missing values render as blanks.
#[derive(Debug, Clone, Default)]
pub struct TemplateFields {
    pub company_name: Option<String>,
    pub counterparty_name: Option<String>,
    pub effective_date: Option<String>,
    pub duration: Option<String>,
    pub governing_law: Option<String>,
    pub confidentiality_level: Option<String>,
    pub purpose: Option<String>,
    pub additional_terms: Option<String>,
    pub disclosing_party: Option<String>,
    pub receiving_party: Option<String>,
    pub client_name: Option<String>,
    pub freelancer_name: Option<String>,
    pub project_title: Option<String>,
    pub payment_amount: Option<String>,
    pub payment_method: Option<String>,
}

fn val(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

/// Renders the fixed textual template for a document type. Callers resolve
/// the type first; an unrecognized type string never reaches this function.
pub fn render_document_text(doc_type: DocumentType, fields: &TemplateFields) -> String {
    match doc_type {
        DocumentType::Nda => format!(
            "\nNON-DISCLOSURE AGREEMENT (NDA)\n\n\
             This Agreement is entered into on {}\n\
             between {} (\"Disclosing Party\") and\n\
             {} (\"Receiving Party\").\n\n\
             Purpose:\n{}\n\n\
             Confidentiality Level: {}\n\
             Duration: {}\n\n\
             Additional Terms:\n{}\n",
            val(&fields.effective_date),
            val(&fields.disclosing_party),
            val(&fields.receiving_party),
            val(&fields.purpose),
            val(&fields.confidentiality_level),
            val(&fields.duration),
            val(&fields.additional_terms),
        ),
        DocumentType::Contract => format!(
            "\nFREELANCE CONTRACT AGREEMENT\n\n\
             Client: {}\n\
             Freelancer: {}\n\
             Project: {}\n\
             Payment: {} via {}\n",
            val(&fields.client_name),
            val(&fields.freelancer_name),
            val(&fields.project_title),
            val(&fields.payment_amount),
            val(&fields.payment_method),
        ),
        DocumentType::Service => format!(
            "\nSERVICE AGREEMENT\n\n\
             Company: {}\n\
             Client: {}\n\
             Purpose: {}\n\
             Duration: {}\n\
             Governing Law: {}\n",
            val(&fields.company_name),
            val(&fields.counterparty_name),
            val(&fields.purpose),
            val(&fields.duration),
            val(&fields.governing_law),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nda_template_interpolates_parties() {
        let fields = TemplateFields {
            effective_date: Some("2026-01-01".to_string()),
            disclosing_party: Some("Acme Corp".to_string()),
            receiving_party: Some("Jane Doe".to_string()),
            purpose: Some("Evaluate a partnership".to_string()),
            confidentiality_level: Some("High".to_string()),
            duration: Some("2 years".to_string()),
            additional_terms: Some("None".to_string()),
            ..Default::default()
        };
        let text = render_document_text(DocumentType::Nda, &fields);
        assert!(text.contains("NON-DISCLOSURE AGREEMENT"));
        assert!(text.contains("Acme Corp (\"Disclosing Party\")"));
        assert!(text.contains("Jane Doe (\"Receiving Party\")"));
        assert!(text.contains("Duration: 2 years"));
    }

    #[test]
    fn contract_template_interpolates_payment() {
        let fields = TemplateFields {
            client_name: Some("Globex".to_string()),
            freelancer_name: Some("Sam".to_string()),
            project_title: Some("Website".to_string()),
            payment_amount: Some("$5000".to_string()),
            payment_method: Some("wire".to_string()),
            ..Default::default()
        };
        let text = render_document_text(DocumentType::Contract, &fields);
        assert!(text.contains("FREELANCE CONTRACT AGREEMENT"));
        assert!(text.contains("Payment: $5000 via wire"));
    }

    #[test]
    fn service_template_handles_missing_fields() {
        let text = render_document_text(DocumentType::Service, &TemplateFields::default());
        assert!(text.contains("SERVICE AGREEMENT"));
        assert!(text.contains("Governing Law: \n"));
    }

    #[test]
    fn every_template_is_non_empty() {
        let fields = TemplateFields::default();
        for doc_type in [DocumentType::Nda, DocumentType::Contract, DocumentType::Service] {
            assert!(!render_document_text(doc_type, &fields).trim().is_empty());
        }
    }
}
