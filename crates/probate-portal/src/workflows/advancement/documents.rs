use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{Document, DocumentRequirement, SignerRole};

/// Aggregate state of the documentation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Waiting,
    RequirementsPending,
    SignaturesPending,
    Complete,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::RequirementsPending => "Requirements Pending",
            Self::SignaturesPending => "Signatures Pending",
            Self::Complete => "Complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentAnalysis {
    pub status: DocumentStatus,
    pub status_label: &'static str,
    pub total_requirements: usize,
    pub fulfilled_requirements: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_requirements: Vec<String>,
    pub signatures_required: usize,
    pub signatures_completed: usize,
    pub pending_applicant_signatures: usize,
    pub pending_solicitor_signatures: usize,
    pub completed: bool,
    pub progress: u8,
    pub issue_count: usize,
    pub description: String,
    pub detail_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_text: Option<&'static str>,
}

/// Requirement fulfilment is checked before signatures: an uploaded but
/// unsigned document satisfies its requirement and blocks only via the
/// signature count.
pub fn analyze_documents(
    documents: &[Document],
    requirements: &[DocumentRequirement],
) -> DocumentAnalysis {
    let uploaded_types: HashSet<u64> = documents
        .iter()
        .filter_map(|document| document.document_type)
        .collect();

    let missing_requirements: Vec<String> = requirements
        .iter()
        .filter(|requirement| !uploaded_types.contains(&requirement.document_type.id))
        .map(|requirement| requirement.document_type.name.clone())
        .collect();

    let total_requirements = requirements.len();
    let fulfilled_requirements = total_requirements - missing_requirements.len();

    let signing: Vec<&Document> = documents
        .iter()
        .filter(|document| document.signature_required)
        .collect();
    let signatures_required = signing.len();
    let signatures_completed = signing.iter().filter(|document| document.is_signed).count();
    let pending_for = |role: SignerRole| {
        signing
            .iter()
            .filter(|document| {
                document.awaiting_signature() && document.who_needs_to_sign == Some(role)
            })
            .count()
    };
    let pending_applicant_signatures = pending_for(SignerRole::Applicant);
    let pending_solicitor_signatures = pending_for(SignerRole::Solicitor);
    let unsigned = signatures_required - signatures_completed;
    let awaiting: Vec<String> = signing
        .iter()
        .filter(|document| document.awaiting_signature())
        .map(|document| document.display_name())
        .collect();

    let status = if total_requirements == 0 {
        DocumentStatus::Waiting
    } else if !missing_requirements.is_empty() {
        DocumentStatus::RequirementsPending
    } else if unsigned > 0 {
        DocumentStatus::SignaturesPending
    } else {
        DocumentStatus::Complete
    };

    let (progress, issue_count, description, detail_description, action_text) = match status {
        DocumentStatus::Waiting => (
            0,
            0,
            "Waiting for document requirements".to_string(),
            "Required documents will be listed here once the application has been reviewed."
                .to_string(),
            None,
        ),
        DocumentStatus::RequirementsPending => (
            ratio_progress(fulfilled_requirements, total_requirements, 75),
            missing_requirements.len(),
            format!(
                "{} of {} required documents outstanding",
                missing_requirements.len(),
                total_requirements
            ),
            format!("Outstanding: {}", missing_requirements.join(", ")),
            Some("Upload documents"),
        ),
        DocumentStatus::SignaturesPending => (
            (75 + ratio_progress(signatures_completed, signatures_required, 25)).min(99),
            unsigned,
            format!("{unsigned} document(s) awaiting signature"),
            format!(
                "Awaiting signature: {}. Applicant signatures pending: {pending_applicant_signatures}, solicitor signatures pending: {pending_solicitor_signatures}",
                awaiting.join(", ")
            ),
            Some("Sign documents"),
        ),
        DocumentStatus::Complete => (
            100,
            0,
            "All documents received and signed".to_string(),
            format!("{total_requirements} requirement(s) fulfilled"),
            None,
        ),
    };

    DocumentAnalysis {
        status,
        status_label: status.label(),
        total_requirements,
        fulfilled_requirements,
        missing_requirements,
        signatures_required,
        signatures_completed,
        pending_applicant_signatures,
        pending_solicitor_signatures,
        completed: status == DocumentStatus::Complete,
        progress,
        issue_count,
        description,
        detail_description,
        action_text,
    }
}

fn ratio_progress(done: usize, total: usize, weight: u8) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * f64::from(weight)).round() as u8
}
