use chrono::NaiveDate;

use crate::workflows::advancement::domain::{
    Advancement, Applicant, Application, ApplicationId, ApplicationSnapshot, Deceased, Document,
    DocumentRequirement, DocumentType, EstateItem, Expense, ProcessingStatus, SignerRole,
    SolicitorAssignment,
};

pub(super) fn asset(value: f64, lendable: bool) -> EstateItem {
    EstateItem {
        id: None,
        description: "Family home".to_string(),
        value,
        is_asset: true,
        lendable,
    }
}

pub(super) fn liability(value: f64) -> EstateItem {
    EstateItem {
        id: None,
        description: "Credit card".to_string(),
        value,
        is_asset: false,
        lendable: false,
    }
}

pub(super) fn requirement(id: u64, type_id: u64, name: &str) -> DocumentRequirement {
    DocumentRequirement {
        id,
        application: Some(ApplicationId(1)),
        document_type: DocumentType {
            id: type_id,
            name: name.to_string(),
            description: String::new(),
        },
    }
}

pub(super) fn document(id: u64, type_id: Option<u64>) -> Document {
    Document {
        id,
        application: Some(ApplicationId(1)),
        original_name: format!("document-{id}.pdf"),
        document_type: type_id,
        signature_required: false,
        who_needs_to_sign: None,
        is_signed: false,
        is_undertaking: false,
        is_loan_agreement: false,
    }
}

pub(super) fn signing_document(
    id: u64,
    type_id: Option<u64>,
    signer: SignerRole,
    signed: bool,
) -> Document {
    Document {
        signature_required: true,
        who_needs_to_sign: Some(signer),
        is_signed: signed,
        ..document(id, type_id)
    }
}

/// Application that clears stages one to five with a 100k request.
pub(super) fn ready_application() -> Application {
    Application {
        amount: 100_000.0,
        approved: false,
        processing_status: ProcessingStatus {
            application_details_completed_confirmed: true,
        },
        deceased: Some(Deceased {
            first_name: "J".to_string(),
            last_name: "M".to_string(),
            date_of_death: None,
        }),
        applicants: vec![Applicant {
            id: Some(1),
            first_name: "Siobhan".to_string(),
            last_name: "Murphy".to_string(),
            email: None,
        }],
        solicitor: Some(SolicitorAssignment::Id(5)),
        ..Application::new(ApplicationId(1))
    }
}

pub(super) fn ready_snapshot() -> ApplicationSnapshot {
    ApplicationSnapshot {
        estate_items: vec![asset(300_000.0, true)],
        ..ApplicationSnapshot::new(ready_application())
    }
}

pub(super) fn advancement(id: Option<u64>) -> Advancement {
    Advancement {
        id,
        amount: 100_000.0,
        fee_agreed: 15_000.0,
        current_balance: 115_000.0,
        ..Advancement::default()
    }
}

pub(super) fn paid_out_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn expense(value: f64) -> Expense {
    Expense {
        id: None,
        application: Some(ApplicationId(1)),
        description: "Valuation fee".to_string(),
        value,
    }
}
