//! Derivation engine behind the application timeline.
//!
//! Every function here is pure over a snapshot fetched from the backend: the
//! stage list, document status, estate cap and enablement flags are recomputed
//! from scratch whenever the snapshot changes and never carry state between
//! calls.

pub mod documents;
pub mod domain;
pub mod estate;
pub mod expenses;
pub mod report;
pub mod stages;

#[cfg(test)]
mod tests;

pub use documents::{analyze_documents, DocumentAnalysis, DocumentStatus};
pub use domain::{
    format_currency, Advancement, Applicant, Application, ApplicationId, ApplicationSnapshot,
    Deceased, Document, DocumentRequirement, DocumentType, EstateItem, Expense, NewExpense,
    ProcessingStatus, SignerRole, Solicitor, SolicitorAssignment, SolicitorInput,
};
pub use estate::{
    lendable_irish_estate, maximum_advance, validate_advance, AdvanceValidation, EstateTotals,
    ADVANCE_RATIO,
};
pub use expenses::ExpenseLedger;
pub use report::views::{ApplicationStatus, StageEntry, TimelineSummary, TimelineView};
pub use report::TimelineReport;
pub use stages::{build_stages, stage_enablement, FinalReviewState, Stage, StageId};
