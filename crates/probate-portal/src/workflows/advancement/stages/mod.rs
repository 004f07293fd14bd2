mod enablement;
mod final_review;
mod rules;

pub use enablement::stage_enablement;
pub use final_review::FinalReviewState;

use serde::{Deserialize, Serialize};

use super::documents::{analyze_documents, DocumentAnalysis};
use super::domain::{Advancement, Application, Document, DocumentRequirement, EstateItem};
use super::estate::{validate_advance, AdvanceValidation};

/// Stable keys for every stage the portal timeline can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    AdvancementDetails,
    ApplicationInformation,
    ApplicantRegistration,
    LegalRepresentation,
    EstateAssessment,
    InformationVerification,
    Documentation,
    FinalReview,
}

impl StageId {
    /// Workflow order of the stages every application passes through.
    pub const fn ordered() -> [Self; 7] {
        [
            Self::ApplicationInformation,
            Self::ApplicantRegistration,
            Self::LegalRepresentation,
            Self::EstateAssessment,
            Self::InformationVerification,
            Self::Documentation,
            Self::FinalReview,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::AdvancementDetails => "advancement_details",
            Self::ApplicationInformation => "application_information",
            Self::ApplicantRegistration => "applicant_registration",
            Self::LegalRepresentation => "legal_representation",
            Self::EstateAssessment => "estate_assessment",
            Self::InformationVerification => "information_verification",
            Self::Documentation => "documentation",
            Self::FinalReview => "final_review",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::AdvancementDetails => "Advancement Details",
            Self::ApplicationInformation => "Application Information",
            Self::ApplicantRegistration => "Applicant Registration",
            Self::LegalRepresentation => "Legal Representation",
            Self::EstateAssessment => "Estate Assessment",
            Self::InformationVerification => "Information Verification",
            Self::Documentation => "Documentation & Requirements",
            Self::FinalReview => "Final Review & Approval",
        }
    }
}

/// One row of the application timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub id: StageId,
    pub title: &'static str,
    pub completed: bool,
    pub action_required: bool,
    /// Always within `0..=100`.
    pub progress: u8,
    pub description: String,
    pub detail_description: String,
    pub issue_count: usize,
    pub action_text: Option<&'static str>,
}

impl Stage {
    pub(crate) fn new(id: StageId, description: impl Into<String>) -> Self {
        Self {
            id,
            title: id.title(),
            completed: false,
            action_required: false,
            progress: 0,
            description: description.into(),
            detail_description: String::new(),
            issue_count: 0,
            action_text: None,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.issue_count > 0
    }
}

/// Builds the ordered timeline for an application snapshot.
///
/// Pure over its inputs: the same snapshot always yields the same stages, so
/// callers are free to memoize on input identity.
pub fn build_stages(
    application: &Application,
    estate_items: &[EstateItem],
    documents: &[Document],
    requirements: &[DocumentRequirement],
    advancement: Option<&Advancement>,
) -> Vec<Stage> {
    let advance = validate_advance(estate_items, application.amount);
    let documentation = analyze_documents(documents, requirements);
    assemble_stages(
        application,
        !estate_items.is_empty(),
        &advance,
        &documentation,
        advancement,
    )
}

pub(crate) fn assemble_stages(
    application: &Application,
    has_estate_items: bool,
    advance: &AdvanceValidation,
    documentation: &DocumentAnalysis,
    advancement: Option<&Advancement>,
) -> Vec<Stage> {
    let information = rules::application_information(application);
    let registration = rules::applicant_registration(application, information.completed);
    let representation = rules::legal_representation(application, registration.completed);
    let estate = rules::estate_assessment(has_estate_items, advance);
    let verification = rules::information_verification(application, estate.completed);
    let documents = rules::documentation(documentation);
    let review = rules::final_review(
        FinalReviewState::evaluate(application, advancement),
        application,
    );

    let mut stages = Vec::with_capacity(StageId::ordered().len() + 1);
    if let Some(advancement) = advancement.filter(|advancement| advancement.id.is_some()) {
        stages.push(rules::advancement_details(advancement));
    }
    stages.extend([
        information,
        registration,
        representation,
        estate,
        verification,
        documents,
        review,
    ]);
    stages
}
