use super::super::documents::DocumentAnalysis;
use super::super::domain::{Advancement, ApplicationId};
use super::super::estate::AdvanceValidation;
use super::super::expenses::ExpenseLedger;
use super::super::stages::{FinalReviewState, Stage, StageId};
use serde::Serialize;

/// Headline status used by application lists and the timeline header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    InProgress,
    UnderReview,
    AwaitingCommittee,
    Rejected,
    CommitteeRejected,
    AwaitingPayment,
    PaidOut,
    Settled,
}

impl ApplicationStatus {
    pub fn derive(
        review: FinalReviewState,
        advancement: Option<&Advancement>,
        prerequisites_complete: bool,
    ) -> Self {
        match review {
            FinalReviewState::Rejected => Self::Rejected,
            FinalReviewState::CommitteeRejected => Self::CommitteeRejected,
            FinalReviewState::UnderReview if prerequisites_complete => Self::UnderReview,
            FinalReviewState::UnderReview => Self::InProgress,
            FinalReviewState::AwaitingCommittee => Self::AwaitingCommittee,
            FinalReviewState::AwaitingPayment | FinalReviewState::FinanceCheck => {
                Self::AwaitingPayment
            }
            FinalReviewState::Complete => {
                if advancement.is_some_and(|advancement| advancement.is_settled) {
                    Self::Settled
                } else {
                    Self::PaidOut
                }
            }
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::UnderReview => "Under Review",
            Self::AwaitingCommittee => "Awaiting Committee",
            Self::Rejected => "Rejected",
            Self::CommitteeRejected => "Committee Rejected",
            Self::AwaitingPayment => "Awaiting Payment",
            Self::PaidOut => "Paid Out",
            Self::Settled => "Settled",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageEntry {
    #[serde(flatten)]
    pub stage: Stage,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSummary {
    pub overall_progress: u8,
    pub completed_stages: usize,
    pub total_stages: usize,
    pub open_issues: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<StageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stage_title: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineView {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub final_review: FinalReviewState,
    pub summary: TimelineSummary,
    pub stages: Vec<StageEntry>,
    pub documents: DocumentAnalysis,
    pub advance: AdvanceValidation,
    pub expenses: ExpenseLedger,
}
