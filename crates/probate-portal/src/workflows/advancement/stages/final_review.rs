use serde::Serialize;

use super::super::domain::{Advancement, Application};

/// Outcome of the approval, committee and payout checks.
///
/// Branches are evaluated in a fixed precedence: rejection, approval,
/// committee decision, then payout. Once a branch matches the later ones are
/// never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalReviewState {
    Rejected,
    UnderReview,
    AwaitingCommittee,
    CommitteeRejected,
    AwaitingPayment,
    FinanceCheck,
    Complete,
}

impl FinalReviewState {
    pub fn evaluate(application: &Application, advancement: Option<&Advancement>) -> Self {
        if application.is_rejected {
            return Self::Rejected;
        }
        if !application.approved {
            return Self::UnderReview;
        }

        let Some(advancement) = advancement else {
            return Self::AwaitingPayment;
        };

        if advancement.needs_committee_approval {
            match advancement.is_committee_approved {
                None => return Self::AwaitingCommittee,
                Some(false) => return Self::CommitteeRejected,
                Some(true) => {}
            }
        }

        match (advancement.is_paid_out, advancement.paid_out_date) {
            (false, _) => Self::AwaitingPayment,
            (true, None) => Self::FinanceCheck,
            (true, Some(_)) => Self::Complete,
        }
    }

    /// A finished branch, not necessarily a successful one.
    pub const fn completed(self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::CommitteeRejected | Self::Complete
        )
    }

    pub const fn progress(self) -> u8 {
        match self {
            Self::Rejected | Self::CommitteeRejected | Self::Complete => 100,
            Self::UnderReview => 80,
            Self::AwaitingCommittee => 85,
            Self::AwaitingPayment => 92,
            Self::FinanceCheck => 96,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Rejected => "Application rejected",
            Self::UnderReview => "Under final review",
            Self::AwaitingCommittee => "Awaiting committee approval",
            Self::CommitteeRejected => "Committee rejected",
            Self::AwaitingPayment => "Awaiting payment",
            Self::FinanceCheck => "Finance team final check",
            Self::Complete => "Advancement complete",
        }
    }

    pub const fn detail_description(self) -> &'static str {
        match self {
            Self::Rejected => "The application has been declined and will not proceed.",
            Self::UnderReview => "The underwriting team is reviewing the application.",
            Self::AwaitingCommittee => "The credit committee has not yet reached a decision.",
            Self::CommitteeRejected => "The credit committee declined the advancement.",
            Self::AwaitingPayment => "The advancement is approved and queued for payout.",
            Self::FinanceCheck => "Funds are released; finance is confirming the payout date.",
            Self::Complete => "Funds have been paid out to the applicant.",
        }
    }
}
