use super::super::documents::DocumentAnalysis;
use super::super::domain::{format_currency, Advancement, Application, SolicitorAssignment};
use super::super::estate::{AdvanceValidation, ADVANCE_RATIO};
use super::final_review::FinalReviewState;
use super::{Stage, StageId};

fn blocked(id: StageId, prerequisite: StageId, detail: &str) -> Stage {
    let mut stage = Stage::new(id, format!("Complete {} first", prerequisite.title()));
    stage.detail_description = detail.to_string();
    stage
}

fn complete(mut stage: Stage) -> Stage {
    stage.completed = true;
    stage.progress = 100;
    stage
}

fn needs_action(mut stage: Stage, progress: u8, action: &'static str) -> Stage {
    stage.action_required = true;
    stage.progress = progress;
    stage.action_text = Some(action);
    stage
}

pub(super) fn application_information(application: &Application) -> Stage {
    let has_amount = application.amount > 0.0;
    let deceased = application.deceased_name();

    match (has_amount, deceased) {
        (true, Some(name)) => {
            let mut stage = Stage::new(
                StageId::ApplicationInformation,
                format!(
                    "{} requested against the estate of {name}",
                    format_currency(application.amount)
                ),
            );
            stage.detail_description = match application.term {
                Some(months) => format!("Requested term: {months} months"),
                None => "Requested term not specified".to_string(),
            };
            complete(stage)
        }
        (has_amount, deceased) => {
            let mut missing = Vec::new();
            if !has_amount {
                missing.push("requested amount");
            }
            if deceased.is_none() {
                missing.push("deceased name");
            }
            let mut stage = Stage::new(
                StageId::ApplicationInformation,
                format!("Missing {}", missing.join(" and ")),
            );
            stage.detail_description =
                "Record the requested amount and the deceased's full name.".to_string();
            let progress = if has_amount || deceased.is_some() { 50 } else { 0 };
            needs_action(stage, progress, "Complete application")
        }
    }
}

pub(super) fn applicant_registration(application: &Application, unlocked: bool) -> Stage {
    if !unlocked {
        return blocked(
            StageId::ApplicantRegistration,
            StageId::ApplicationInformation,
            "Applicants can be registered once the amount and deceased details are recorded.",
        );
    }

    if application.applicants.is_empty() {
        let mut stage = Stage::new(StageId::ApplicantRegistration, "No applicants registered");
        stage.detail_description = "Add the personal representative applying for the advancement."
            .to_string();
        return needs_action(stage, 0, "Add applicant");
    }

    let names: Vec<String> = application
        .applicants
        .iter()
        .map(|applicant| {
            format!("{} {}", applicant.first_name.trim(), applicant.last_name.trim())
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .collect();
    let mut stage = Stage::new(
        StageId::ApplicantRegistration,
        format!("{} applicant(s) registered", application.applicants.len()),
    );
    stage.detail_description = names.join(", ");
    complete(stage)
}

pub(super) fn legal_representation(application: &Application, unlocked: bool) -> Stage {
    if !unlocked {
        return blocked(
            StageId::LegalRepresentation,
            StageId::ApplicantRegistration,
            "A solicitor can be assigned once an applicant is registered.",
        );
    }

    match &application.solicitor {
        None => {
            let mut stage = Stage::new(StageId::LegalRepresentation, "No solicitor assigned");
            stage.detail_description =
                "Assign the solicitor handling the estate for this application.".to_string();
            needs_action(stage, 0, "Assign solicitor")
        }
        Some(SolicitorAssignment::Detail(solicitor)) => {
            let mut stage = Stage::new(StageId::LegalRepresentation, "Solicitor assigned");
            stage.detail_description = format!(
                "{} {}",
                solicitor.first_name.trim(),
                solicitor.last_name.trim()
            )
            .trim()
            .to_string();
            complete(stage)
        }
        Some(SolicitorAssignment::Id(_)) => {
            complete(Stage::new(StageId::LegalRepresentation, "Solicitor assigned"))
        }
    }
}

pub(super) fn estate_assessment(has_estate_items: bool, advance: &AdvanceValidation) -> Stage {
    if !has_estate_items {
        let mut stage = Stage::new(StageId::EstateAssessment, "No estate data yet");
        stage.detail_description =
            "Add the estate's assets and liabilities to calculate the maximum advance."
                .to_string();
        return needs_action(stage, 0, "Add estate items");
    }

    let cap_detail = format!(
        "Maximum advance is {} ({:.0}% of a lendable Irish estate of {}).",
        format_currency(advance.maximum_advance),
        ADVANCE_RATIO * 100.0,
        format_currency(advance.lendable_irish_estate)
    );

    if advance.is_exceeded {
        let mut stage = Stage::new(
            StageId::EstateAssessment,
            format!(
                "Requested amount exceeds the maximum advance by {}",
                format_currency(advance.excess_amount)
            ),
        );
        stage.detail_description = cap_detail;
        stage.issue_count = 1;
        return needs_action(stage, 50, "Review estate");
    }

    let mut stage = Stage::new(
        StageId::EstateAssessment,
        format!(
            "Requested amount within limit ({:.0}% of maximum advance)",
            advance.utilization_percent
        ),
    );
    stage.detail_description = cap_detail;
    complete(stage)
}

/// `estate_clear` means the estate stage completed without an excess.
pub(super) fn information_verification(application: &Application, estate_clear: bool) -> Stage {
    if !estate_clear {
        return blocked(
            StageId::InformationVerification,
            StageId::EstateAssessment,
            "Details can be verified once the estate supports the requested amount.",
        );
    }

    if application
        .processing_status
        .application_details_completed_confirmed
    {
        let mut stage = Stage::new(
            StageId::InformationVerification,
            "Application details confirmed",
        );
        stage.detail_description = "The information provided has been verified.".to_string();
        return complete(stage);
    }

    let mut stage = Stage::new(
        StageId::InformationVerification,
        "Awaiting confirmation of application details",
    );
    stage.detail_description =
        "Review the application and confirm the details are complete and accurate.".to_string();
    needs_action(stage, 50, "Confirm details")
}

pub(super) fn documentation(analysis: &DocumentAnalysis) -> Stage {
    let mut stage = Stage::new(StageId::Documentation, analysis.description.clone());
    stage.detail_description = analysis.detail_description.clone();
    stage.completed = analysis.completed;
    stage.progress = analysis.progress;
    stage.issue_count = analysis.issue_count;
    stage.action_text = analysis.action_text;
    stage.action_required = analysis.action_text.is_some();
    stage
}

pub(super) fn final_review(state: FinalReviewState, application: &Application) -> Stage {
    let mut stage = Stage::new(StageId::FinalReview, state.description());
    stage.detail_description = state.detail_description().to_string();
    if state == FinalReviewState::AwaitingPayment {
        let mut outstanding = Vec::new();
        if !application.undertaking_ready {
            outstanding.push("solicitor undertaking");
        }
        if !application.loan_agreement_ready {
            outstanding.push("loan agreement");
        }
        if !outstanding.is_empty() {
            stage.detail_description = format!(
                "{} Payout waits on the {}.",
                stage.detail_description,
                outstanding.join(" and ")
            );
        }
    }
    stage.completed = state.completed();
    stage.progress = state.progress();
    stage
}

pub(super) fn advancement_details(advancement: &Advancement) -> Stage {
    let description = if advancement.is_settled {
        match advancement.settled_date {
            Some(date) => format!("Advancement settled on {date}"),
            None => "Advancement settled".to_string(),
        }
    } else {
        format!(
            "Outstanding balance {}",
            format_currency(advancement.current_balance)
        )
    };

    let mut stage = Stage::new(StageId::AdvancementDetails, description);
    stage.detail_description = format!(
        "Advanced {}, fee {}, repaid {}",
        format_currency(advancement.amount),
        format_currency(advancement.fee_agreed),
        format_currency(advancement.amount_paid)
    );
    complete(stage)
}
