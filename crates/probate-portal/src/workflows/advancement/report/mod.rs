pub mod views;

use super::documents::{analyze_documents, DocumentAnalysis};
use super::domain::{ApplicationId, ApplicationSnapshot};
use super::estate::{validate_advance, AdvanceValidation};
use super::expenses::ExpenseLedger;
use super::stages::{assemble_stages, stage_enablement, FinalReviewState, Stage, StageId};
use views::{ApplicationStatus, StageEntry, TimelineSummary, TimelineView};

/// Every derived view of one application snapshot, computed in a single pass.
#[derive(Debug, Clone)]
pub struct TimelineReport {
    pub application_id: ApplicationId,
    pub stages: Vec<Stage>,
    pub enabled: Vec<bool>,
    pub documents: DocumentAnalysis,
    pub advance: AdvanceValidation,
    pub expenses: ExpenseLedger,
    pub final_review: FinalReviewState,
    pub status: ApplicationStatus,
}

impl TimelineReport {
    pub fn build(snapshot: &ApplicationSnapshot) -> Self {
        let application = &snapshot.application;
        let advancement = snapshot.advancement();

        let advance = validate_advance(&snapshot.estate_items, application.amount);
        let documents = analyze_documents(&snapshot.documents, &snapshot.requirements);
        let stages = assemble_stages(
            application,
            !snapshot.estate_items.is_empty(),
            &advance,
            &documents,
            advancement,
        );
        let enabled = stage_enablement(&stages);

        let final_review = FinalReviewState::evaluate(application, advancement);
        let prerequisites_complete = stages
            .iter()
            .filter(|stage| {
                !matches!(stage.id, StageId::FinalReview | StageId::AdvancementDetails)
            })
            .all(|stage| stage.completed);
        let status = ApplicationStatus::derive(final_review, advancement, prerequisites_complete);

        Self {
            application_id: application.id,
            stages,
            enabled,
            documents,
            advance,
            expenses: ExpenseLedger::from_expenses(&snapshot.expenses),
            final_review,
            status,
        }
    }

    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == id)
    }

    pub fn is_enabled(&self, id: StageId) -> bool {
        self.stages
            .iter()
            .position(|stage| stage.id == id)
            .and_then(|index| self.enabled.get(index).copied())
            .unwrap_or(false)
    }

    pub fn entries(&self) -> Vec<StageEntry> {
        self.stages
            .iter()
            .zip(&self.enabled)
            .map(|(stage, enabled)| StageEntry {
                stage: stage.clone(),
                enabled: *enabled,
            })
            .collect()
    }

    pub fn summary(&self) -> TimelineSummary {
        let total_stages = self.stages.len();
        let overall_progress = if total_stages > 0 {
            let sum: u32 = self.stages.iter().map(|stage| u32::from(stage.progress)).sum();
            (sum as f32 / total_stages as f32).round().clamp(0.0, 100.0) as u8
        } else {
            0
        };

        let current = self
            .stages
            .iter()
            .zip(&self.enabled)
            .find(|(stage, enabled)| **enabled && !stage.completed)
            .map(|(stage, _)| stage.id);

        TimelineSummary {
            overall_progress,
            completed_stages: self.stages.iter().filter(|stage| stage.completed).count(),
            total_stages,
            open_issues: self.stages.iter().map(|stage| stage.issue_count).sum(),
            current_stage: current,
            current_stage_title: current.map(StageId::title),
        }
    }

    pub fn view(&self) -> TimelineView {
        TimelineView {
            application_id: self.application_id,
            status: self.status,
            status_label: self.status.label(),
            final_review: self.final_review,
            summary: self.summary(),
            stages: self.entries(),
            documents: self.documents.clone(),
            advance: self.advance,
            expenses: self.expenses,
        }
    }
}
