//! Timeline derivation scenarios exercised through the public engine API.
//!
//! Every scenario starts from a backend-shaped JSON snapshot so the serde
//! layer and the stage rules are covered together.

mod common {
    use probate_portal::workflows::advancement::ApplicationSnapshot;
    use serde_json::{json, Value};

    pub(super) fn ready_json() -> Value {
        json!({
            "application": {
                "id": 501,
                "amount": 100000,
                "is_rejected": false,
                "approved": false,
                "processing_status": { "application_details_completed_confirmed": true },
                "deceased": { "first_name": "J", "last_name": "M" },
                "applicants": [{ "id": 1, "first_name": "Niamh", "last_name": "Kelly" }],
                "solicitor": { "id": 5, "first_name": "Ciara", "last_name": "Walsh" },
                "loan": null
            },
            "estate_items": [
                { "description": "Dwelling", "value": 300000, "is_asset": true, "lendable": true }
            ],
            "documents": [],
            "requirements": [],
            "expenses": []
        })
    }

    pub(super) fn snapshot(value: Value) -> ApplicationSnapshot {
        serde_json::from_value(value).expect("snapshot deserializes")
    }

    pub(super) fn ready_snapshot() -> ApplicationSnapshot {
        snapshot(ready_json())
    }
}

use common::{ready_json, ready_snapshot, snapshot};
use probate_portal::workflows::advancement::{
    analyze_documents, build_stages, stage_enablement, validate_advance, Advancement,
    ApplicationSnapshot, DocumentStatus, EstateItem, FinalReviewState, Stage, StageId,
    TimelineReport,
};
use serde_json::json;

fn stages_for(snapshot: &ApplicationSnapshot) -> Vec<Stage> {
    build_stages(
        &snapshot.application,
        &snapshot.estate_items,
        &snapshot.documents,
        &snapshot.requirements,
        snapshot.advancement(),
    )
}

#[test]
fn repeated_derivation_is_deterministic() {
    let mut value = ready_json();
    value["application"]["amount"] = json!("175,000.00");
    value["application"]["loan"] = json!({ "id": 4, "current_balance": "12,000" });
    value["requirements"] = json!([{ "id": 1, "document_type": { "id": 9, "name": "Will" } }]);
    let snapshot = snapshot(value);

    let first = stages_for(&snapshot);
    for _ in 0..5 {
        assert_eq!(stages_for(&snapshot), first);
    }
}

#[test]
fn any_issue_disables_every_later_stage() {
    let scenarios = [
        json!(250_000),
        json!(100_000),
        json!(149_999.99),
        json!(150_000.01),
    ];

    for amount in scenarios {
        let mut value = ready_json();
        value["application"]["amount"] = amount;
        value["requirements"] = json!([{ "id": 1, "document_type": { "id": 9, "name": "Will" } }]);
        let stages = stages_for(&snapshot(value));
        let enabled = stage_enablement(&stages);
        assert_eq!(enabled.len(), stages.len());
        assert!(enabled[0]);

        for (index, stage) in stages.iter().enumerate() {
            if stage.issue_count > 0 {
                assert!(
                    enabled[index + 1..].iter().all(|flag| !flag),
                    "{:?} should lock later stages",
                    stage.id
                );
            }
        }
    }
}

#[test]
fn pending_committee_differs_from_declined_committee() {
    let mut pending = ready_snapshot();
    pending.application.approved = true;
    pending.application.loan = Some(Advancement {
        id: Some(3),
        needs_committee_approval: true,
        is_committee_approved: None,
        ..Advancement::default()
    });

    let mut declined = pending.clone();
    if let Some(loan) = declined.application.loan.as_mut() {
        loan.is_committee_approved = Some(false);
    }

    let pending_review = TimelineReport::build(&pending);
    let declined_review = TimelineReport::build(&declined);
    let pending_stage = pending_review.stage(StageId::FinalReview).expect("final review");
    let declined_stage = declined_review
        .stage(StageId::FinalReview)
        .expect("final review");

    assert_ne!(pending_stage.description, declined_stage.description);
    assert_eq!(pending_review.final_review, FinalReviewState::AwaitingCommittee);
    assert_eq!(declined_review.final_review, FinalReviewState::CommitteeRejected);
}

#[test]
fn estate_cap_boundary_is_inclusive() {
    let items = vec![EstateItem {
        value: 1000.0,
        is_asset: true,
        lendable: true,
        ..EstateItem::default()
    }];

    let at_cap = validate_advance(&items, 500.0);
    assert_eq!(at_cap.maximum_advance, 500.0);
    assert!(!at_cap.is_exceeded);

    let over = validate_advance(&items, 500.01);
    assert!(over.is_exceeded);
    assert!((over.excess_amount - 0.01).abs() < 1e-9);
}

#[test]
fn unsigned_upload_moves_documents_to_signatures() {
    let value = json!({
        "application": { "id": 8 },
        "requirements": [
            { "id": 1, "application": 8, "document_type": { "id": 20, "name": "Solicitor Undertaking" } }
        ],
        "documents": [
            {
                "id": 40,
                "application": 8,
                "original_name": "undertaking.pdf",
                "document_type": 20,
                "signature_required": true,
                "who_needs_to_sign": "solicitor",
                "is_signed": false
            }
        ]
    });
    let snapshot = snapshot(value);

    let analysis = analyze_documents(&snapshot.documents, &snapshot.requirements);
    assert_eq!(analysis.status, DocumentStatus::SignaturesPending);
    assert_eq!(analysis.pending_solicitor_signatures, 1);
    assert_eq!(analysis.pending_applicant_signatures, 0);
}

#[test]
fn advancement_stage_is_prepended_when_loan_has_an_id() {
    let base = stages_for(&ready_snapshot());

    let mut value = ready_json();
    value["application"]["loan"] = json!({ "id": 12, "amount": "100000", "is_settled": true });
    let with_loan = stages_for(&snapshot(value));

    assert_eq!(with_loan.len(), base.len() + 1);
    assert_eq!(with_loan[0].id, StageId::AdvancementDetails);
    assert_eq!(
        serde_json::to_value(&with_loan[0]).expect("stage serializes")["id"],
        "advancement_details"
    );
    assert_eq!(&with_loan[1..], &base[..]);
}

#[test]
fn ready_application_waits_on_documents_and_review() {
    let snapshot = ready_snapshot();
    let stages = stages_for(&snapshot);

    assert_eq!(stages.len(), 7);
    assert!(stages[..5].iter().all(|stage| stage.completed));
    assert_eq!(stages[5].id, StageId::Documentation);
    assert!(!stages[5].completed);
    assert_eq!(
        analyze_documents(&snapshot.documents, &snapshot.requirements).status,
        DocumentStatus::Waiting
    );
    assert_eq!(stages[6].progress, 80);
    assert!(!stages[6].completed);

    let advance = validate_advance(&snapshot.estate_items, snapshot.application.amount);
    assert_eq!(advance.maximum_advance, 150_000.0);
    assert!(!advance.is_exceeded);
}
