use crate::infra::load_snapshot;
use chrono::NaiveDate;
use clap::Args;
use probate_portal::client::PortalClient;
use probate_portal::config::AppConfig;
use probate_portal::error::AppError;
use probate_portal::telemetry;
use probate_portal::workflows::advancement::{
    format_currency, Advancement, Applicant, Application, ApplicationId, ApplicationSnapshot,
    Deceased, Document, DocumentRequirement, DocumentType, EstateItem, Expense, SignerRole,
    SolicitorAssignment, TimelineReport,
};
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print each step as the JSON timeline view instead of a text summary.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TimelineArgs {
    /// Path to an application snapshot (application, estate items, documents, requirements, expenses)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Print the JSON timeline view instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct FetchArgs {
    /// Backend identifier of the application
    #[arg(long)]
    pub(crate) application_id: u64,
    /// Print the JSON timeline view instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_timeline(args: TimelineArgs) -> Result<(), AppError> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let report = TimelineReport::build(&snapshot);
    if args.json {
        print_json(&report);
    } else {
        render_timeline(&report);
    }
    Ok(())
}

pub(crate) async fn run_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let client = PortalClient::new(&config.portal)?;
    if client.session().access_token().is_none() {
        warn!("no PORTAL_ACCESS_TOKEN configured; the backend will likely reject the request");
    }

    let snapshot = client
        .fetch_snapshot(ApplicationId(args.application_id))
        .await?;
    let report = TimelineReport::build(&snapshot);
    if args.json {
        print_json(&report);
    } else {
        render_timeline(&report);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Probate advancement workflow demo");

    let mut snapshot = ApplicationSnapshot::new(Application {
        amount: 120_000.0,
        term: Some(18),
        deceased: Some(Deceased {
            first_name: "Mary".to_string(),
            last_name: "Byrne".to_string(),
            date_of_death: NaiveDate::from_ymd_opt(2024, 11, 2),
        }),
        ..Application::new(ApplicationId(1042))
    });
    step(&args, "Intake recorded, nobody registered yet", &snapshot);

    snapshot.application.applicants.push(Applicant {
        id: Some(1),
        first_name: "Aoife".to_string(),
        last_name: "Byrne".to_string(),
        email: Some("aoife.byrne@example.ie".to_string()),
    });
    snapshot.application.solicitor = Some(SolicitorAssignment::Id(5));
    snapshot.estate_items = vec![
        estate_item("Family home, Rathmines", 200_000.0, true, true),
        estate_item("Credit union loan", 8_000.0, false, false),
    ];
    step(&args, "Estate declared below the requested amount", &snapshot);

    snapshot
        .estate_items
        .push(estate_item("AIB deposit account", 60_000.0, true, true));
    snapshot
        .application
        .processing_status
        .application_details_completed_confirmed = true;
    snapshot.requirements = vec![
        requirement(1, 10, "Grant of Probate"),
        requirement(2, 11, "Solicitor Undertaking"),
    ];
    snapshot.documents = vec![document(31, 10, None)];
    step(&args, "Estate topped up, documents requested", &snapshot);

    snapshot.documents.push(document(32, 11, Some(SignerRole::Solicitor)));
    step(&args, "Undertaking uploaded, waiting on the solicitor", &snapshot);

    if let Some(undertaking) = snapshot.documents.last_mut() {
        undertaking.is_signed = true;
    }
    snapshot.application.approved = true;
    snapshot.application.loan = Some(Advancement {
        id: Some(77),
        amount: 120_000.0,
        fee_agreed: 18_000.0,
        current_balance: 138_000.0,
        needs_committee_approval: true,
        ..Advancement::default()
    });
    snapshot.expenses = vec![expense("Property valuation", 450.0)];
    step(&args, "Approved, the credit committee still has to sign off", &snapshot);

    if let Some(loan) = snapshot.application.loan.as_mut() {
        loan.is_committee_approved = Some(true);
        loan.is_paid_out = true;
        loan.paid_out_date = NaiveDate::from_ymd_opt(2025, 3, 14);
    }
    step(&args, "Committee approved and funds released", &snapshot);

    Ok(())
}

fn step(args: &DemoArgs, title: &str, snapshot: &ApplicationSnapshot) {
    println!("\n== {title}");
    let report = TimelineReport::build(snapshot);
    if args.json {
        print_json(&report);
    } else {
        render_timeline(&report);
    }
}

fn print_json(report: &TimelineReport) {
    match serde_json::to_string_pretty(&report.view()) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Timeline payload unavailable: {err}"),
    }
}

pub(crate) fn render_timeline(report: &TimelineReport) {
    let summary = report.summary();
    println!(
        "Application {} | {}",
        report.application_id,
        report.status.label()
    );
    println!(
        "- {}% overall | {} of {} stages complete | {} open issue(s)",
        summary.overall_progress,
        summary.completed_stages,
        summary.total_stages,
        summary.open_issues
    );
    if let Some(title) = summary.current_stage_title {
        println!("- Current stage: {title}");
    }
    println!(
        "- Requested {} against a maximum advance of {} ({:.0}% utilised)",
        format_currency(report.advance.requested_amount),
        format_currency(report.advance.maximum_advance),
        report.advance.utilization_percent
    );
    println!(
        "- Documents {}: {} of {} requirements met, {} of {} signatures",
        report.documents.status_label,
        report.documents.fulfilled_requirements,
        report.documents.total_requirements,
        report.documents.signatures_completed,
        report.documents.signatures_required
    );
    if report.expenses.count > 0 {
        println!(
            "- {} expense(s) totalling {}",
            report.expenses.count,
            format_currency(report.expenses.total)
        );
    }

    println!("Stages:");
    for entry in report.entries() {
        let stage = &entry.stage;
        let marker = if stage.completed {
            "done"
        } else if !entry.enabled {
            "locked"
        } else if stage.action_required {
            "action"
        } else {
            "open"
        };
        println!(
            "  [{marker:^6}] {:<30} {:>3}%  {}",
            stage.title, stage.progress, stage.description
        );
        if let (true, Some(action)) = (entry.enabled, stage.action_text) {
            println!("           next: {action}");
        }
    }
}

fn estate_item(description: &str, value: f64, is_asset: bool, lendable: bool) -> EstateItem {
    EstateItem {
        id: None,
        description: description.to_string(),
        value,
        is_asset,
        lendable,
    }
}

fn requirement(id: u64, type_id: u64, name: &str) -> DocumentRequirement {
    DocumentRequirement {
        id,
        application: Some(ApplicationId(1042)),
        document_type: DocumentType {
            id: type_id,
            name: name.to_string(),
            description: String::new(),
        },
    }
}

fn document(id: u64, type_id: u64, signer: Option<SignerRole>) -> Document {
    Document {
        id,
        application: Some(ApplicationId(1042)),
        original_name: format!("upload-{id}.pdf"),
        document_type: Some(type_id),
        signature_required: signer.is_some(),
        who_needs_to_sign: signer,
        is_signed: false,
        is_undertaking: type_id == 11,
        is_loan_agreement: false,
    }
}

fn expense(description: &str, value: f64) -> Expense {
    Expense {
        id: None,
        application: Some(ApplicationId(1042)),
        description: description.to_string(),
        value,
    }
}
