use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for applications held by the portal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Advancement application as returned by `GET /api/applications/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default)]
    pub term: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_rejected: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub undertaking_ready: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loan_agreement_ready: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub deceased: Option<Deceased>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub applicants: Vec<Applicant>,
    #[serde(default)]
    pub solicitor: Option<SolicitorAssignment>,
    #[serde(default)]
    pub loan: Option<Advancement>,
}

impl Application {
    /// Application with only its id set.
    pub fn new(id: ApplicationId) -> Self {
        Self {
            id,
            amount: 0.0,
            term: None,
            is_rejected: false,
            approved: false,
            undertaking_ready: false,
            loan_agreement_ready: false,
            processing_status: ProcessingStatus::default(),
            deceased: None,
            applicants: Vec::new(),
            solicitor: None,
            loan: None,
        }
    }

    /// Deceased names with surrounding whitespace ignored; `None` when either is blank.
    pub fn deceased_name(&self) -> Option<String> {
        let deceased = self.deceased.as_ref()?;
        let first = deceased.first_name.trim();
        let last = deceased.last_name.trim();
        if first.is_empty() || last.is_empty() {
            return None;
        }
        Some(format!("{first} {last}"))
    }
}

/// Back-office confirmations recorded against an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub application_details_completed_confirmed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deceased {
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// The backend sends either the solicitor's primary key or the expanded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SolicitorAssignment {
    Id(u64),
    Detail(Solicitor),
}

impl SolicitorAssignment {
    pub fn id(&self) -> u64 {
        match self {
            Self::Id(id) => *id,
            Self::Detail(solicitor) => solicitor.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solicitor {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub own_email: Option<String>,
    #[serde(default)]
    pub own_phone_number: Option<String>,
}

/// Payload for creating or updating a solicitor attached to the current firm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolicitorInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_phone_number: Option<String>,
}

/// The loan issued against an application once it has been approved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advancement {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub fee_agreed: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount_paid: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub current_balance: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_committee_approval: bool,
    /// `None` while the committee has not decided.
    #[serde(default)]
    pub is_committee_approved: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_paid_out: bool,
    #[serde(default)]
    pub paid_out_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_settled: bool,
    #[serde(default)]
    pub settled_date: Option<NaiveDate>,
    #[serde(default)]
    pub maturity_date: Option<NaiveDate>,
}

/// Asset or liability declared for the deceased's estate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstateItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub value: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_asset: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lendable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    Applicant,
    Solicitor,
}

impl SignerRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applicant => "Applicant",
            Self::Solicitor => "Solicitor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Uploaded document metadata; the file itself stays with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    #[serde(default)]
    pub application: Option<ApplicationId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_name: String,
    /// Primary key of the document type this upload satisfies.
    #[serde(default)]
    pub document_type: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub signature_required: bool,
    #[serde(default)]
    pub who_needs_to_sign: Option<SignerRole>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_signed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_undertaking: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_loan_agreement: bool,
}

impl Document {
    pub fn awaiting_signature(&self) -> bool {
        self.signature_required && !self.is_signed
    }

    /// Undertakings and loan agreements are named by role, anything else by
    /// its uploaded file name.
    pub fn display_name(&self) -> String {
        if self.is_undertaking {
            "Solicitor undertaking".to_string()
        } else if self.is_loan_agreement {
            "Loan agreement".to_string()
        } else if self.original_name.trim().is_empty() {
            format!("Document {}", self.id)
        } else {
            self.original_name.trim().to_string()
        }
    }
}

/// A document type the back office has asked the solicitor to provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub id: u64,
    #[serde(default)]
    pub application: Option<ApplicationId>,
    pub document_type: DocumentType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub application: Option<ApplicationId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub application: ApplicationId,
    pub description: String,
    pub value: f64,
}

/// Everything the stage engine needs for one application, fetched in one go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSnapshot {
    pub application: Application,
    #[serde(default)]
    pub estate_items: Vec<EstateItem>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub requirements: Vec<DocumentRequirement>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl ApplicationSnapshot {
    pub fn new(application: Application) -> Self {
        Self {
            application,
            estate_items: Vec::new(),
            documents: Vec::new(),
            requirements: Vec::new(),
            expenses: Vec::new(),
        }
    }

    pub fn advancement(&self) -> Option<&Advancement> {
        self.application.loan.as_ref()
    }
}

/// Formats a euro amount with thousands separators, e.g. `€12,500.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}€{grouped}.{:02}", cents % 100)
}

/// Accepts numbers, decimal strings (`"1500.00"`), blanks and `null`.
pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    match Option::<RawAmount>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(RawAmount::Number(value)) => Ok(value),
        Some(RawAmount::Text(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .replace(',', "")
                .parse::<f64>()
                .map_err(|err| serde::de::Error::custom(format!("invalid amount '{raw}': {err}")))
        }
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
