use std::path::Path;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::ClientError;
use super::pagination::{ApplicationQuery, Page};
use super::request::{ApiRequest, MultipartUpload};
use super::session::SessionTokens;
use super::{PortalClient, TOKEN_PATH};
use crate::workflows::advancement::{
    Application, ApplicationId, ApplicationSnapshot, Document, DocumentRequirement, EstateItem,
    Expense, NewExpense, SignerRole, Solicitor, SolicitorInput,
};

/// Backend summary of which requirements are still missing an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementStatusSummary {
    #[serde(default)]
    pub total_requirements: usize,
    #[serde(default)]
    pub uploaded_count: usize,
    #[serde(default)]
    pub missing_requirements: Vec<String>,
    #[serde(default)]
    pub all_uploaded: bool,
}

/// A document to attach to an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub application: ApplicationId,
    pub document_type: Option<u64>,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub async fn from_path(
        application: ApplicationId,
        document_type: Option<u64>,
        path: impl AsRef<Path>,
    ) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self {
            application,
            document_type,
            file_name,
            bytes,
        })
    }

    fn into_multipart(self) -> MultipartUpload {
        let mut fields = vec![("application".to_string(), self.application.to_string())];
        if let Some(document_type) = self.document_type {
            fields.push(("document_type".to_string(), document_type.to_string()));
        }
        MultipartUpload {
            fields,
            file_field: "document".to_string(),
            file_name: self.file_name,
            bytes: self.bytes,
        }
    }
}

/// Raw bytes of a downloaded document plus what the backend said about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedDocument {
    pub file_name: Option<String>,
    pub content_type: Option<mime::Mime>,
    pub bytes: Vec<u8>,
}

fn attachment_file_name(disposition: &str) -> Option<String> {
    disposition.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    })
}

/// Authentication and account recovery.
impl PortalClient {
    pub async fn obtain_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionTokens, ClientError> {
        let request = ApiRequest::post(TOKEN_PATH)
            .anonymous()
            .json(&json!({ "email": email, "password": password }))?;
        let tokens: SessionTokens = self.fetch_json(request).await?;
        self.session.store(tokens.clone());
        Ok(tokens)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post("api/password-reset/")
            .anonymous()
            .json(&json!({ "email": email }))?;
        self.send_empty(request).await
    }

    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let request = ApiRequest::post("api/password-reset/confirm/")
            .anonymous()
            .json(&json!({ "uid": uid, "token": token, "new_password": new_password }))?;
        self.send_empty(request).await
    }

    pub async fn activate_account(&self, uid: &str, token: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post("api/activate/")
            .anonymous()
            .json(&json!({ "uid": uid, "token": token }))?;
        self.send_empty(request).await
    }
}

/// Applications, estates and expenses.
impl PortalClient {
    pub async fn list_applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Page<Application>, ClientError> {
        let request = ApiRequest::get("api/applications/").query_pairs(query.to_pairs());
        self.fetch_json(request).await
    }

    pub async fn get_application(&self, id: ApplicationId) -> Result<Application, ClientError> {
        self.fetch_json(ApiRequest::get(format!("api/applications/{id}/")))
            .await
    }

    /// Partial update; `changes` is sent as-is.
    pub async fn patch_application(
        &self,
        id: ApplicationId,
        changes: &serde_json::Value,
    ) -> Result<Application, ClientError> {
        let _ticket = self.in_flight.begin(format!("application:{id}:patch"))?;
        let request = ApiRequest::patch(format!("api/applications/{id}/")).json(changes)?;
        self.fetch_json(request).await
    }

    pub async fn list_estate_items(
        &self,
        id: ApplicationId,
    ) -> Result<Vec<EstateItem>, ClientError> {
        self.fetch_list(ApiRequest::get(format!("api/applications/{id}/estates/")))
            .await
    }

    pub async fn list_expenses(&self, id: ApplicationId) -> Result<Vec<Expense>, ClientError> {
        self.fetch_list(ApiRequest::get("api/expenses/").query("application", id))
            .await
    }

    pub async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, ClientError> {
        let _ticket = self
            .in_flight
            .begin(format!("application:{}:expense:create", expense.application))?;
        let request = ApiRequest::post("api/expenses/").json(expense)?;
        self.fetch_json(request).await
    }

    pub async fn delete_expense(&self, expense_id: u64) -> Result<(), ClientError> {
        let _ticket = self.in_flight.begin(format!("expense:{expense_id}:delete"))?;
        self.send_empty(ApiRequest::delete(format!("api/expenses/{expense_id}/")))
            .await
    }

    /// Everything the timeline needs, fetched concurrently.
    pub async fn fetch_snapshot(
        &self,
        id: ApplicationId,
    ) -> Result<ApplicationSnapshot, ClientError> {
        let (application, estate_items, documents, requirements, expenses) = tokio::try_join!(
            self.get_application(id),
            self.list_estate_items(id),
            self.list_documents(id),
            self.list_requirements(id),
            self.list_expenses(id),
        )?;

        Ok(ApplicationSnapshot {
            application,
            estate_items,
            documents,
            requirements,
            expenses,
        })
    }
}

/// Documents and document-type requirements.
impl PortalClient {
    pub async fn list_documents(&self, id: ApplicationId) -> Result<Vec<Document>, ClientError> {
        self.fetch_list(ApiRequest::get("api/documents/").query("application", id))
            .await
    }

    pub async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ClientError> {
        let _ticket = self.in_flight.begin(format!(
            "application:{}:upload:{}",
            upload.application, upload.file_name
        ))?;
        let request = ApiRequest::post("api/documents/").multipart(upload.into_multipart());
        self.fetch_json(request).await
    }

    pub async fn download_document(
        &self,
        document_id: u64,
    ) -> Result<DownloadedDocument, ClientError> {
        let request = ApiRequest::get(format!("api/documents/{document_id}/download/"));
        let response = self.execute(&request).await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_file_name);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<mime::Mime>().ok());

        let bytes = response.bytes().await.map_err(ClientError::Network)?;
        Ok(DownloadedDocument {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    pub async fn sign_document(
        &self,
        document_id: u64,
        signer: SignerRole,
    ) -> Result<Document, ClientError> {
        let _ticket = self.in_flight.begin(format!("document:{document_id}:sign"))?;
        let request = ApiRequest::post(format!("api/documents/{document_id}/sign/"))
            .json(&json!({ "signer": signer }))?;
        self.fetch_json(request).await
    }

    pub async fn list_requirements(
        &self,
        id: ApplicationId,
    ) -> Result<Vec<DocumentRequirement>, ClientError> {
        self.fetch_list(ApiRequest::get(format!(
            "api/applications/{id}/document-requirements/"
        )))
        .await
    }

    /// Links an uploaded document to the requirement it satisfies.
    pub async fn fulfil_requirement(
        &self,
        requirement_id: u64,
        document_id: u64,
    ) -> Result<DocumentRequirement, ClientError> {
        let _ticket = self
            .in_flight
            .begin(format!("requirement:{requirement_id}:fulfil"))?;
        let request = ApiRequest::post(format!("api/document-requirements/{requirement_id}/fulfil/"))
            .json(&json!({ "document": document_id }))?;
        self.fetch_json(request).await
    }

    pub async fn requirement_status(
        &self,
        id: ApplicationId,
    ) -> Result<RequirementStatusSummary, ClientError> {
        self.fetch_json(ApiRequest::get(format!(
            "api/applications/{id}/requirement-status/"
        )))
        .await
    }
}

/// Solicitors belonging to the signed-in firm.
impl PortalClient {
    pub async fn list_solicitors(&self) -> Result<Vec<Solicitor>, ClientError> {
        self.fetch_list(ApiRequest::get("api/solicitors/")).await
    }

    pub async fn create_solicitor(&self, input: &SolicitorInput) -> Result<Solicitor, ClientError> {
        let _ticket = self.in_flight.begin(format!(
            "solicitor:create:{}:{}",
            input.first_name, input.last_name
        ))?;
        let request = ApiRequest::post("api/solicitors/").json(input)?;
        self.fetch_json(request).await
    }

    pub async fn update_solicitor(
        &self,
        solicitor_id: u64,
        input: &SolicitorInput,
    ) -> Result<Solicitor, ClientError> {
        let _ticket = self.in_flight.begin(format!("solicitor:{solicitor_id}:update"))?;
        let request = ApiRequest::put(format!("api/solicitors/{solicitor_id}/")).json(input)?;
        self.fetch_json(request).await
    }

    pub async fn delete_solicitor(&self, solicitor_id: u64) -> Result<(), ClientError> {
        let _ticket = self.in_flight.begin(format!("solicitor:{solicitor_id}:delete"))?;
        self.send_empty(ApiRequest::delete(format!("api/solicitors/{solicitor_id}/")))
            .await
    }
}
