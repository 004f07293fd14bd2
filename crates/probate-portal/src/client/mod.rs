//! Async client for the portal backend REST API.
//!
//! Every call carries the bearer token plus the tenant/country and
//! frontend-origin headers. A 401 triggers one token refresh and one replay of
//! the original request; nothing else is retried. Mutating endpoints claim an
//! in-flight key first so a double trigger is refused instead of sent twice.

mod endpoints;
mod error;
mod pagination;
mod request;
mod session;

pub use endpoints::{DocumentUpload, DownloadedDocument, RequirementStatusSummary};
pub use error::{ClientError, GENERIC_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE};
pub use pagination::{ApplicationQuery, Page};
pub use request::MultipartUpload;
pub use session::{InFlightRegistry, InFlightTicket, Session, SessionEvent, SessionTokens};

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::PortalConfig;
use error::{extract_message, is_api_key_rejection};
use pagination::ListPayload;
use request::{ApiRequest, RequestBody};

pub const COUNTRY_HEADER: &str = "Country";
pub const FRONTEND_ORIGIN_HEADER: &str = "Frontend-Host";

pub(crate) const TOKEN_PATH: &str = "api/token/";
pub(crate) const REFRESH_PATH: &str = "api/token/refresh/";

#[derive(Debug, Deserialize)]
struct RefreshedTokens {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
    country: String,
    frontend_origin: String,
    session: Arc<Session>,
    in_flight: InFlightRegistry,
    refresh_lock: Mutex<()>,
}

impl PortalClient {
    pub fn new(config: &PortalConfig) -> Result<Self, ClientError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|err| ClientError::InvalidUrl(format!("{base}: {err}")))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        let tokens = config.access_token.clone().map(|access| SessionTokens {
            access,
            refresh: config.refresh_token.clone(),
        });

        Ok(Self {
            http,
            base_url,
            country: config.country.clone(),
            frontend_origin: config.frontend_origin.clone(),
            session: Arc::new(Session::new(tokens)),
            in_flight: InFlightRegistry::default(),
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Receives `SessionEvent::LoggedOut` when the backend ends the session.
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::InvalidUrl(format!("{path}: {err}")))
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path)?)
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .header(COUNTRY_HEADER, self.country.as_str())
            .header(FRONTEND_ORIGIN_HEADER, self.frontend_origin.as_str());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if request.authenticated {
            if let Some(token) = self.session.access_token() {
                builder = builder.bearer_auth(token);
            }
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(upload) => builder.multipart(multipart_form(upload)?),
        };

        debug!(request = %request.describe(), "portal request");
        builder.send().await.map_err(ClientError::Network)
    }

    pub(crate) async fn execute(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let token_used = self.session.access_token();
        let response = self.dispatch(request).await?;

        if response.status() != StatusCode::UNAUTHORIZED
            || !request.authenticated
            || request.path == REFRESH_PATH
        {
            return self.check(request, response).await;
        }

        info!(request = %request.describe(), "access token rejected, refreshing session");
        self.refresh_session(token_used).await?;

        let replay = self.dispatch(request).await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            warn!(request = %request.describe(), "request rejected again after refresh");
            self.session.logout();
            return Err(ClientError::Unauthorized);
        }
        self.check(request, replay).await
    }

    async fn check(&self, request: &ApiRequest, response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.map_err(ClientError::Network)?;
        let message = extract_message(&body);
        warn!(request = %request.describe(), %status, %message, "portal request failed");

        if status == StatusCode::FORBIDDEN && is_api_key_rejection(&message) {
            warn!("api key rejected by backend, ending session");
            self.session.logout();
            return Err(ClientError::SessionRevoked { message });
        }

        Err(ClientError::Http { status, message })
    }

    /// Concurrent 401s share one refresh: whoever gets the lock second sees
    /// the token already changed and goes straight to its replay.
    async fn refresh_session(&self, token_used: Option<String>) -> Result<(), ClientError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.session.access_token();
        if current.is_some() && current != token_used {
            return Ok(());
        }

        let Some(refresh) = self.session.refresh_token() else {
            warn!("no refresh token available, ending session");
            self.session.logout();
            return Err(ClientError::Unauthorized);
        };

        let request = ApiRequest::post(REFRESH_PATH)
            .anonymous()
            .json(&json!({ "refresh": refresh }))?;
        let outcome = match self.dispatch(&request).await {
            Ok(response) => self.check(&request, response).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(response) => {
                let tokens: RefreshedTokens = decode(response).await?;
                self.session.refreshed(tokens.access, tokens.refresh);
                info!("session refreshed");
                Ok(())
            }
            Err(ClientError::Network(err)) => Err(ClientError::Network(err)),
            Err(err) => {
                warn!(error = %err, "session refresh rejected, ending session");
                self.session.logout();
                Err(ClientError::Unauthorized)
            }
        }
    }

    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.execute(&request).await?;
        decode(response).await
    }

    /// Collects every page of a list endpoint by following `next` links.
    pub(crate) async fn fetch_list<T: DeserializeOwned>(
        &self,
        mut request: ApiRequest,
    ) -> Result<Vec<T>, ClientError> {
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        loop {
            let page = match self.fetch_json::<ListPayload<T>>(request.clone()).await? {
                ListPayload::Bare(rows) => {
                    items.extend(rows);
                    return Ok(items);
                }
                ListPayload::Paged(page) => page,
            };
            items.extend(page.results);

            let Some(next) = page.next else {
                return Ok(items);
            };
            if !visited.insert(next.clone()) {
                warn!(request = %request.describe(), %next, "list pagination repeated a page");
                return Err(ClientError::Pagination(next));
            }
            debug!(request = %request.describe(), %next, fetched = items.len(), "following next page");
            request = request.follow_page(&self.base_url, &next)?;
        }
    }

    pub(crate) async fn send_empty(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.execute(&request).await.map(|_| ())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await.map_err(ClientError::Network)?;
    serde_json::from_slice(&bytes).map_err(ClientError::Decode)
}

fn multipart_form(upload: &MultipartUpload) -> Result<Form, ClientError> {
    let content_type = mime_guess::from_path(&upload.file_name).first_or_octet_stream();
    let part = Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(content_type.as_ref())
        .map_err(ClientError::Network)?;

    let form = upload
        .fields
        .iter()
        .fold(Form::new(), |form, (name, value)| {
            form.text(name.clone(), value.clone())
        });
    Ok(form.part(upload.file_field.clone(), part))
}
