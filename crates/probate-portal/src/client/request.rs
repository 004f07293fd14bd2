use reqwest::{Method, Url};
use serde::Serialize;

use super::error::ClientError;

/// File part of a multipart upload, kept as owned bytes so the request can be
/// rebuilt after a token refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    pub fields: Vec<(String, String)>,
    pub file_field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartUpload),
}

/// Replayable description of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: RequestBody,
    pub(crate) authenticated: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authenticated: true,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sent without the bearer token and never retried through a refresh.
    pub(crate) fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub(crate) fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub(crate) fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body).map_err(ClientError::Decode)?);
        Ok(self)
    }

    pub(crate) fn multipart(mut self, upload: MultipartUpload) -> Self {
        self.body = RequestBody::Multipart(upload);
        self
    }

    /// The same request pointed at a list page's `next` link. Only the link's
    /// query is kept so the request stays relative to the configured base URL.
    pub(crate) fn follow_page(&self, base: &Url, next: &str) -> Result<Self, ClientError> {
        let url = base
            .join(next)
            .map_err(|err| ClientError::InvalidUrl(format!("{next}: {err}")))?;
        let mut request = self.clone();
        request.query = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Ok(request)
    }

    pub(crate) fn describe(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_link_replaces_the_query() {
        let base = Url::parse("http://backend.local/portal/").expect("base url");
        let request = ApiRequest::get("api/documents/").query("application", 7);

        let next = request
            .follow_page(
                &base,
                "http://backend.local/portal/api/documents/?application=7&page=2",
            )
            .expect("absolute link");
        assert_eq!(next.path, "api/documents/");
        assert_eq!(
            next.query,
            vec![
                ("application".to_string(), "7".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );

        let relative = request
            .follow_page(&base, "?application=7&page=3")
            .expect("relative link");
        assert_eq!(relative.query[1], ("page".to_string(), "3".to_string()));
    }
}
