use serde::{Deserialize, Serialize};

/// Standard paginated envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Some endpoints paginate, others return a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListPayload<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

/// Filters accepted by the application search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationQuery {
    pub page: u32,
    pub page_size: u32,
    pub status: Option<String>,
    pub id: Option<u64>,
    /// Free-text match on applicant names.
    pub search: Option<String>,
}

impl Default for ApplicationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            status: None,
            id: None,
            search: None,
        }
    }
}

impl ApplicationQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.max(1).to_string()),
            ("page_size".to_string(), self.page_size.max(1).to_string()),
        ];
        if let Some(status) = self.status.as_deref().filter(|value| !value.is_empty()) {
            pairs.push(("status".to_string(), status.to_string()));
        }
        if let Some(id) = self.id {
            pairs.push(("id".to_string(), id.to_string()));
        }
        if let Some(search) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_skips_blank_filters() {
        let query = ApplicationQuery {
            page: 0,
            search: Some("  ".to_string()),
            status: Some("approved".to_string()),
            ..ApplicationQuery::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page".to_string(), "1".to_string()),
                ("page_size".to_string(), "10".to_string()),
                ("status".to_string(), "approved".to_string()),
            ]
        );
    }

    #[test]
    fn list_payload_accepts_both_shapes() {
        let paged: ListPayload<u32> =
            serde_json::from_value(json!({ "count": 2, "results": [1, 2] })).expect("paged");
        match paged {
            ListPayload::Paged(page) => {
                assert_eq!(page.results, vec![1, 2]);
                assert!(!page.has_next());
            }
            ListPayload::Bare(_) => panic!("envelope read as bare list"),
        }

        let bare: ListPayload<u32> = serde_json::from_value(json!([3])).expect("bare");
        assert!(matches!(bare, ListPayload::Bare(rows) if rows == vec![3]));
    }
}
