use crate::infra::{parse_snapshot, AppState};
use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use probate_portal::error::AppError;
use probate_portal::workflows::advancement::{ApplicationId, TimelineReport, TimelineView};
use serde_json::json;
use tracing::info;

pub(crate) fn portal_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/timeline", post(timeline_endpoint))
        .route(
            "/api/v1/applications/:id/timeline",
            get(application_timeline_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Derives the timeline for a snapshot posted by the caller.
pub(crate) async fn timeline_endpoint(body: Bytes) -> Result<Json<TimelineView>, AppError> {
    let snapshot = parse_snapshot(&body)?;
    let report = TimelineReport::build(&snapshot);
    Ok(Json(report.view()))
}

/// Fetches the application from the portal backend, then derives its timeline.
pub(crate) async fn application_timeline_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TimelineView>, AppError> {
    let snapshot = state.portal.fetch_snapshot(ApplicationId(id)).await?;
    let report = TimelineReport::build(&snapshot);
    info!(
        application_id = id,
        status = report.status.label(),
        "timeline derived from portal backend"
    );
    Ok(Json(report.view()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use probate_portal::client::PortalClient;
    use probate_portal::config::PortalConfig;
    use std::net::SocketAddr;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(backend: &str, ready: bool) -> Router {
        let portal = PortalClient::new(&PortalConfig::local(backend)).expect("client builds");
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            portal: Arc::new(portal),
        };
        portal_routes().layer(Extension(state))
    }

    fn application_json() -> serde_json::Value {
        json!({
            "id": 7,
            "amount": "100,000.00",
            "approved": false,
            "processing_status": { "application_details_completed_confirmed": true },
            "deceased": { "first_name": "Mary", "last_name": "Byrne", "date_of_death": null },
            "applicants": [
                { "id": 1, "first_name": "Aoife", "last_name": "Byrne", "email": null }
            ],
            "solicitor": 5,
            "loan": null
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn spawn_backend(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind backend");
        let addr = listener.local_addr().expect("backend addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        addr
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_flagged() {
        let response = app("http://127.0.0.1:9", false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");

        let response = app("http://127.0.0.1:9", true)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn posted_snapshot_returns_timeline() {
        let payload = json!({
            "application": application_json(),
            "estate_items": [
                { "description": "Family home", "value": "300000", "is_asset": true, "lendable": true }
            ]
        });
        let request = Request::post("/api/v1/timeline")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request");

        let response = app("http://127.0.0.1:9", true)
            .oneshot(request)
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["application_id"], 7);
        assert_eq!(body["status"], "in_progress");
        assert_eq!(body["summary"]["overall_progress"], 83);
        assert_eq!(body["summary"]["current_stage"], "documentation");
        assert_eq!(body["stages"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn malformed_snapshot_is_a_bad_request() {
        let request = Request::post("/api/v1/timeline")
            .body(Body::from(r#"{"estate_items": []}"#))
            .expect("request");

        let response = app("http://127.0.0.1:9", true)
            .oneshot(request)
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("invalid application snapshot")));
    }

    #[tokio::test]
    async fn application_timeline_is_fetched_from_backend() {
        let backend = Router::new()
            .route(
                "/api/applications/7/",
                get(|| async { Json(application_json()) }),
            )
            .route(
                "/api/applications/7/estates/",
                get(|| async {
                    Json(json!([
                        { "id": 1, "description": "House", "value": 300000, "is_asset": true, "lendable": true }
                    ]))
                }),
            )
            .route(
                "/api/documents/",
                get(|| async { Json(json!({ "count": 0, "next": null, "previous": null, "results": [] })) }),
            )
            .route(
                "/api/applications/7/document-requirements/",
                get(|| async { Json(json!([])) }),
            )
            .route(
                "/api/expenses/",
                get(|| async {
                    Json(json!([{ "id": 3, "application": 7, "description": "Valuation", "value": "450.00" }]))
                }),
            );
        let addr = spawn_backend(backend).await;

        let response = app(&format!("http://{addr}"), true)
            .oneshot(
                Request::get("/api/v1/applications/7/timeline")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "in_progress");
        assert_eq!(body["expenses"]["count"], 1);
        assert_eq!(body["expenses"]["total"], 450.0);
        assert_eq!(body["advance"]["maximum_advance"], 150_000.0);
    }

    #[tokio::test]
    async fn backend_not_found_is_passed_through() {
        let backend = Router::new().route(
            "/api/applications/8/",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))) }),
        );
        let addr = spawn_backend(backend).await;

        let response = app(&format!("http://{addr}"), true)
            .oneshot(
                Request::get("/api/v1/applications/8/timeline")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
