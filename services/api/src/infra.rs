use metrics_exporter_prometheus::PrometheusHandle;
use probate_portal::client::PortalClient;
use probate_portal::error::AppError;
use probate_portal::workflows::advancement::ApplicationSnapshot;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) portal: Arc<PortalClient>,
}

pub(crate) fn parse_snapshot(raw: &[u8]) -> Result<ApplicationSnapshot, AppError> {
    Ok(serde_json::from_slice(raw)?)
}

pub(crate) fn load_snapshot(path: &Path) -> Result<ApplicationSnapshot, AppError> {
    let raw = std::fs::read(path)?;
    parse_snapshot(&raw)
}
