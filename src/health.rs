use crate::api::{ApiClient, DownloadProgress, HealthReport};
use crate::error::ClientError;

/// Server-reported readiness. The client never infers this on its own; it
/// is always classified from a `/health` response (or its absence).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HealthStatus {
    /// No response, or the server reported itself unhealthy.
    #[default]
    Offline,
    ModelLoaded,
    ModelLoading {
        progress: Option<DownloadProgress>,
    },
    ModelError(String),
    ModelMissing,
}

impl HealthStatus {
    /// Map a health report to a status, in the same priority order the
    /// status indicator applies: loaded, loading, errored, missing.
    pub fn classify(report: &HealthReport) -> Self {
        if report.status != "healthy" {
            return Self::Offline;
        }
        if report.model_loaded {
            Self::ModelLoaded
        } else if report.model_loading {
            Self::ModelLoading {
                progress: report.download_progress.clone(),
            }
        } else if let Some(err) = &report.model_error {
            Self::ModelError(err.clone())
        } else {
            Self::ModelMissing
        }
    }

    /// Why a submission must not proceed, if it must not.
    pub fn submission_block(&self) -> Option<ClientError> {
        match self {
            Self::ModelLoaded => None,
            Self::ModelLoading { .. } => Some(ClientError::ModelStillLoading),
            Self::ModelError(detail) => Some(ClientError::ModelFailed(detail.clone())),
            Self::ModelMissing | Self::Offline => Some(ClientError::ModelNotDownloaded),
        }
    }
}

/// Fetch and classify in one step. Transport failures classify as
/// `Offline` instead of propagating, so pollers can call this blindly.
pub async fn fetch(api: &ApiClient) -> HealthStatus {
    match api.health().await {
        Ok(report) => HealthStatus::classify(&report),
        Err(err) => {
            tracing::debug!("health check failed: {}", err);
            HealthStatus::Offline
        }
    }
}
