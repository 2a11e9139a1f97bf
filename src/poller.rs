use crate::api::ApiClient;
use crate::health;
use crate::session::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to a repeating background task. Dropping it aborts the task, so
/// holding at most one handle per poller kind guarantees at most one live
/// poller of that kind.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Periodic `/health` poll. Lives for the whole session; every tick sends
/// one `SessionEvent::Health`, with transport failures mapped to
/// `Offline` by [`health::fetch`].
pub fn spawn_health_poller(
    api: ApiClient,
    period: Duration,
    events: mpsc::Sender<SessionEvent>,
) -> PollerHandle {
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let status = health::fetch(&api).await;
            if events.send(SessionEvent::Health(status)).await.is_err() {
                break;
            }
        }
    });
    tracing::debug!("health poller started (every {:?})", period);
    PollerHandle::new(task)
}

/// Periodic `/api/download-progress` poll, alive from download start until
/// the server reports the model loaded. The final report is still
/// delivered before the loop ends; the session drops the handle on
/// receipt, so the poller stops exactly once and never ticks again.
/// Transport errors on a tick are skipped and the next tick retries.
pub fn spawn_download_poller(
    api: ApiClient,
    period: Duration,
    events: mpsc::Sender<SessionEvent>,
) -> PollerHandle {
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match api.download_progress().await {
                Ok(report) => {
                    let loaded = report.model_loaded;
                    if events
                        .send(SessionEvent::DownloadProgress(report))
                        .await
                        .is_err()
                    {
                        break;
                    }
                    if loaded {
                        tracing::debug!("model loaded, download poller stopping");
                        break;
                    }
                }
                Err(err) => {
                    tracing::debug!("progress check failed, will retry: {}", err);
                }
            }
        }
    });
    tracing::debug!("download poller started (every {:?})", period);
    PollerHandle::new(task)
}

/// One-shot health refresh, used after the model finishes loading and for
/// the on-demand `status` command.
pub fn spawn_health_refresh(api: ApiClient, events: mpsc::Sender<SessionEvent>) {
    tokio::spawn(async move {
        let status = health::fetch(&api).await;
        let _ = events.send(SessionEvent::Health(status)).await;
    });
}
