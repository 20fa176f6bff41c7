//! Background consumer of click events.

use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::application::services::LinkService;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Applies a single click event to the store.
///
/// A missing link (deleted after the redirect was served) is not an error.
///
/// # Errors
///
/// Returns the store error; callers are expected to log it and move on.
pub async fn process_click_event<L>(
    link_service: &LinkService<L>,
    event: ClickEvent,
) -> Result<(), AppError>
where
    L: LinkRepository + ?Sized,
{
    let recorded = link_service
        .record_click(&event.code, event.occurred_at)
        .await?;

    if recorded {
        debug!(code = %event.code, "Click recorded");
    } else {
        debug!(code = %event.code, "Click for missing link ignored");
    }

    Ok(())
}

/// Consumes click events until every sender is dropped.
///
/// Up to `concurrency` increments run at once. Failures are logged and never
/// retried. Once the channel closes, in-flight increments are awaited before
/// the function returns, so awaiting the worker's task drains the queue.
pub async fn run_click_worker<L>(
    mut rx: mpsc::Receiver<ClickEvent>,
    link_service: Arc<LinkService<L>>,
    concurrency: usize,
) where
    L: LinkRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let link_service = link_service.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let code = event.code.clone();
            if let Err(e) = process_click_event(&link_service, event).await {
                error!(code = %code, error = %e, "Failed to record click");
            }
        });

        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished {
                error!(error = %e, "Click task panicked");
            }
        }
    }

    while let Some(finished) = tasks.join_next().await {
        if let Err(e) = finished {
            error!(error = %e, "Click task panicked");
        }
    }

    info!("Click worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_process_click_event_records_click() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_increment_clicks()
            .withf(|code, _| code == "abc123")
            .times(1)
            .returning(|_, _| Ok(true));

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = process_click_event(&service, ClickEvent::new("abc123")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_process_click_event_passes_click_time() {
        let event = ClickEvent::new("abc123");
        let occurred_at = event.occurred_at;

        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_increment_clicks()
            .withf(move |_, clicked_at| *clicked_at == occurred_at)
            .times(1)
            .returning(|_, _| Ok(true));

        let service = LinkService::new(Arc::new(mock_link_repo));

        assert!(process_click_event(&service, event).await.is_ok());
    }

    #[tokio::test]
    async fn test_process_click_event_missing_link_is_ok() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = LinkService::new(Arc::new(mock_link_repo));

        assert!(
            process_click_event(&service, ClickEvent::new("gone01"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_process_click_event_surfaces_store_error() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = process_click_event(&service, ClickEvent::new("abc123")).await;
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_worker_drains_queue_and_survives_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_increment_clicks()
            .times(10)
            .returning(move |_, _| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Err(AppError::internal("Database error", json!({})))
                } else {
                    Ok(true)
                }
            });

        let service = Arc::new(LinkService::new(Arc::new(mock_link_repo)));
        let (tx, rx) = mpsc::channel(16);
        let worker = tokio::spawn(run_click_worker(rx, service, 4));

        for _ in 0..10 {
            tx.send(ClickEvent::new("abc123")).await.unwrap();
        }
        drop(tx);

        worker.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }
}
