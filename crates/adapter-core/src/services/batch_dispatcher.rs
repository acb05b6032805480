//! Bounded-concurrency fan-out of independent dispatches.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream;
use serde_json::Value;
use tracing::{error, info};

use crate::domain::{BatchSummary, ForwardOutcome, HttpMethod};
use crate::error::AdapterError;
use crate::ports::{CustomHeaders, ForwardTransport};

/// Concurrency limit used when a caller does not supply one.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 3;

/// Reject concurrency limits that cannot make progress.
pub fn validate_concurrency_limit(limit: usize) -> Result<(), AdapterError> {
    if limit == 0 {
        return Err(AdapterError::Validation(
            "Concurrency limit must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Runs batches of dispatches with at most `limit` in flight.
///
/// Each dispatch runs in its own task, so a panic while handling one item is
/// turned into a failed outcome for that item only. Outcomes come back in
/// input order with `index` set to the item's position, no matter in which
/// order the dispatches finish.
#[derive(Clone)]
pub struct BatchDispatcher {
    transport: Arc<dyn ForwardTransport>,
}

impl BatchDispatcher {
    pub fn new(transport: Arc<dyn ForwardTransport>) -> Self {
        Self { transport }
    }

    pub async fn dispatch_batch(
        &self,
        url: &str,
        items: Vec<Value>,
        headers: &CustomHeaders,
        method: HttpMethod,
        limit: usize,
    ) -> Result<Vec<ForwardOutcome>, AdapterError> {
        validate_concurrency_limit(limit)?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let total = items.len();
        info!(url, total, limit, "Dispatching batch");

        let url: Arc<str> = Arc::from(url);
        let headers = Arc::new(headers.clone());

        let outcomes: Vec<ForwardOutcome> = stream::iter(items.into_iter().enumerate())
            .map(|(index, payload)| {
                let transport = Arc::clone(&self.transport);
                let url = Arc::clone(&url);
                let headers = Arc::clone(&headers);
                async move {
                    let task_url = Arc::clone(&url);
                    let task = tokio::spawn(async move {
                        transport
                            .dispatch(&task_url, &payload, &headers, method)
                            .await
                    });
                    match task.await {
                        Ok(outcome) => outcome.with_index(index),
                        Err(e) => {
                            error!(index, error = %e, "Batch item dispatch aborted");
                            ForwardOutcome::failed(&url, method, format!("Unexpected error: {e}"))
                                .with_index(index)
                        }
                    }
                }
            })
            .buffered(limit)
            .collect()
            .await;

        let summary = BatchSummary::from_outcomes(&outcomes);
        info!(
            url = %url,
            successful = summary.successful,
            total = summary.total,
            "Batch dispatch completed"
        );
        Ok(outcomes)
    }
}
