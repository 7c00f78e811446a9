//! Inference Batcher
//!
//! Optional throughput layer: independent requests are grouped into one
//! `predict_batch` call and every caller gets its own result back.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::invoker::WindowTensor;
use crate::model::RulModel;
use crate::InferenceError;

struct BatchRequest {
    tensor: WindowTensor,
    reply: oneshot::Sender<Result<f64, InferenceError>>,
}

/// Cloneable submission side of a running batcher
#[derive(Clone)]
pub struct BatchHandle {
    sender: mpsc::Sender<BatchRequest>,
}

impl BatchHandle {
    /// Queue one tensor and wait for its prediction
    pub async fn predict(&self, tensor: WindowTensor) -> Result<f64, InferenceError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(BatchRequest { tensor, reply })
            .await
            .map_err(|_| InferenceError::BatcherClosed)?;
        response.await.map_err(|_| InferenceError::BatcherClosed)?
    }
}

/// Inference batcher for grouping independent windows
pub struct InferenceBatcher {
    /// Channel receiver for incoming requests
    receiver: mpsc::Receiver<BatchRequest>,
    /// Batch size threshold
    batch_size: usize,
    /// Time to wait for more requests after the first (ms)
    timeout_ms: u64,
}

impl InferenceBatcher {
    /// Create a channel pair for the batcher
    pub fn channel(batch_size: usize, timeout_ms: u64) -> (BatchHandle, Self) {
        let batch_size = batch_size.max(1);
        info!(
            "Creating inference batcher: batch_size={}, timeout={}ms",
            batch_size, timeout_ms
        );
        let (sender, receiver) = mpsc::channel(batch_size * 2);
        (
            BatchHandle { sender },
            Self {
                receiver,
                batch_size,
                timeout_ms,
            },
        )
    }

    /// Run the batcher loop until every handle is dropped
    pub async fn run(mut self, model: Arc<dyn RulModel>) {
        info!("Starting inference batcher");
        let timeout_duration = Duration::from_millis(self.timeout_ms);

        loop {
            let mut batch = Vec::with_capacity(self.batch_size);

            // Wait for first item
            match self.receiver.recv().await {
                Some(request) => batch.push(request),
                None => {
                    debug!("Batcher channel closed");
                    break;
                }
            }

            // Try to collect more until batch is full or timeout
            while batch.len() < self.batch_size {
                match timeout(timeout_duration, self.receiver.recv()).await {
                    Ok(Some(request)) => batch.push(request),
                    Ok(None) => break,
                    Err(_) => break,
                }
            }

            debug!("Processing batch of {} windows", batch.len());
            let (tensors, replies): (Vec<_>, Vec<_>) =
                batch.into_iter().map(|r| (r.tensor, r.reply)).unzip();

            let model = Arc::clone(&model);
            let expected = tensors.len();
            let outcome = tokio::task::spawn_blocking(move || model.predict_batch(&tensors))
                .await
                .map_err(|e| InferenceError::InferenceFailed(e.to_string()))
                .and_then(|result| result)
                .and_then(|outputs| {
                    if outputs.len() == expected {
                        Ok(outputs)
                    } else {
                        Err(InferenceError::InferenceFailed(format!(
                            "batch returned {} outputs for {} inputs",
                            outputs.len(),
                            expected
                        )))
                    }
                });

            match outcome {
                Ok(outputs) => {
                    for (reply, value) in replies.into_iter().zip(outputs) {
                        // Caller may have gone away; nothing to do then
                        let _ = reply.send(Ok(value));
                    }
                }
                Err(e) => {
                    warn!("Batch inference failed: {}", e);
                    for reply in replies {
                        let _ = reply.send(Err(e.clone()));
                    }
                }
            }
        }

        info!("Inference batcher stopped");
    }
}
