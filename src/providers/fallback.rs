use crate::error::RecommendError;
use crate::providers::{CompletionRequest, LlmProvider};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Successful completion and the candidate that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub model: String,
    /// Position of `model` in the candidate list; pass it as `start` next time
    pub index: usize,
}

/// Tries an ordered list of model candidates against one provider.
///
/// Each call starts at a caller-supplied offset and wraps around the list once,
/// so every candidate is attempted at most once per call. The offset of the
/// candidate that answered is returned in [`Completion::index`].
pub struct FallbackProvider {
    provider: Box<dyn LlmProvider>,
    models: Vec<String>,
}

impl FallbackProvider {
    pub fn new(provider: Box<dyn LlmProvider>, models: Vec<String>) -> Result<Self, RecommendError> {
        if models.is_empty() {
            return Err(RecommendError::BuilderError(
                "No model candidates configured".to_string(),
            ));
        }

        info!(
            "Fallback chain on '{}' with {} candidate(s)",
            provider.provider_name(),
            models.len()
        );

        Ok(FallbackProvider { provider, models })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub async fn complete(
        &self,
        request: &CompletionRequest,
        start: usize,
    ) -> Result<Completion, RecommendError> {
        let count = self.models.len();
        let mut last_error = String::new();

        for offset in 0..count {
            let index = (start + offset) % count;
            let model = &self.models[index];
            debug!(
                "Attempting completion with {} ({}/{})",
                model,
                offset + 1,
                count
            );

            match self.provider.complete(model, request).await {
                Ok(content) => {
                    info!("Completion served by {}", model);
                    return Ok(Completion {
                        content,
                        model: model.clone(),
                        index,
                    });
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    warn!("Model {} failed: {}", model, error_msg);
                    last_error = error_msg;
                }
            }
        }

        Err(RecommendError::ExhaustedCandidates(last_error))
    }
}

/// Last-success index shared between calls
#[derive(Debug, Default)]
pub struct ModelRotation(AtomicUsize);

impl ModelRotation {
    pub fn new(start: usize) -> Self {
        ModelRotation(AtomicUsize::new(start))
    }

    pub fn current(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    pub fn record(&self, index: usize) {
        self.0.store(index, Ordering::Relaxed);
    }

    /// Run `fallback` from the current offset and remember who answered.
    pub async fn complete(
        &self,
        fallback: &FallbackProvider,
        request: &CompletionRequest,
    ) -> Result<Completion, RecommendError> {
        let completion = fallback.complete(request, self.current()).await?;
        self.record(completion.index);
        Ok(completion)
    }
}
