use std::future::Future;
use std::pin::Pin;

use crate::error::EmbedError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A loaded vectorization model.
///
/// Implementations wrap a model that was constructed once by the hosting
/// process; this crate never loads or reloads one.
pub trait EmbeddingModel: Send + Sync {
    /// Produce a dense vector for a single text.
    fn embed(&self, text: &str) -> BoxFuture<'_, Result<Vec<f32>, EmbedError>>;

    fn name(&self) -> &'static str;
}

/// Wraps exactly one [`EmbeddingModel`] for its lifetime and exposes single
/// and batch vectorization.
pub struct EmbeddingService {
    model: Box<dyn EmbeddingModel>,
}

impl std::fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingService")
            .field("model", &self.model.name())
            .finish_non_exhaustive()
    }
}

impl EmbeddingService {
    #[must_use]
    pub fn new(model: Box<dyn EmbeddingModel>) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Generate an embedding for a single text.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying model call fails.
    pub async fn get_embedding(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.model.embed(text).await.map_err(|e| {
            tracing::error!(model = self.model.name(), "embedding failed: {e}");
            e
        })
    }

    /// Generate embeddings for a batch of texts.
    ///
    /// Output order matches input order exactly. Failure is all-or-nothing:
    /// no partial batch is ever returned.
    ///
    /// # Errors
    ///
    /// Returns the first model error encountered.
    pub async fn get_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.model.embed(text).await.map_err(|e| {
                tracing::error!(model = self.model.name(), "batch embedding failed: {e}");
                e
            })?);
        }
        Ok(vectors)
    }
}
