//! Test-only mock embedding model.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::EmbedError;
use crate::service::{BoxFuture, EmbeddingModel};

/// Deterministic in-process model: the first vector component encodes the
/// text's character count so tests can tell inputs apart.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
    fail_after: Option<usize>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            dimensions: 384,
            fail_after: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            ..Self::default()
        }
    }

    /// Fails on the very first call.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_after: Some(0),
            ..Self::default()
        }
    }

    /// Succeeds for `calls` calls, then fails every call after.
    #[must_use]
    pub fn failing_after(calls: usize) -> Self {
        Self {
            fail_after: Some(calls),
            ..Self::default()
        }
    }

    /// Number of embed calls made so far, shared across clones.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingModel for MockEmbedder {
    fn embed(&self, text: &str) -> BoxFuture<'_, Result<Vec<f32>, EmbedError>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let fail = self.fail_after.is_some_and(|n| call >= n);
        let mut vector = vec![0.1; self.dimensions];
        if let Some(first) = vector.first_mut() {
            #[allow(clippy::cast_precision_loss)]
            {
                *first = text.chars().count() as f32 / 1000.0;
            }
        }
        Box::pin(async move {
            if fail {
                return Err(EmbedError::Request("mock embedding error".into()));
            }
            Ok(vector)
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
