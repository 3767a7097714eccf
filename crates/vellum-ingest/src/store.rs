use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use crate::types::Metadata;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("insert error: {0}")]
    Insert(String),
}

/// Downstream persistence contract: three parallel ordered sequences, index
/// `i` of each referring to the same chunk. This crate only shapes the input;
/// indexing and similarity search live elsewhere.
pub trait DocumentStore: Send + Sync {
    fn insert_many(
        &self,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<Metadata>,
        texts: Vec<String>,
    ) -> BoxFuture<'_, Result<(), StoreError>>;
}

#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
    pub text: String,
}

/// In-process store used by tests and the dev binary.
pub struct InMemoryDocumentStore {
    records: RwLock<Vec<StoredRecord>>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of everything inserted so far, in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<StoredRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("records", &self.len())
            .finish()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn insert_many(
        &self,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<Metadata>,
        texts: Vec<String>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            if embeddings.len() != metadatas.len() || metadatas.len() != texts.len() {
                return Err(StoreError::Insert(format!(
                    "parallel sequence lengths differ: {} embeddings, {} metadatas, {} texts",
                    embeddings.len(),
                    metadatas.len(),
                    texts.len()
                )));
            }

            let mut records = self
                .records
                .write()
                .map_err(|e| StoreError::Insert(e.to_string()))?;
            for ((embedding, metadata), text) in
                embeddings.into_iter().zip(metadatas).zip(texts)
            {
                records.push(StoredRecord {
                    embedding,
                    metadata,
                    text,
                });
            }
            Ok(())
        })
    }
}
