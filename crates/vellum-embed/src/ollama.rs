use ollama_rs::Ollama;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};

use crate::error::EmbedError;
use crate::service::{BoxFuture, EmbeddingModel};

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Ollama,
    model: String,
}

impl OllamaEmbedder {
    #[must_use]
    pub fn new(base_url: &str, model: String) -> Self {
        let (host, port) = parse_host_port(base_url);
        Self {
            client: Ollama::new(host, port),
            model,
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl EmbeddingModel for OllamaEmbedder {
    fn embed(&self, text: &str) -> BoxFuture<'_, Result<Vec<f32>, EmbedError>> {
        let request = GenerateEmbeddingsRequest::new(
            self.model.clone(),
            EmbeddingsInput::from(text),
        );

        Box::pin(async move {
            let response = self
                .client
                .generate_embeddings(request)
                .await
                .map_err(|e| EmbedError::Request(format!("Ollama embedding request failed: {e}")))?;

            response
                .embeddings
                .into_iter()
                .next()
                .ok_or(EmbedError::EmptyResponse { provider: "ollama" })
        })
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

fn parse_host_port(url: &str) -> (String, u16) {
    let url = url.trim_end_matches('/');
    if let Some(colon_pos) = url.rfind(':') {
        let port_str = &url[colon_pos + 1..];
        if let Ok(port) = port_str.parse::<u16>() {
            let host = url[..colon_pos].to_string();
            return (host, port);
        }
    }
    (url.to_string(), 11434)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_host_port_with_port() {
        let (host, port) = parse_host_port("http://localhost:11434");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn parse_host_port_without_port() {
        let (host, port) = parse_host_port("http://localhost");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn parse_host_port_trailing_slash() {
        let (host, port) = parse_host_port("http://127.0.0.1:9999/");
        assert_eq!(host, "http://127.0.0.1");
        assert_eq!(port, 9999);
    }

    #[test]
    fn embedder_keeps_model_name() {
        let embedder = OllamaEmbedder::new("http://localhost:11434", "nomic-embed-text".into());
        assert_eq!(embedder.model(), "nomic-embed-text");
        assert_eq!(embedder.name(), "ollama");
    }

    #[tokio::test]
    async fn embed_with_unreachable_endpoint_errors() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:1", "test-model".into());
        let result = embedder.embed("hello").await;
        assert!(matches!(result, Err(EmbedError::Request(_))));
    }
}
