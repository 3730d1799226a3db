//! `Embedder` capability: text to vector, local by default.

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use noetic_common::types::EmbeddingHint;
use noetic_common::{Error, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str, hint: EmbeddingHint) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String], hint: EmbeddingHint) -> Result<Vec<Vec<f32>>>;
    fn dimensions(&self) -> usize;
}

enum EmbedMessage {
    Batch { texts: Vec<String>, reply: oneshot::Sender<Result<Vec<Vec<f32>>>> },
}

/// Local ONNX embedding provider. The model runs on a single dedicated
/// task so callers never contend on interior mutability around the
/// inference session; requests queue on a channel instead.
pub struct FastEmbedEmbedder {
    sender: mpsc::Sender<EmbedMessage>,
    dimensions: usize,
}

impl FastEmbedEmbedder {
    pub fn new(model_name: &str) -> Result<Self> {
        let model = resolve_model(model_name);
        let init_options = InitOptions::new(model).with_show_download_progress(false);
        let text_embedding = TextEmbedding::try_new(init_options)
            .map_err(|e| Error::ProviderUnavailable(format!("fastembed init: {e}")))?;

        let (tx, rx) = mpsc::channel(128);
        let dimensions = probe_dimensions(&text_embedding);
        tokio::spawn(run_actor(rx, text_embedding));
        Ok(Self { sender: tx, dimensions })
    }
}

fn resolve_model(name: &str) -> EmbeddingModel {
    match name {
        "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
        _ => EmbeddingModel::BGESmallENV15,
    }
}

fn probe_dimensions(model: &TextEmbedding) -> usize {
    model.embed(vec!["dimension probe"], None).ok().and_then(|v| v.first().map(Vec::len)).unwrap_or(384)
}

async fn run_actor(mut rx: mpsc::Receiver<EmbedMessage>, model: TextEmbedding) {
    while let Some(msg) = rx.recv().await {
        match msg {
            EmbedMessage::Batch { texts, reply } => {
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                let result = model
                    .embed(refs, None)
                    .map_err(|e| Error::ProviderUnavailable(format!("fastembed inference: {e}")));
                let _ = reply.send(result);
            }
        }
    }
}

#[async_trait]
impl Embedder for FastEmbedEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str, hint: EmbeddingHint) -> Result<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()], hint).await?;
        results.pop().ok_or_else(|| Error::ProviderUnavailable("fastembed returned no vector".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String], _hint: EmbeddingHint) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(EmbedMessage::Batch { texts: texts.to_vec(), reply: tx })
            .await
            .map_err(|_| Error::ProviderUnavailable("embedder actor closed".to_string()))?;
        rx.await.map_err(|_| Error::ProviderUnavailable("embedder actor dropped reply".to_string()))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
