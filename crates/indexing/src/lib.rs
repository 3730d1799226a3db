//! Embedding, chunking, and eviction: the capabilities that turn raw
//! fetched content into durable, queryable `VectorStore` entries.

pub mod chunk_service;
pub mod chunker;
pub mod embedder;
pub mod eviction;

pub use chunk_service::{ChunkOutcome, ChunkService};
pub use chunker::{Chunk, Chunker};
pub use embedder::{Embedder, FastEmbedEmbedder};
pub use eviction::{EvictionReport, EvictionService};
