//! The `VectorStore` capability and its backends.

pub mod entry;
pub mod local;
pub mod remote;
pub mod store;

pub use entry::{VectorEntry, VectorMatch};
pub use local::LocalVectorStore;
pub use remote::{QdrantVectorStore, UnavailableVectorStore};
pub use store::VectorStore;

use noetic_common::config::{NoeticConfig, StoreBackend, StoreMode};
use noetic_common::Result;
use std::sync::Arc;

/// Build the configured store. Server mode always gets a single writable
/// directory; agent mode additionally wires a read-only shared tier under
/// the data root's `shared/` subdirectory.
pub fn build_store(config: &NoeticConfig) -> Result<Arc<dyn VectorStore>> {
    let data_root = NoeticConfig::data_root();
    match config.store.backend {
        StoreBackend::Local => match config.store.mode {
            StoreMode::Server => Ok(Arc::new(LocalVectorStore::server(data_root.join("index")))),
            StoreMode::Agent => {
                let agent_id = config.store.agent_id.clone().unwrap_or_else(|| "default".to_string());
                let agent_dir = data_root.join("agents").join(agent_id);
                let shared_dir = data_root.join("shared");
                Ok(Arc::new(LocalVectorStore::agent(agent_dir, shared_dir)))
            }
        },
        StoreBackend::Qdrant => {
            let url = config.store.remote_url.clone().unwrap_or_else(|| "http://localhost:6334".to_string());
            Ok(Arc::new(QdrantVectorStore::new(&url, "noetic", config.store.vector_dim as u64)?))
        }
        StoreBackend::Pinecone => Ok(Arc::new(UnavailableVectorStore::new("pinecone"))),
        StoreBackend::Weaviate => Ok(Arc::new(UnavailableVectorStore::new("weaviate"))),
        StoreBackend::Milvus => Ok(Arc::new(UnavailableVectorStore::new("milvus"))),
    }
}
