//! HTTP transport for the `/api/v1` surface: a thin axum router over a
//! shared `NoeticService`, mirroring the stdio transport in `noetic-mcp`.

pub mod errors;
pub mod routes;
pub mod server;
pub mod types;

pub use server::ApiServer;
