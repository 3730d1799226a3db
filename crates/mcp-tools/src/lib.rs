//! MCP stdio transport: a hand-rolled newline-delimited JSON-RPC loop
//! dispatching the fixed tool table onto `noetic-core`.

pub mod protocol;
pub mod stdio;
pub mod tools;

pub use stdio::serve;
pub use tools::{dispatch, TOOL_NAMES};
