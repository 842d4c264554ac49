//! MCP (Model Context Protocol) server for mcp-youtrack.
//!
//! This crate exposes YouTrack issue operations as MCP tools so AI
//! assistants can search, read and update issues.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod testing;

pub use handlers::ToolHandler;
pub use server::McpServer;
pub use tools::Tools;
