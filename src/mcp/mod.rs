//! Model Context Protocol shim
//!
//! Exposes the research orchestrator as three MCP tools served over stdio.
//! The orchestrator is constructed by the caller and handed to the server;
//! the server holds no global state.

/// MCP tool router and stdio entry point.
pub mod server;

pub use server::{start_stdio_server, PlinyMcpServer};
