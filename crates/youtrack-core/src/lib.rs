//! Core traits, types, and error handling for mcp-youtrack.
//!
//! This crate provides the foundational abstractions shared by the YouTrack
//! client, the MCP server, and the interactive shell.

pub mod config;
pub mod error;
pub mod tracker;
pub mod types;

pub use config::{Config, TrackerConfig};
pub use error::{Error, Result};
pub use tracker::IssueTracker;
pub use types::{Comment, CustomField, Issue, IssueLink, LinkedIssue, Project, Tag, User};
