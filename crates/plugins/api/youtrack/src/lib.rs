//! YouTrack provider implementation for mcp-youtrack.
//!
//! This crate implements [`youtrack_core::IssueTracker`] on top of the
//! YouTrack REST API (`<instance>/api`), authenticating with a permanent
//! token sent as bearer token.

mod client;
mod types;

pub use client::YouTrackClient;
pub use types::*;
