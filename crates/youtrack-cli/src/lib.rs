//! Library part of the `mcp-youtrack` binary, shared with integration tests.

pub mod shell;
