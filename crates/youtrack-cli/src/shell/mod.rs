//! Interactive shell over the tracker.
//!
//! One dispatcher serves both modes; the [`ShellBackend`] decides whether
//! commands go straight to the tracker or through the MCP tool layer.

mod backend;
mod command;

pub use backend::{DirectBackend, ShellBackend, ToolsBackend};
pub use command::{command_info, parse, Command, CommandInfo, ParseError, COMMANDS};

use std::io;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PROMPT: &str = "youtrack> ";

/// Result of processing one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Print the output and read the next line
    Continue(String),
    /// Print the output and stop
    Quit(String),
}

impl Step {
    pub fn output(&self) -> &str {
        match self {
            Step::Continue(out) | Step::Quit(out) => out,
        }
    }
}

/// Interactive command dispatcher.
pub struct Shell<B> {
    backend: B,
}

impl<B: ShellBackend> Shell<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Process one input line.
    pub async fn execute(&self, line: &str) -> Step {
        let command = match parse(line) {
            Ok(command) => command,
            Err(e) => return Step::Continue(e.to_string()),
        };

        tracing::debug!(?command, "shell command");

        let output = match command {
            Command::Quit => return Step::Quit("Exiting interactive shell...".to_string()),
            Command::Help(topic) => help(topic.as_deref()),
            Command::Issues(query) => {
                render(self.backend.issues(&query).await, || "No issues found.".to_string())
            }
            Command::Issue(issue_id) => render(self.backend.issue(&issue_id).await, || {
                format!("Issue {} not found.", issue_id)
            }),
            Command::Fields(issue_id) => render(self.backend.fields(&issue_id).await, || {
                format!("No custom fields found for issue {}.", issue_id)
            }),
            Command::Comments(issue_id) => render(self.backend.comments(&issue_id).await, || {
                format!("No comments found for issue {}.", issue_id)
            }),
            Command::Comment { issue_id, text } => {
                render(self.backend.comment(&issue_id, &text).await, String::new)
            }
            Command::Update {
                issue_id,
                field,
                value,
            } => render(
                self.backend
                    .update(&issue_id, &field, update_value(&value))
                    .await,
                String::new,
            ),
        };

        Step::Continue(output)
    }

    /// Read commands from `input` until `quit` or end of input.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        let banner = format!(
            "=== YouTrack Interactive Shell ({} mode) ===\n\
             Type 'help' for available commands or 'quit' to exit.\n",
            self.backend.mode()
        );
        output.write_all(banner.as_bytes()).await?;

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                output.write_all(b"\nEOF detected. Exiting...\n").await?;
                break;
            };

            let step = self.execute(&line).await;
            output.write_all(step.output().as_bytes()).await?;
            output.write_all(b"\n").await?;

            if let Step::Quit(_) = step {
                break;
            }
        }

        output.flush().await
    }
}

/// Update values that look like JSON objects or arrays are sent as JSON;
/// everything else is sent as a string.
fn update_value(raw: &str) -> Value {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str(raw) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

fn render(result: youtrack_core::Result<Value>, empty: impl FnOnce() -> String) -> String {
    match result {
        Ok(value) if is_empty(&value) => empty(),
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|e| format!("Error: {}", e)),
        Err(e) => {
            tracing::debug!("shell command failed: {}", e);
            format!("Error: {}", e)
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn help(topic: Option<&str>) -> String {
    match topic {
        None => {
            let mut text = String::from("Available commands:\n\n");
            for info in COMMANDS {
                text.push_str(&format!("{}: {}\n", info.name, info.description));
            }
            text.push_str("\nType 'help <command>' for more information about a specific command.");
            text
        }
        Some(name) => match command_info(name) {
            Some(info) => format!(
                "Command: {}\nDescription: {}\nUsage: {}\nExample: {}",
                info.name, info.description, info.usage, info.example
            ),
            None => format!(
                "Unknown command: {}. Type 'help' for available commands.",
                name.to_lowercase()
            ),
        },
    }
}
