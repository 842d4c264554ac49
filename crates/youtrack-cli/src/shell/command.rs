//! Shell command parsing.

use std::fmt;

/// Parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help(Option<String>),
    Issues(String),
    Issue(String),
    Fields(String),
    Comments(String),
    Comment {
        issue_id: String,
        text: String,
    },
    Update {
        issue_id: String,
        field: String,
        value: String,
    },
    Quit,
}

/// Why a line could not be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Blank line
    Empty,
    /// Verb is not a known command
    Unknown(String),
    /// Known verb with missing arguments
    Usage(&'static CommandInfo),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => {
                write!(f, "Please enter a command. Type 'help' for available commands.")
            }
            ParseError::Unknown(verb) => write!(
                f,
                "Unknown command: {}. Type 'help' for available commands.",
                verb
            ),
            ParseError::Usage(info) => {
                write!(f, "{} Example: {}", info.missing_args, info.example)
            }
        }
    }
}

/// Help entry for one command.
#[derive(Debug, PartialEq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub example: &'static str,
    missing_args: &'static str,
}

pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "help",
        description: "Show help information",
        usage: "help [command]",
        example: "help issues",
        missing_args: "",
    },
    CommandInfo {
        name: "issues",
        description: "Search for issues using YouTrack query syntax",
        usage: "issues <query>",
        example: "issues project: DEMO #Unresolved",
        missing_args: "Please provide a search query.",
    },
    CommandInfo {
        name: "issue",
        description: "Get detailed information about an issue",
        usage: "issue <issue_id>",
        example: "issue DEMO-123",
        missing_args: "Please provide an issue ID.",
    },
    CommandInfo {
        name: "fields",
        description: "Get custom fields for an issue",
        usage: "fields <issue_id>",
        example: "fields DEMO-123",
        missing_args: "Please provide an issue ID.",
    },
    CommandInfo {
        name: "comments",
        description: "Get comments for an issue",
        usage: "comments <issue_id>",
        example: "comments DEMO-123",
        missing_args: "Please provide an issue ID.",
    },
    CommandInfo {
        name: "comment",
        description: "Add a comment to an issue",
        usage: "comment <issue_id> <text>",
        example: "comment DEMO-123 \"This is a comment\"",
        missing_args: "Please provide an issue ID and comment text.",
    },
    CommandInfo {
        name: "update",
        description: "Update a custom field of an issue",
        usage: "update <issue_id> <field_id> <value>",
        example: "update DEMO-123 State \"In Progress\"",
        missing_args: "Please provide an issue ID, field ID, and field value.",
    },
    CommandInfo {
        name: "quit",
        description: "Exit the shell (alias: exit)",
        usage: "quit",
        example: "quit",
        missing_args: "",
    },
];

/// Look up help for a command name, case-insensitively.
pub fn command_info(name: &str) -> Option<&'static CommandInfo> {
    let name = name.to_lowercase();
    let name = if name == "exit" { "quit" } else { name.as_str() };
    COMMANDS.iter().find(|c| c.name == name)
}

fn usage(name: &str) -> ParseError {
    match command_info(name) {
        Some(info) => ParseError::Usage(info),
        None => ParseError::Unknown(name.to_string()),
    }
}

/// A word of the input line and the byte offset where it started.
#[derive(Debug)]
struct Token {
    value: String,
    start: usize,
    /// The whole token was one quoted span
    quoted: bool,
}

/// Split on whitespace.
///
/// A quote groups words only when it opens a token and a matching quote
/// closes it at a word boundary. Any other quote is an ordinary character.
fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let remaining = line[pos..].trim_start();
        if remaining.is_empty() {
            break;
        }
        let start = line.len() - remaining.len();

        let span = remaining
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .and_then(|quote| closing_quote(&remaining[1..], quote));

        pos = match span {
            Some(len) => {
                tokens.push(Token {
                    value: remaining[1..1 + len].to_string(),
                    start,
                    quoted: true,
                });
                start + len + 2
            }
            None => {
                let len = remaining
                    .find(char::is_whitespace)
                    .unwrap_or(remaining.len());
                tokens.push(Token {
                    value: remaining[..len].to_string(),
                    start,
                    quoted: false,
                });
                start + len
            }
        };
    }

    tokens
}

/// Offset of the first `quote` in `text` followed by whitespace or the end.
fn closing_quote(text: &str, quote: char) -> Option<usize> {
    text.match_indices(quote).map(|(i, _)| i).find(|&i| {
        text[i + 1..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
    })
}

/// Argument `index` and everything after it, as typed.
///
/// Text that is exactly one quoted span is unwrapped.
fn rest(line: &str, tokens: &[Token], index: usize) -> String {
    match &tokens[index..] {
        [token] if token.quoted => token.value.clone(),
        _ => line[tokens[index].start..].trim_end().to_string(),
    }
}

/// Parse one input line.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let tokens = tokenize(line);
    let Some(first) = tokens.first() else {
        return Err(ParseError::Empty);
    };

    let verb = first.value.to_lowercase();
    let args = &tokens[1..];
    let arity = |n: usize| args.len() >= n && args[..n].iter().all(|t| !t.value.is_empty());

    let command = match verb.as_str() {
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help(args.first().map(|t| t.value.clone())),
        "issues" if arity(1) => Command::Issues(rest(line, &tokens, 1)),
        "issue" if arity(1) => Command::Issue(args[0].value.clone()),
        "fields" if arity(1) => Command::Fields(args[0].value.clone()),
        "comments" if arity(1) => Command::Comments(args[0].value.clone()),
        "comment" if arity(2) => Command::Comment {
            issue_id: args[0].value.clone(),
            text: rest(line, &tokens, 2),
        },
        "update" if arity(3) => Command::Update {
            issue_id: args[0].value.clone(),
            field: args[1].value.clone(),
            value: rest(line, &tokens, 3),
        },
        other => return Err(usage(other)),
    };

    Ok(command)
}
