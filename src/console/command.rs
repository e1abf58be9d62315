//! Shell command parsing.

use thiserror::Error;

use crate::model::{Field, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Logout,
    List { search: Option<String> },
    Refresh,
    Show { id: UserId },
    Create { fields: Vec<(Field, String)> },
    Edit { id: UserId, fields: Vec<(Field, String)> },
    Retry,
    Discard,
    Delete { id: UserId, confirmed: bool },
    Confirm,
    Cancel,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown field '{0}'. Fields: first, last, email, status, dob")]
    UnknownField(String),

    #[error("Expected key=value, got '{0}'")]
    NotAnAssignment(String),

    #[error("Unterminated quote")]
    UnterminatedQuote,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match head.to_lowercase().as_str() {
        "login" => match args {
            [email, password] => Command::Login {
                email: email.clone(),
                password: password.clone(),
            },
            _ => return Err(CommandError::Usage("login <email> <password>")),
        },
        "logout" => Command::Logout,
        "list" | "ls" => Command::List {
            search: (!args.is_empty()).then(|| args.join(" ")),
        },
        "refresh" => Command::Refresh,
        "show" => match args {
            [id] => Command::Show {
                id: UserId::new(id.as_str()),
            },
            _ => return Err(CommandError::Usage("show <id>")),
        },
        "create" | "new" => Command::Create {
            fields: parse_assignments(args)?,
        },
        "edit" => match args.split_first() {
            Some((id, rest)) => Command::Edit {
                id: UserId::new(id.as_str()),
                fields: parse_assignments(rest)?,
            },
            None => return Err(CommandError::Usage("edit <id> [key=value...]")),
        },
        "retry" => Command::Retry,
        "discard" => Command::Discard,
        "delete" | "rm" => match args {
            [id] => Command::Delete {
                id: UserId::new(id.as_str()),
                confirmed: false,
            },
            [id, flag] | [flag, id] if flag == "--yes" || flag == "-y" => Command::Delete {
                id: UserId::new(id.as_str()),
                confirmed: true,
            },
            _ => return Err(CommandError::Usage("delete <id> [--yes]")),
        },
        "yes" | "y" | "confirm" => Command::Confirm,
        "no" | "n" | "cancel" => Command::Cancel,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_assignments(args: &[String]) -> Result<Vec<(Field, String)>, CommandError> {
    args.iter()
        .map(|arg| {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| CommandError::NotAnAssignment(arg.clone()))?;
            let field =
                Field::parse(key).ok_or_else(|| CommandError::UnknownField(key.to_string()))?;
            Ok((field, value.to_string()))
        })
        .collect()
}

/// Splits on whitespace; single or double quotes group words.
fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quote.is_some() {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
