//! Shell command grammar.
//!
//! One command per line: a verb, then arguments. Link positions are 1-based,
//! matching the numbers printed next to each link.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("`{0}` needs {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("Not a link number: {0}")]
    BadPosition(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Help,
    Quit,
    Open(usize),
    /// Ask for the edit password.
    Edit,
    /// Leave edit mode.
    Done,
    Name(String),
    Bio(String),
    Avatar(String),
    Theme(String),
    Generate(String),
    Add,
    Select(usize),
    Title(String),
    Url(String),
    Color(String),
    Commit,
    Cancel,
    Delete(usize),
    Move { from: usize, to: usize },
}

impl Command {
    /// Whether the command changes the page and so needs edit mode.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::Show | Command::Help | Command::Quit | Command::Open(_) | Command::Edit | Command::Done
        )
    }
}

pub const HELP: &str = "\
VIEW      show | open <n> | help | quit
MODE      edit (asks for password) | done
PROFILE   name <text> | bio <text> | avatar <url> | theme <color> | generate <keywords>
LINKS     add | select <n> | delete <n> | move <from> <to>
DRAFT     title <text> | url <text> | color <color> | commit | cancel";

/// Parse one input line. Returns `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let text = |name: &'static str, what: &'static str| {
        if rest.is_empty() {
            Err(CommandError::MissingArgument(name, what))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "show" | "ls" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "open" => Command::Open(position("open", rest)?),
        "edit" => Command::Edit,
        "done" | "save" => Command::Done,
        // Bio may be cleared, the rest need a value
        "name" => Command::Name(text("name", "some text")?),
        "bio" => Command::Bio(rest.to_string()),
        "avatar" => Command::Avatar(text("avatar", "an image URL")?),
        "theme" => Command::Theme(text("theme", "a color")?),
        "generate" => Command::Generate(text("generate", "keywords")?),
        "add" => Command::Add,
        "select" => Command::Select(position("select", rest)?),
        "title" => Command::Title(text("title", "some text")?),
        "url" => Command::Url(text("url", "a URL")?),
        "color" => Command::Color(text("color", "a color")?),
        "commit" => Command::Commit,
        "cancel" => Command::Cancel,
        "delete" | "rm" => Command::Delete(position("delete", rest)?),
        "move" | "mv" => {
            let mut args = rest.split_whitespace();
            let (Some(from), Some(to)) = (args.next(), args.next()) else {
                return Err(CommandError::MissingArgument("move", "two link numbers"));
            };
            Command::Move {
                from: position("move", from)?,
                to: position("move", to)?,
            }
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn position(name: &'static str, arg: &str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument(name, "a link number"));
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::BadPosition(arg.to_string())),
    }
}
