//! Input handling: keys edit the command line, Enter runs it.
//!
//! Viewing commands work at any time. Anything that changes the page needs
//! edit mode; the password is read from the line after `edit`.

use crossterm::event::{KeyCode, KeyModifiers};

use crate::app::{DraftField, ProfileField};
use crate::session::Session;
use crate::store::{resolve_link_color, ThemeColor};
use crate::util::validate_url_for_open;

use super::commands::{parse_command, Command, HELP};
use super::Action;

const LOCKED: &str = "LOCKED // type `edit` to unlock";
const EDIT_CANCELLED: &str = "Edit cancelled";

/// Command line state that lives between keystrokes.
#[derive(Debug, Default)]
pub struct InputState {
    pub(super) awaiting_password: bool,
    pub(super) buffer: String,
    pub(super) message: String,
}

impl InputState {
    pub fn awaiting_password(&self) -> bool {
        self.awaiting_password
    }

    /// Text typed so far on the command line.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Reply to the last command, or the latest write outcome.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}

/// Handle one key press.
pub async fn handle_key(
    session: &mut Session,
    state: &mut InputState,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Action {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char(c) => {
            state.buffer.push(c);
            Action::Continue
        }
        KeyCode::Backspace => {
            state.buffer.pop();
            Action::Continue
        }
        KeyCode::Esc => {
            state.buffer.clear();
            if state.awaiting_password {
                state.awaiting_password = false;
                state.message = EDIT_CANCELLED.to_string();
            }
            Action::Continue
        }
        KeyCode::Enter => {
            let line = std::mem::take(&mut state.buffer);
            let reply = handle_line(session, state, &line).await;
            state.message = reply.text;
            reply.action
        }
        _ => Action::Continue,
    }
}

/// What to print and whether to keep going.
#[derive(Debug)]
pub struct Reply {
    pub action: Action,
    pub text: String,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Self {
            action: Action::Continue,
            text: text.into(),
        }
    }

    fn ok() -> Self {
        Self::say("")
    }
}

/// Handle one line of input.
pub async fn handle_line(session: &mut Session, state: &mut InputState, line: &str) -> Reply {
    if state.awaiting_password {
        state.awaiting_password = false;
        if line.is_empty() {
            return Reply::say(EDIT_CANCELLED);
        }
        return if session.unlock(line) {
            Reply::say("EDIT MODE // type `done` when finished")
        } else {
            Reply::say("WRONG PASSWORD")
        };
    }

    match parse_command(line) {
        Ok(Some(command)) => handle_command(session, state, command).await,
        Ok(None) => Reply::ok(),
        Err(e) => Reply::say(e.to_string()),
    }
}

/// Id of the link shown at 1-based `position`.
fn link_id(session: &Session, position: usize) -> Option<String> {
    session
        .app()
        .links
        .get(position.checked_sub(1)?)
        .map(|link| link.id.clone())
}

fn no_such_link(position: usize) -> Reply {
    Reply::say(format!("No link #{}", position))
}

async fn handle_command(session: &mut Session, state: &mut InputState, command: Command) -> Reply {
    if command.mutates() && !session.app().is_editing() {
        return Reply::say(LOCKED);
    }

    match command {
        Command::Show => Reply::ok(),
        Command::Help => Reply::say(HELP),
        Command::Quit => Reply {
            action: Action::Quit,
            text: String::new(),
        },
        Command::Open(position) => open_link(session, position),

        // --- Mode ---
        Command::Edit => {
            if session.app().is_editing() {
                return Reply::say("Already editing");
            }
            state.awaiting_password = true;
            Reply::say("Enter password (empty line or Esc cancels)")
        }
        Command::Done => {
            if !session.app().is_editing() {
                return Reply::say("Not editing");
            }
            session.finish_editing();
            Reply::say("Left edit mode")
        }

        // --- Profile ---
        Command::Name(value) => {
            session.set_profile_field(ProfileField::Name, value);
            Reply::ok()
        }
        Command::Bio(value) => {
            session.set_profile_field(ProfileField::Bio, value);
            Reply::ok()
        }
        Command::Avatar(value) => {
            session.set_profile_field(ProfileField::AvatarUrl, value);
            Reply::ok()
        }
        Command::Theme(name) => match ThemeColor::parse(&name) {
            Some(color) => {
                session.set_theme(color);
                Reply::ok()
            }
            None => {
                let names: Vec<_> = ThemeColor::ALL.iter().map(|c| c.name()).collect();
                Reply::say(format!(
                    "Unknown theme color: {} (one of {})",
                    name,
                    names.join(", ")
                ))
            }
        },
        Command::Generate(keywords) => match session.generate_bio(&keywords).await {
            Some(_) => Reply::ok(),
            None => Reply::say("Bio generator is off (set [bio] enabled = true and an API key)"),
        },

        // --- Links ---
        Command::Add => {
            session.add_link();
            Reply::ok()
        }
        Command::Select(position) => match link_id(session, position) {
            Some(id) => {
                session.begin_edit(&id);
                Reply::ok()
            }
            None => no_such_link(position),
        },
        Command::Delete(position) => match link_id(session, position) {
            Some(id) => {
                session.delete_link(&id);
                Reply::ok()
            }
            None => no_such_link(position),
        },
        Command::Move { from, to } => {
            let (Some(from_id), Some(to_id)) = (link_id(session, from), link_id(session, to))
            else {
                return Reply::say(format!("No link #{} or #{}", from, to));
            };
            session.reorder(&from_id, &to_id);
            Reply::ok()
        }

        // --- Draft ---
        Command::Title(value) => edit_draft(session, DraftField::Title, value),
        Command::Url(value) => edit_draft(session, DraftField::Url, value),
        Command::Color(name) => match resolve_link_color(&name) {
            Some(token) => edit_draft(session, DraftField::Color, token.to_string()),
            None => Reply::say(format!(
                "Unknown link color: {} (white, pink, cyan, yellow, orange, neon-green)",
                name
            )),
        },
        Command::Commit => {
            if session.app().draft().is_none() {
                return Reply::say("No link selected");
            }
            session.commit_draft();
            Reply::ok()
        }
        Command::Cancel => {
            session.cancel_draft();
            Reply::ok()
        }
    }
}

fn edit_draft(session: &mut Session, field: DraftField, value: String) -> Reply {
    if session.edit_draft(field, value) {
        Reply::ok()
    } else {
        Reply::say("No link selected (use `select <n>`)")
    }
}

fn open_link(session: &Session, position: usize) -> Reply {
    let Some(link) = position
        .checked_sub(1)
        .and_then(|i| session.app().links.get(i))
    else {
        return no_such_link(position);
    };

    let url = match validate_url_for_open(&link.url) {
        Ok(url) => url,
        Err(e) => return Reply::say(format!("Cannot open link: {}", e)),
    };

    match open::that_detached(url.as_str()) {
        Ok(()) => Reply::say(format!("Opened {}", url)),
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "Failed to launch browser");
            Reply::say(format!("Failed to open browser: {}", e))
        }
    }
}
