//! Render functions for the TUI.
//!
//! One screen: profile card on top, numbered link list, the last message and
//! the command line. Every stored string passes through `util::text` before
//! it reaches a widget.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::store::{LinkItem, ThemeColor};
use crate::util::{strip_control_chars, truncate_to_width};

use super::input::InputState;

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 16;

const CARD_HEIGHT: u16 = 6;
const INPUT_HEIGHT: u16 = 3;

/// Short name for a color token, falling back to the raw token.
pub fn color_label(token: &str) -> String {
    if token == "bg-white" {
        return "white".to_string();
    }
    match ThemeColor::parse(token) {
        Some(color) => color.name().to_string(),
        None => strip_control_chars(token).into_owned(),
    }
}

/// Terminal color for a `bg-[#rrggbb]` or `bg-white` token.
pub fn token_color(token: &str) -> Color {
    if token == "bg-white" {
        return Color::White;
    }
    token
        .strip_prefix("bg-[#")
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|hex| hex.len() == 6)
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .map(|rgb| Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
        .unwrap_or(Color::Gray)
}

fn clean(s: &str, width: usize) -> String {
    let cleaned = strip_control_chars(s);
    // Single line per field
    let flat = cleaned.replace(['\n', '\t'], " ");
    truncate_to_width(&flat, width).into_owned()
}

/// Main render function.
pub fn render(f: &mut Frame, app: &App, input: &InputState) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    // Clamp before cast; at most six lines of message plus borders
    let message_height = input.message().lines().count().clamp(1, 6) as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(CARD_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(message_height),
            Constraint::Length(INPUT_HEIGHT),
        ])
        .split(area);

    render_card(f, app, chunks[0]);
    render_links(f, app, chunks[1]);
    render_message(f, input, chunks[2]);
    render_input(f, input, chunks[3]);
}

/// Profile card, bordered in the theme color.
fn render_card(f: &mut Frame, app: &App, area: Rect) {
    let profile = &app.profile;
    let theme = token_color(profile.theme_color.token());
    let inner_width = area.width.saturating_sub(2) as usize;

    let mut title = vec![Span::styled(
        format!(" {} ", clean(&profile.name, inner_width.saturating_sub(14))),
        Style::default().fg(theme).add_modifier(Modifier::BOLD),
    )];
    if app.is_editing() {
        title.push(Span::styled(
            "[EDITING] ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(clean(&profile.bio, inner_width)),
        Line::from(vec![
            Span::styled("avatar: ", label),
            Span::raw(clean(&profile.avatar_url, inner_width.saturating_sub(8))),
        ]),
        Line::from(vec![
            Span::styled("theme: ", label),
            Span::styled(profile.theme_color.name(), Style::default().fg(theme)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme))
        .title(Line::from(title));
    let card = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

fn link_item(position: usize, link: &LinkItem, width: usize) -> ListItem<'static> {
    let url_width = width / 3;
    let title_width = width.saturating_sub(url_width + 18);
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:>2}. ", position),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("■ ", Style::default().fg(token_color(&link.color))),
        Span::styled(
            clean(&link.title, title_width),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(clean(&link.url, url_width), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("  ({})", color_label(&link.color)),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

/// Numbered link list; the draft under edit sits below its link.
fn render_links(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = if app.links.is_empty() {
        vec![ListItem::new("No links")]
    } else {
        let mut items = Vec::with_capacity(app.links.len() + 1);
        for (index, link) in app.links.iter().enumerate() {
            items.push(link_item(index + 1, link, width));
            if let Some(draft) = app.draft().filter(|d| d.id == link.id) {
                let field = width.saturating_sub(40) / 2;
                items.push(ListItem::new(Line::from(Span::styled(
                    format!(
                        "    EDIT LINK > title: {} | url: {} | color: {}",
                        clean(&draft.title, field),
                        clean(&draft.url, field),
                        color_label(&draft.color)
                    ),
                    Style::default().fg(Color::Black).bg(Color::Yellow),
                ))));
            }
        }
        items
    };

    let border = if app.is_editing() {
        Color::Yellow
    } else {
        Color::Reset
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" Links ({}) ", app.links.len()));
    f.render_widget(List::new(items).block(block), area);
}

fn render_message(f: &mut Frame, input: &InputState, area: Rect) {
    let text = strip_control_chars(input.message()).into_owned();
    let style = if text.starts_with("SAVE FAILED") || text == "WRONG PASSWORD" {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let message = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(message, area);
}

/// Command line. The password prompt shows one `*` per typed character.
fn render_input(f: &mut Frame, input: &InputState, area: Rect) {
    let (title, shown) = if input.awaiting_password() {
        (
            " Password (Esc cancels) ",
            "*".repeat(input.buffer().chars().count()),
        )
    } else {
        (
            " Command (help, quit) ",
            strip_control_chars(input.buffer()).into_owned(),
        )
    };
    let width = area.width.saturating_sub(3) as usize;
    let line = Line::from(vec![
        Span::raw(truncate_to_width(&shown, width).into_owned()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(Paragraph::new(line).block(block), area);
}
