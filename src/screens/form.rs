//! Title / content / tag-rows form shared by the create and edit screens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::input::TextCursor;
use crate::screens::header::AppHeader;
use crate::ui;

const MAX_VISIBLE_TAGS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Title,
    Content,
    Tag(usize),
}

impl Focus {
    pub fn next(self, tag_count: usize) -> Focus {
        match self {
            Focus::Title => Focus::Content,
            Focus::Content if tag_count > 0 => Focus::Tag(0),
            Focus::Content => Focus::Title,
            Focus::Tag(i) if i + 1 < tag_count => Focus::Tag(i + 1),
            Focus::Tag(_) => Focus::Title,
        }
    }

    pub fn prev(self, tag_count: usize) -> Focus {
        match self {
            Focus::Title if tag_count > 0 => Focus::Tag(tag_count - 1),
            Focus::Title => Focus::Content,
            Focus::Content => Focus::Title,
            Focus::Tag(0) => Focus::Content,
            Focus::Tag(i) => Focus::Tag(i - 1),
        }
    }

    /// Keeps a tag focus pointing at an existing row after removals.
    pub fn clamp(self, tag_count: usize) -> Focus {
        match self {
            Focus::Tag(_) if tag_count == 0 => Focus::Content,
            Focus::Tag(i) if i >= tag_count => Focus::Tag(tag_count - 1),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    NextField,
    PrevField,
    InsertTag,
    RemoveTag,
    Submit,
    Cancel,
    Text(KeyEvent),
}

pub fn classify(key: KeyEvent) -> FormKey {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Tab => FormKey::NextField,
        KeyCode::BackTab => FormKey::PrevField,
        KeyCode::Esc => FormKey::Cancel,
        KeyCode::Char('n') if ctrl => FormKey::InsertTag,
        KeyCode::Char('d') if ctrl => FormKey::RemoveTag,
        KeyCode::Char('s') if ctrl => FormKey::Submit,
        _ => FormKey::Text(key),
    }
}

pub struct FormView<'a> {
    pub header: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub tags: Vec<&'a str>,
    pub tags_label: &'a str,
    pub focus: Focus,
    pub cursor: TextCursor,
    pub status: Option<Line<'a>>,
    pub hints: &'a [(&'a str, &'a str)],
}

fn tag_label(index: usize) -> String {
    format!("{:>2}. ", index + 1)
}

pub fn render_form(frame: &mut Frame, view: FormView<'_>) {
    let tag_rows = view.tags.len().clamp(1, MAX_VISIBLE_TAGS) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(tag_rows + 2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(AppHeader::new(view.header), chunks[0]);

    let title = Paragraph::new(view.title)
        .block(ui::field_block("Title", view.focus == Focus::Title));
    frame.render_widget(title, chunks[1]);

    let content = Paragraph::new(view.content)
        .block(ui::field_block("Content", view.focus == Focus::Content))
        .wrap(Wrap { trim: false });
    frame.render_widget(content, chunks[2]);

    let selected = match view.focus {
        Focus::Tag(i) => Some(i),
        _ => None,
    };
    let first_visible = selected
        .map(|i| (i + 1).saturating_sub(MAX_VISIBLE_TAGS))
        .unwrap_or(0);
    let lines: Vec<Line> = view
        .tags
        .iter()
        .enumerate()
        .skip(first_visible)
        .take(MAX_VISIBLE_TAGS)
        .map(|(i, name)| {
            let style = if Some(i) == selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(tag_label(i), Style::default().fg(Color::DarkGray)),
                Span::styled(name.to_string(), style),
            ])
        })
        .collect();
    let tags = Paragraph::new(lines).block(ui::field_block(view.tags_label, selected.is_some()));
    frame.render_widget(tags, chunks[3]);

    if let Some(status) = view.status {
        frame.render_widget(Paragraph::new(status), chunks[4]);
    }
    frame.render_widget(
        Paragraph::new(ui::key_hints(view.hints)).alignment(ratatui::layout::Alignment::Center),
        chunks[5],
    );

    let (text, area, row_offset, col_offset) = match view.focus {
        Focus::Title => (view.title, chunks[1], 0, 0),
        Focus::Content => (view.content, chunks[2], 0, 0),
        Focus::Tag(i) => match view.tags.get(i) {
            Some(name) => (
                *name,
                chunks[3],
                (i - first_visible) as u16,
                tag_label(i).len() as u16,
            ),
            None => return,
        },
    };
    let (row, col) = view.cursor.screen_offset(text);
    let inner = inner_of(area);
    let x = inner.x + col_offset + col;
    let y = inner.y + row_offset + row;
    if x < inner.right() && y < inner.bottom() {
        frame.set_cursor_position(Position::new(x, y));
    }
}

fn inner_of(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}
