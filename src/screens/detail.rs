use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::{info, warn};
use unicode_width::UnicodeWidthStr;

use crate::api::{Outcome, Request};
use crate::blog_entry::{created_label, BlogEntry};
use crate::route::Route;
use crate::screens::header::AppHeader;
use crate::screens::{render_load_state, Command, Load};
use crate::ui;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this blog entry?";
pub const BOOKMARK_NOTICE: &str = "Bookmark was clicked.";

const TAG_GAP: &str = "  ";

/// Packs tags into rows no wider than `width`, never splitting a tag.
fn tag_lines(tags: &[String], width: u16) -> Vec<Line<'_>> {
    let width = usize::from(width);
    let gap = TAG_GAP.width();
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'_>> = Vec::new();
    let mut used = 0;
    for tag in tags {
        let tag_width = tag.width();
        if !spans.is_empty() && used + gap + tag_width > width {
            lines.push(Line::from(std::mem::take(&mut spans)));
            used = 0;
        }
        if !spans.is_empty() {
            spans.push(Span::raw(TAG_GAP));
            used += gap;
        }
        spans.push(Span::styled(tag.as_str(), Style::default().fg(Color::Cyan)));
        used += tag_width;
    }
    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

#[derive(Debug)]
pub struct DetailScreen {
    id: String,
    state: Load<BlogEntry>,
    confirming_delete: bool,
    deleting: bool,
}

impl DetailScreen {
    pub fn new(id: impl Into<String>) -> (Self, Request) {
        let id = id.into();
        let request = Request::Fetch(id.clone());
        (
            DetailScreen {
                id,
                state: Load::Loading,
                confirming_delete: false,
                deleting: false,
            },
            request,
        )
    }

    #[cfg(test)]
    pub fn state(&self) -> &Load<BlogEntry> {
        &self.state
    }

    #[cfg(test)]
    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    /// Opens the confirmation prompt. Nothing is sent until it is answered.
    pub fn delete(&mut self) -> Command {
        if matches!(self.state, Load::Ready(_)) && !self.deleting {
            self.confirming_delete = true;
        }
        Command::None
    }

    pub fn answer_delete(&mut self, confirmed: bool) -> Command {
        if !self.confirming_delete {
            return Command::None;
        }
        self.confirming_delete = false;
        if !confirmed {
            return Command::None;
        }
        self.deleting = true;
        info!(id = %self.id, "deleting blog entry");
        Command::Send(Request::Delete(self.id.clone()))
    }

    pub fn edit(&self) -> Command {
        Command::Navigate(Route::Edit(self.id.clone()))
    }

    pub fn back(&self) -> Command {
        Command::Back
    }

    /// Placeholder action: acknowledged, nothing is stored.
    pub fn bookmark(&self) -> Command {
        Command::Alert(BOOKMARK_NOTICE.to_string())
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Command {
        match (&self.state, outcome) {
            (Load::Loading, Outcome::Fetched(Ok(entry))) => {
                self.state = Load::Ready(entry);
                Command::None
            }
            (Load::Loading, Outcome::Fetched(Err(e))) => {
                warn!(id = %self.id, error = %e, "loading blog entry failed");
                self.state = Load::Failed(e.to_string());
                Command::None
            }
            (Load::Ready(_), Outcome::Deleted(Ok(()))) => {
                self.deleting = false;
                info!(id = %self.id, "blog entry deleted");
                Command::Navigate(Route::Home)
            }
            (Load::Ready(_), Outcome::Deleted(Err(e))) => {
                self.deleting = false;
                warn!(id = %self.id, error = %e, "deleting blog entry failed");
                Command::Alert(format!("Error while deleting: {e}"))
            }
            _ => Command::None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        if self.confirming_delete {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.answer_delete(true)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.answer_delete(false)
                }
                _ => Command::None,
            };
        }
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Char('d') if matches!(self.state, Load::Ready(_)) => self.delete(),
            KeyCode::Char('e') if matches!(self.state, Load::Ready(_)) => self.edit(),
            KeyCode::Char('b') if matches!(self.state, Load::Ready(_)) => self.bookmark(),
            _ => Command::None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let entry = match &self.state {
            Load::Ready(entry) => entry,
            other => return render_load_state(frame, "Blog Entry", other),
        };

        let (header, body, footer) = ui::page_layout(frame.area());
        frame.render_widget(AppHeader::new("Blog Entry"), header);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));
        let inner = block.inner(body);
        frame.render_widget(block, body);

        let tags = tag_lines(&entry.hashtags, inner.width);
        // Title, date and one content row stay visible.
        let tag_rows = u16::try_from(tags.len())
            .unwrap_or(u16::MAX)
            .min(inner.height.saturating_sub(3));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(tag_rows),
            ])
            .split(inner);

        let title = Paragraph::new(entry.title.as_str())
            .style(
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        let date = Paragraph::new(created_label(entry.time_created.as_deref(), &Local))
            .style(Style::default().fg(Color::LightCyan))
            .alignment(Alignment::Right);
        frame.render_widget(date, chunks[1]);

        let content = Paragraph::new(entry.content.as_str()).wrap(Wrap { trim: false });
        frame.render_widget(content, chunks[2]);

        frame.render_widget(Paragraph::new(tags).wrap(Wrap { trim: false }), chunks[3]);

        frame.render_widget(
            Paragraph::new(ui::key_hints(&[
                ("d", "delete"),
                ("e", "edit"),
                ("b", "bookmark"),
                ("Esc", "back"),
            ]))
            .alignment(Alignment::Center),
            footer,
        );

        if self.confirming_delete {
            ui::render_modal(frame, "Delete", DELETE_PROMPT, "y: delete, n: cancel");
        }
    }
}
