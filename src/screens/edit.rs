use chrono::{DateTime, Utc};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Alignment,
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};
use tracing::{info, warn};

use crate::api::{Outcome, Request};
use crate::blog_entry::BlogEntry;
use crate::input::TextCursor;
use crate::route::Route;
use crate::screens::form::{self, Focus, FormKey, FormView};
use crate::screens::{render_load_state, Command, Load};
use crate::tags;

/// Longest tag the edit form accepts.
pub const MAX_TAG_CHARS: usize = 20;

const HINTS: &[(&str, &str)] = &[
    ("Tab", "next field"),
    ("Ctrl-N", "add tag"),
    ("Ctrl-D", "remove tag"),
    ("Ctrl-S", "save"),
    ("Esc", "discard"),
];

/// Editable copy of a fetched entry next to the last persisted version.
#[derive(Debug)]
pub struct EditForm {
    persisted: BlogEntry,
    draft: BlogEntry,
    focus: Focus,
    cursor: TextCursor,
    submitting: bool,
    /// Replacement sent by the save in flight.
    in_flight: Option<BlogEntry>,
    save_error: Option<String>,
}

impl EditForm {
    fn new(entry: BlogEntry) -> Self {
        let cursor = TextCursor::at_end(&entry.title);
        EditForm {
            draft: entry.clone(),
            persisted: entry,
            focus: Focus::Title,
            cursor,
            submitting: false,
            in_flight: None,
            save_error: None,
        }
    }

    #[cfg(test)]
    pub fn draft(&self) -> &BlogEntry {
        &self.draft
    }

    #[cfg(test)]
    pub fn persisted(&self) -> &BlogEntry {
        &self.persisted
    }

    #[cfg(test)]
    pub fn draft_mut(&mut self) -> &mut BlogEntry {
        &mut self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.persisted
    }

    #[cfg(test)]
    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn focused_text(&self) -> &str {
        match self.focus {
            Focus::Title => &self.draft.title,
            Focus::Content => &self.draft.content,
            Focus::Tag(i) => self.draft.hashtags.get(i).map_or("", String::as_str),
        }
    }

    fn focus_on(&mut self, focus: Focus) {
        self.focus = focus.clamp(self.draft.hashtags.len());
        self.cursor = TextCursor::at_end(self.focused_text());
    }

    fn type_key(&mut self, key: KeyEvent) {
        match self.focus {
            Focus::Title => {
                self.cursor.apply(&mut self.draft.title, key, false, None);
            }
            Focus::Content => {
                self.cursor.apply(&mut self.draft.content, key, true, None);
            }
            Focus::Tag(_) => {}
        }
    }
}

#[derive(Debug)]
pub struct EditScreen {
    id: String,
    state: Load<EditForm>,
}

impl EditScreen {
    /// Returns the screen together with the fetch it needs on mount.
    pub fn new(id: impl Into<String>) -> (Self, Request) {
        let id = id.into();
        let request = Request::Fetch(id.clone());
        (
            EditScreen {
                id,
                state: Load::Loading,
            },
            request,
        )
    }

    #[cfg(test)]
    pub fn state(&self) -> &Load<EditForm> {
        &self.state
    }

    #[cfg(test)]
    pub fn form(&self) -> Option<&EditForm> {
        match &self.state {
            Load::Ready(form) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut EditForm> {
        match &mut self.state {
            Load::Ready(form) => Some(form),
            _ => None,
        }
    }

    pub fn delete_tag(&mut self, index: usize) {
        if let Some(form) = self.form_mut() {
            if tags::remove_at(&mut form.draft.hashtags, index) {
                let focus = form.focus;
                form.focus_on(focus);
            }
        }
    }

    pub fn insert_tag(&mut self, index: usize) {
        if let Some(form) = self.form_mut() {
            tags::insert_after(&mut form.draft.hashtags, index);
        }
    }

    pub fn change_tag_name(&mut self, index: usize, value: &str) {
        if let Some(form) = self.form_mut() {
            tags::set_name(&mut form.draft.hashtags, index, value);
        }
    }

    pub fn submit(&mut self) -> Command {
        self.submit_at(Utc::now())
    }

    /// Sends the draft as a full replacement. `now` only matters when the
    /// entry has no usable creation time.
    pub fn submit_at(&mut self, now: DateTime<Utc>) -> Command {
        let Some(form) = self.form_mut() else {
            return Command::None;
        };
        if form.submitting {
            return Command::None;
        }
        form.submitting = true;
        form.save_error = None;
        let replacement = form.draft.to_replacement(now);
        info!(id = %replacement.id, "saving blog entry");
        form.in_flight = Some(replacement.clone());
        Command::Send(Request::Update(replacement))
    }

    pub fn discard(&mut self) -> Command {
        Command::Navigate(Route::Home)
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Command {
        match (&mut self.state, outcome) {
            (Load::Loading, Outcome::Fetched(Ok(entry))) => {
                self.state = Load::Ready(EditForm::new(entry));
                Command::None
            }
            (Load::Loading, Outcome::Fetched(Err(e))) => {
                warn!(id = %self.id, error = %e, "loading blog entry for edit failed");
                self.state = Load::Failed(e.to_string());
                Command::None
            }
            (Load::Ready(form), Outcome::Updated(Ok(()))) => {
                form.submitting = false;
                if let Some(saved) = form.in_flight.take() {
                    form.persisted = saved;
                }
                info!(id = %self.id, "blog entry saved");
                Command::Navigate(Route::Home)
            }
            (Load::Ready(form), Outcome::Updated(Err(e))) => {
                form.submitting = false;
                form.in_flight = None;
                warn!(id = %self.id, error = %e, "saving blog entry failed");
                let message = format!("Error while saving: {e}");
                form.save_error = Some(message.clone());
                Command::Alert(message)
            }
            _ => Command::None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        let Some(ready) = self.form_mut() else {
            return match form::classify(key) {
                FormKey::Cancel => Command::Back,
                _ => Command::None,
            };
        };
        let tag_count = ready.draft.hashtags.len();
        match form::classify(key) {
            FormKey::NextField => ready.focus_on(ready.focus.next(tag_count)),
            FormKey::PrevField => ready.focus_on(ready.focus.prev(tag_count)),
            FormKey::InsertTag => {
                let index = match ready.focus {
                    Focus::Tag(i) => i,
                    _ => tag_count.saturating_sub(1),
                };
                let new_row = if tag_count == 0 { 0 } else { index + 1 };
                self.insert_tag(index);
                if let Some(ready) = self.form_mut() {
                    ready.focus_on(Focus::Tag(new_row));
                }
            }
            FormKey::RemoveTag => {
                if let Focus::Tag(i) = ready.focus {
                    self.delete_tag(i);
                }
            }
            FormKey::Submit => return self.submit(),
            FormKey::Cancel => return self.discard(),
            FormKey::Text(key) => match ready.focus {
                Focus::Tag(i) => {
                    let mut name = ready.draft.hashtags.get(i).cloned().unwrap_or_default();
                    if ready.cursor.apply(&mut name, key, false, Some(MAX_TAG_CHARS)) {
                        self.change_tag_name(i, &name);
                    }
                }
                _ => ready.type_key(key),
            },
        }
        Command::None
    }

    pub fn render(&self, frame: &mut Frame) {
        let ready = match &self.state {
            Load::Ready(ready) => ready,
            other => return render_load_state(frame, "Edit Blog", other),
        };
        let status = if ready.submitting {
            Some(Line::styled("Saving...", Style::default().fg(Color::Yellow)))
        } else {
            ready
                .save_error
                .as_deref()
                .map(|e| Line::styled(e.to_string(), Style::default().fg(Color::Red)))
        };
        let status = status.or_else(|| {
            ready
                .is_dirty()
                .then(|| Line::styled("Unsaved changes", Style::default().fg(Color::DarkGray)))
        });
        form::render_form(
            frame,
            FormView {
                header: "Edit Blog",
                title: &ready.draft.title,
                content: &ready.draft.content,
                tags: ready.draft.hashtags.iter().map(String::as_str).collect(),
                tags_label: "Tags",
                focus: ready.focus,
                cursor: ready.cursor,
                status,
                hints: HINTS,
            },
        );
        if ready.draft.hashtags.is_empty() {
            let hint = Paragraph::new("No tags. Ctrl-N adds one.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            let area = frame.area();
            let row = ratatui::layout::Rect {
                x: area.x + 2,
                y: area.bottom().saturating_sub(5),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, row);
        }
    }
}
