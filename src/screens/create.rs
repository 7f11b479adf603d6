use crossterm::event::KeyEvent;
use ratatui::{
    style::{Color, Style},
    text::Line,
    Frame,
};
use tracing::{info, warn};

use crate::api::{Outcome, Request};
use crate::blog_entry::{NewBlogEntry, TagDraft};
use crate::input::TextCursor;
use crate::route::Route;
use crate::screens::form::{self, Focus, FormKey, FormView};
use crate::screens::Command;
use crate::tags;

const HINTS: &[(&str, &str)] = &[
    ("Tab", "next field"),
    ("Ctrl-N", "add tag"),
    ("Ctrl-D", "remove tag"),
    ("Ctrl-S", "submit"),
    ("Esc", "home"),
];

/// Draft of an entry that does not exist on the backend yet.
#[derive(Debug)]
pub struct CreateScreen {
    title: String,
    content: String,
    tags: Vec<TagDraft>,
    focus: Focus,
    cursor: TextCursor,
    submitting: bool,
}

impl Default for CreateScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateScreen {
    pub fn new() -> Self {
        CreateScreen {
            title: String::new(),
            content: String::new(),
            tags: vec![TagDraft::default()],
            focus: Focus::Title,
            cursor: TextCursor::default(),
            submitting: false,
        }
    }

    #[cfg(test)]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[cfg(test)]
    pub fn tags(&self) -> &[TagDraft] {
        &self.tags
    }

    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[cfg(test)]
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    #[cfg(test)]
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
    }

    pub fn change_tag_name(&mut self, index: usize, value: &str) {
        if let Some(tag) = self.tags.get_mut(index) {
            tag.name = value.to_string();
        }
    }

    /// Removes a tag row unless it is the last one.
    pub fn remove_tag(&mut self, index: usize) {
        if tags::remove_keeping_one(&mut self.tags, index) {
            self.focus = self.focus.clamp(self.tags.len());
            self.reset_cursor();
        }
    }

    pub fn insert_tag(&mut self, index: usize) {
        tags::insert_after(&mut self.tags, index);
    }

    pub fn draft(&self) -> NewBlogEntry {
        NewBlogEntry::from_draft(&self.title, &self.content, &self.tags)
    }

    pub fn submit(&mut self) -> Command {
        if self.submitting {
            return Command::None;
        }
        self.submitting = true;
        let entry = self.draft();
        info!(title = %entry.title, tags = entry.hashtags.len(), "creating blog entry");
        Command::Send(Request::Create(entry))
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Command {
        match outcome {
            Outcome::Created(Ok(())) => {
                self.submitting = false;
                info!(title = %self.title, "blog entry created");
                Command::Navigate(Route::Home)
            }
            Outcome::Created(Err(e)) => {
                self.submitting = false;
                warn!(error = %e, "creating blog entry failed");
                Command::Alert(format!("Error while saving: {e}"))
            }
            _ => Command::None,
        }
    }

    fn focused_text(&self) -> &str {
        match self.focus {
            Focus::Title => &self.title,
            Focus::Content => &self.content,
            Focus::Tag(i) => self.tags.get(i).map_or("", |t| t.name.as_str()),
        }
    }

    fn reset_cursor(&mut self) {
        self.cursor = TextCursor::at_end(self.focused_text());
    }

    fn focus_on(&mut self, focus: Focus) {
        self.focus = focus;
        self.reset_cursor();
    }

    fn type_key(&mut self, key: KeyEvent) {
        match self.focus {
            Focus::Title => {
                self.cursor.apply(&mut self.title, key, false, None);
            }
            Focus::Content => {
                self.cursor.apply(&mut self.content, key, true, None);
            }
            Focus::Tag(i) => {
                let Some(tag) = self.tags.get(i) else {
                    return;
                };
                let mut name = tag.name.clone();
                if self.cursor.apply(&mut name, key, false, None) {
                    self.change_tag_name(i, &name);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        match form::classify(key) {
            FormKey::NextField => self.focus_on(self.focus.next(self.tags.len())),
            FormKey::PrevField => self.focus_on(self.focus.prev(self.tags.len())),
            FormKey::InsertTag => {
                let index = match self.focus {
                    Focus::Tag(i) => i,
                    _ => self.tags.len().saturating_sub(1),
                };
                self.insert_tag(index);
                self.focus_on(Focus::Tag((index + 1).min(self.tags.len() - 1)));
            }
            FormKey::RemoveTag => {
                if let Focus::Tag(i) = self.focus {
                    self.remove_tag(i);
                }
            }
            FormKey::Submit => return self.submit(),
            FormKey::Cancel => return Command::Navigate(Route::Home),
            FormKey::Text(key) => self.type_key(key),
        }
        Command::None
    }

    pub fn render(&self, frame: &mut Frame) {
        let status = self
            .submitting
            .then(|| Line::styled("Saving...", Style::default().fg(Color::Yellow)));
        form::render_form(
            frame,
            FormView {
                header: "New Blog",
                title: &self.title,
                content: &self.content,
                tags: self.tags.iter().map(|t| t.name.as_str()).collect(),
                tags_label: "Enter Hashtags",
                focus: self.focus,
                cursor: self.cursor,
                status,
                hints: HINTS,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn names(screen: &CreateScreen) -> Vec<&str> {
        screen.tags().iter().map(|t| t.name.as_str()).collect()
    }

    fn press(screen: &mut CreateScreen, code: KeyCode) -> Command {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(screen: &mut CreateScreen, c: char) -> Command {
        screen.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    #[test]
    fn starts_with_one_empty_tag_row() {
        let screen = CreateScreen::new();
        assert_eq!(names(&screen), vec![""]);
    }

    #[test]
    fn remove_tag_never_drops_last_row() {
        let mut screen = CreateScreen::new();
        screen.insert_tag(0);
        screen.insert_tag(1);
        for _ in 0..5 {
            screen.remove_tag(0);
            assert!(!screen.tags().is_empty());
        }
        assert_eq!(screen.tags().len(), 1);
    }

    #[test]
    fn change_tag_name_ignores_unknown_rows() {
        let mut screen = CreateScreen::new();
        screen.change_tag_name(0, "rust");
        screen.change_tag_name(4, "nope");
        assert_eq!(names(&screen), vec!["rust"]);
    }

    #[test]
    fn submit_sends_only_non_empty_tags() {
        let mut screen = CreateScreen::new();
        screen.set_title("T");
        screen.set_content("C");
        screen.change_tag_name(0, "a");
        screen.insert_tag(0);
        screen.insert_tag(1);
        screen.change_tag_name(2, "b");
        screen.insert_tag(2);
        assert_eq!(names(&screen), vec!["a", "", "b", ""]);

        match screen.submit() {
            Command::Send(Request::Create(entry)) => {
                assert_eq!(entry.title, "T");
                assert_eq!(entry.content, "C");
                assert_eq!(entry.hashtags, vec!["a", "b"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn second_submit_while_pending_is_ignored() {
        let mut screen = CreateScreen::new();
        assert!(matches!(screen.submit(), Command::Send(_)));
        assert_eq!(screen.submit(), Command::None);
    }

    #[test]
    fn failed_create_keeps_draft_and_alerts() {
        let mut screen = CreateScreen::new();
        screen.set_title("Title");
        screen.set_content("Body");
        screen.change_tag_name(0, "tag");
        screen.submit();

        let command = screen.on_outcome(Outcome::Created(Err(ApiError::Status {
            status: 500,
            body: String::new(),
        })));

        match command {
            Command::Alert(message) => assert!(message.starts_with("Error while saving: ")),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(screen.title(), "Title");
        assert_eq!(screen.content(), "Body");
        assert_eq!(names(&screen), vec!["tag"]);
        assert!(!screen.is_submitting());
    }

    #[test]
    fn successful_create_returns_home() {
        let mut screen = CreateScreen::new();
        screen.submit();
        assert_eq!(
            screen.on_outcome(Outcome::Created(Ok(()))),
            Command::Navigate(Route::Home)
        );
    }

    #[test]
    fn keyboard_editing_fills_the_draft() {
        let mut screen = CreateScreen::new();
        press(&mut screen, KeyCode::Char('T'));
        press(&mut screen, KeyCode::Tab);
        press(&mut screen, KeyCode::Char('C'));
        press(&mut screen, KeyCode::Enter);
        press(&mut screen, KeyCode::Char('D'));
        press(&mut screen, KeyCode::Tab);
        press(&mut screen, KeyCode::Char('a'));
        ctrl(&mut screen, 'n');
        press(&mut screen, KeyCode::Char('b'));

        assert_eq!(screen.title(), "T");
        assert_eq!(screen.content(), "C\nD");
        assert_eq!(names(&screen), vec!["a", "b"]);

        ctrl(&mut screen, 'd');
        assert_eq!(names(&screen), vec!["a"]);
        ctrl(&mut screen, 'd');
        assert_eq!(names(&screen), vec!["a"]);
    }

    #[test]
    fn escape_goes_home_without_request() {
        let mut screen = CreateScreen::new();
        assert_eq!(press(&mut screen, KeyCode::Esc), Command::Navigate(Route::Home));
    }
}
