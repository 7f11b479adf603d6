use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::route::Route;
use crate::screens::header::AppHeader;
use crate::screens::Command;
use crate::ui;

/// Landing screen. `n` and `q` only act while the id field is empty.
#[derive(Debug, Default)]
pub struct HomeScreen {
    id_input: String,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn id_input(&self) -> &str {
        &self.id_input
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Command::None;
        }
        match key.code {
            KeyCode::Char('n') if self.id_input.is_empty() => Command::Navigate(Route::NewEntry),
            KeyCode::Char('q') if self.id_input.is_empty() => Command::Quit,
            KeyCode::Esc => Command::Quit,
            KeyCode::Char(c) if !c.is_whitespace() && c != '/' => {
                self.id_input.push(c);
                Command::None
            }
            KeyCode::Backspace => {
                self.id_input.pop();
                Command::None
            }
            KeyCode::Enter if !self.id_input.is_empty() => {
                let id = std::mem::take(&mut self.id_input);
                Command::Navigate(Route::Details(id))
            }
            _ => Command::None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let (header, body, footer) = ui::page_layout(frame.area());
        frame.render_widget(AppHeader::new("Blog"), header);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(body);
        let input = Paragraph::new(self.id_input.as_str())
            .block(ui::field_block("Open entry by id", true));
        frame.render_widget(input, rows[0]);
        frame.set_cursor_position(Position::new(
            rows[0].x + 1 + self.id_input.width() as u16,
            rows[0].y + 1,
        ));

        frame.render_widget(
            Paragraph::new(ui::key_hints(&[
                ("n", "new entry"),
                ("Enter", "open"),
                ("q", "quit"),
            ]))
            .alignment(ratatui::layout::Alignment::Center),
            footer,
        );
    }
}
