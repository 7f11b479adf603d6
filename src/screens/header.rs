use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Page title bar.
pub struct AppHeader<'a> {
    pub text: &'a str,
}

impl<'a> AppHeader<'a> {
    pub fn new(text: &'a str) -> Self {
        AppHeader { text }
    }
}

impl Widget for AppHeader<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.text)
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
            .render(area, buf);
    }
}
