pub mod create;
pub mod detail;
pub mod edit;
pub mod form;
pub mod header;
pub mod home;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::Alignment,
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::api::{Outcome, Request};
use crate::route::Route;
use crate::ui;
use create::CreateScreen;
use detail::DetailScreen;
use edit::EditScreen;
use header::AppHeader;
use home::HomeScreen;

/// What a screen asks the app to do after handling a key or an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    None,
    Send(Request),
    Navigate(Route),
    Back,
    Alert(String),
    Quit,
}

/// Fetch-on-mount state. A screen leaves `Loading` exactly once.
#[derive(Debug)]
pub enum Load<T> {
    Loading,
    Failed(String),
    Ready(T),
}

pub fn render_load_state<T>(frame: &mut Frame, header: &str, state: &Load<T>) {
    let (header_area, body, footer) = ui::page_layout(frame.area());
    frame.render_widget(AppHeader::new(header), header_area);
    let message = match state {
        Load::Loading => Paragraph::new("Loading..."),
        Load::Failed(reason) => Paragraph::new(vec![
            Line::styled("Something went wrong", Style::default().fg(Color::Red)),
            Line::styled(reason.as_str(), Style::default().fg(Color::DarkGray)),
        ]),
        Load::Ready(_) => return,
    };
    frame.render_widget(message.alignment(Alignment::Center), body);
    frame.render_widget(ui::instructions("Esc: Back"), footer);
}

#[derive(Debug)]
pub enum Screen {
    Home(HomeScreen),
    Create(CreateScreen),
    Detail(DetailScreen),
    Edit(EditScreen),
}

impl Screen {
    /// Builds a fresh screen for `route`, with the fetch it needs, if any.
    pub fn mount(route: &Route) -> (Screen, Option<Request>) {
        match route {
            Route::Home => (Screen::Home(HomeScreen::new()), None),
            Route::NewEntry => (Screen::Create(CreateScreen::new()), None),
            Route::Details(id) => {
                let (screen, request) = DetailScreen::new(id.clone());
                (Screen::Detail(screen), Some(request))
            }
            Route::Edit(id) => {
                let (screen, request) = EditScreen::new(id.clone());
                (Screen::Edit(screen), Some(request))
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        match self {
            Screen::Home(s) => s.handle_key(key),
            Screen::Create(s) => s.handle_key(key),
            Screen::Detail(s) => s.handle_key(key),
            Screen::Edit(s) => s.handle_key(key),
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Command {
        match self {
            Screen::Home(_) => Command::None,
            Screen::Create(s) => s.on_outcome(outcome),
            Screen::Detail(s) => s.on_outcome(outcome),
            Screen::Edit(s) => s.on_outcome(outcome),
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        match self {
            Screen::Home(s) => s.render(frame),
            Screen::Create(s) => s.render(frame),
            Screen::Detail(s) => s.render(frame),
            Screen::Edit(s) => s.render(frame),
        }
    }
}
