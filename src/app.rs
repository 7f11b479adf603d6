use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::api::{perform, BlogApi, Outcome, Request};
use crate::route::Route;
use crate::screens::{Command, Screen};
use crate::ui::{self, Tui};

/// A finished backend call, tagged with the mount it was issued from.
#[derive(Debug)]
pub struct Completion {
    mount_id: u64,
    outcome: Outcome,
}

pub struct App {
    api: Arc<dyn BlogApi>,
    route: Route,
    screen: Screen,
    history: Vec<Route>,
    mount_id: u64,
    alert: Option<String>,
    should_quit: bool,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl App {
    pub fn new(api: Arc<dyn BlogApi>, start: Route) -> Self {
        let (tx, rx) = unbounded_channel();
        let (screen, request) = Screen::mount(&start);
        let app = App {
            api,
            route: start,
            screen,
            history: Vec::new(),
            mount_id: 0,
            alert: None,
            should_quit: false,
            tx,
            rx,
        };
        if let Some(request) = request {
            app.spawn(request);
        }
        app
    }

    #[cfg(test)]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[cfg(test)]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    #[cfg(test)]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    #[cfg(test)]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn spawn(&self, request: Request) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let mount_id = self.mount_id;
        tokio::spawn(async move {
            let outcome = perform(api.as_ref(), request).await;
            // The receiver only goes away when the app shuts down.
            let _ = tx.send(Completion { mount_id, outcome });
        });
    }

    fn mount(&mut self, route: Route) {
        self.mount_id += 1;
        info!(route = %route, mount_id = self.mount_id, "mounting screen");
        let (screen, request) = Screen::mount(&route);
        self.screen = screen;
        self.route = route;
        if let Some(request) = request {
            self.spawn(request);
        }
    }

    pub fn navigate(&mut self, route: Route) {
        let previous = std::mem::replace(&mut self.route, route.clone());
        self.history.push(previous);
        self.mount(route);
    }

    pub fn back(&mut self) {
        let route = self.history.pop().unwrap_or(Route::Home);
        self.mount(route);
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::None => {}
            Command::Send(request) => self.spawn(request),
            Command::Navigate(route) => self.navigate(route),
            Command::Back => self.back(),
            Command::Alert(message) => self.alert = Some(message),
            Command::Quit => self.should_quit = true,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.alert.is_some() {
            self.alert = None;
            return;
        }
        let command = self.screen.handle_key(key);
        self.execute(command);
    }

    pub fn handle_completion(&mut self, completion: Completion) {
        if completion.mount_id != self.mount_id {
            debug!(
                mount_id = completion.mount_id,
                current = self.mount_id,
                "dropping response for unmounted screen"
            );
            return;
        }
        let command = self.screen.on_outcome(completion.outcome);
        self.execute(command);
    }

    /// Waits for the next backend completion and applies it.
    #[cfg(test)]
    pub async fn process_next_completion(&mut self) {
        if let Some(completion) = self.rx.recv().await {
            self.handle_completion(completion);
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        self.screen.render(frame);
        if let Some(message) = &self.alert {
            ui::render_modal(frame, "Notice", message, "Press any key to continue");
        }
    }

    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut events = EventStream::new();
        while !self.should_quit {
            tui.draw(|f| self.render(f))?;
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "terminal input failed");
                        return Err(e.into());
                    }
                    None => break,
                },
                Some(completion) = self.rx.recv() => self.handle_completion(completion),
            }
        }
        info!("leaving blog editor");
        Ok(())
    }
}
