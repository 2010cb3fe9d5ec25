//! App state and main loop: input handling, applying pushed events, drawing.

use std::{
    collections::VecDeque,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::types::{ChatMessage, DashboardEvent, Snapshot};
use crate::ui;
use crate::ws::{connect, next_event, request_status, send_ping, Incoming, WsStream};

const CHAT_KEEP: usize = 50;
const PING_EVERY: Duration = Duration::from_secs(15);

pub struct App {
    pub snapshot: Option<Snapshot>,
    pub chat: VecDeque<ChatMessage>,
    pub logs: Vec<String>,
    pub disconnected: bool,
    should_quit: bool,
    last_ping: Instant,
}

impl App {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            chat: VecDeque::with_capacity(CHAT_KEEP),
            logs: Vec::new(),
            disconnected: false,
            should_quit: false,
            last_ping: Instant::now(),
        }
    }

    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::InitialStatus(s) | DashboardEvent::StatusUpdate(s) => {
                self.snapshot = Some(s);
            }
            DashboardEvent::ChatReceived(msg) => {
                if self.chat.len() == CHAT_KEEP {
                    self.chat.pop_front();
                }
                self.chat.push_back(msg);
            }
            DashboardEvent::LogsUpdate(lines) => self.logs = lines,
            DashboardEvent::Pong => {}
        }
    }

    pub async fn run(&mut self, url: &str, token: Option<&str>) -> anyhow::Result<()> {
        let mut ws = connect(url, token).await?;

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal, &mut ws).await;

        // Teardown
        disable_raw_mode()?;
        let backend = terminal.backend_mut();
        execute!(backend, LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        ws: &mut WsStream,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    match k.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            self.should_quit = true;
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            // On-demand refresh between periodic pushes
                            let _ = request_status(ws).await;
                        }
                        _ => {}
                    }
                }
            }
            if self.should_quit {
                return Ok(());
            }

            match next_event(ws, Duration::from_millis(50)).await {
                Incoming::Event(event) => self.apply(event),
                Incoming::Idle => {}
                Incoming::Closed => {
                    self.disconnected = true;
                }
            }

            if !self.disconnected && self.last_ping.elapsed() >= PING_EVERY {
                self.last_ping = Instant::now();
                let _ = send_ping(ws).await;
            }

            terminal.draw(|f| ui::draw(f, self))?;
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
