//! Terminal front-end for the multiple-choice quiz

pub mod input;
pub mod state;

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::game::{GameEngine, GameEvent};
use crate::profile::ProfileRepository;
use crate::quiz::{Countdown, CountdownEvent};
use crate::theme::Theme;
use crate::ui;
use input::{Action, key_to_action};
use state::{AppState, MenuItem, Screen};

/// Countdown events buffered between frames
const COUNTDOWN_BUFFER: usize = 8;

/// A running countdown and the receiving end of its channel
struct ActiveCountdown {
    _countdown: Countdown,
    rx: mpsc::Receiver<CountdownEvent>,
}

/// The main application
pub struct App<R> {
    config: Config,
    theme: Theme,
    state: AppState,
    engine: GameEngine<R>,
    countdown: Option<ActiveCountdown>,
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl<R: ProfileRepository> App<R> {
    /// Create the application for an engine with a learner already loaded
    pub fn new(config: Config, engine: GameEngine<R>) -> Result<Self> {
        let name = engine.learner().map(|l| l.name.clone()).unwrap_or_default();
        let terminal = Self::setup_terminal()?;

        Ok(Self {
            config,
            theme: Theme::default(),
            state: AppState::new(name),
            engine,
            countdown: None,
            terminal,
        })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        let feedback_delay = Duration::from_millis(self.config.feedback_delay_ms);

        loop {
            self.terminal.draw(|frame| {
                ui::draw(frame, &self.state, &self.theme);
            })?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(action) = key_to_action(key.code) {
                            if self.handle_action(action) {
                                break;
                            }
                        }
                    }
                }
            }

            self.drain_countdown();

            if self.state.feedback_elapsed(feedback_delay) {
                self.advance();
            }
            self.state.expire_toast();
        }

        self.countdown = None;
        self.restore_terminal()?;
        Ok(())
    }

    /// Handle an action, returns true if the app should exit
    fn handle_action(&mut self, action: Action) -> bool {
        if action == Action::Quit {
            return true;
        }

        match self.state.screen {
            Screen::Menu => match action {
                Action::Up => {
                    let len = MenuItem::ALL.len();
                    self.state.menu_selected = (self.state.menu_selected + len - 1) % len;
                }
                Action::Down => {
                    self.state.menu_selected = (self.state.menu_selected + 1) % MenuItem::ALL.len();
                }
                Action::Select => match self.state.selected_menu_item() {
                    MenuItem::Start => self.start_session(),
                    MenuItem::Quit => return true,
                },
                _ => {}
            },
            Screen::Quiz => match action {
                Action::Up => self.state.quiz.move_selection(false),
                Action::Down => self.state.quiz.move_selection(true),
                Action::Choose(index) if self.state.quiz.awaiting_answer() => self.answer(index),
                Action::Select if self.state.quiz.awaiting_answer() => {
                    let selected = self.state.quiz.selected_option;
                    self.answer(selected);
                }
                // Skip the remaining feedback delay
                Action::Select => self.advance(),
                Action::Back => {
                    self.countdown = None;
                    self.state.quiz = state::QuizState::default();
                    self.state.screen = Screen::Menu;
                }
                _ => {}
            },
            Screen::Results => {
                if matches!(action, Action::Select | Action::Back) {
                    self.state.screen = Screen::Menu;
                }
            }
        }
        false
    }

    fn start_session(&mut self) {
        match self.engine.start_session() {
            Ok(events) => {
                self.state.status = None;
                self.apply(events);
            }
            Err(e) => {
                tracing::error!("Failed to start session: {}", e);
                self.state.status = Some(format!("Tidak bisa memulai latihan: {e}"));
            }
        }
    }

    fn answer(&mut self, index: usize) {
        // Stop the countdown before resolving so no expiry follows the answer
        self.countdown = None;
        let events = self.engine.submit_answer(index);
        self.apply(events);
    }

    fn advance(&mut self) {
        let events = self.engine.advance();
        self.apply(events);
    }

    fn drain_countdown(&mut self) {
        let mut events = Vec::new();
        if let Some(active) = self.countdown.as_mut() {
            while let Ok(event) = active.rx.try_recv() {
                match event {
                    CountdownEvent::Tick { .. } => events.extend(self.engine.tick()),
                    CountdownEvent::Expired => {
                        events.extend(self.engine.timeout());
                        break;
                    }
                }
            }
        }
        if events.iter().any(|e| matches!(e, GameEvent::AnswerResolved { .. })) {
            self.countdown = None;
        }
        self.apply(events);
    }

    /// Update the view and start a countdown for each new question
    fn apply(&mut self, events: Vec<GameEvent>) {
        let new_question = events.iter().find_map(|e| match e {
            GameEvent::QuestionShown { countdown_seconds, .. } => Some(*countdown_seconds),
            _ => None,
        });
        if events.iter().any(|e| matches!(e, GameEvent::SessionFinished { .. })) {
            self.countdown = None;
        }
        if let Some(seconds) = new_question {
            let (tx, rx) = mpsc::channel(COUNTDOWN_BUFFER);
            self.countdown = Some(ActiveCountdown { _countdown: Countdown::spawn(seconds, tx), rx });
        }
        self.state.apply(events);
    }
}

impl<R> Drop for App<R> {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = self.terminal.show_cursor();
    }
}
