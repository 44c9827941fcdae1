//! Application state for the TUI.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use superexpat_core::render::{AssistantView, CardKey};
use superexpat_core::{ChatBackend, ChatResponse, ChatSession, Error, Message, PendingTurn};

/// Sample queries offered on the welcome screen (keys 1-4).
pub const SAMPLE_QUERIES: [&str; 4] = [
    "events in London",
    "jobs in Berlin",
    "concerts in New York",
    "festivals in Paris",
];

/// Spinner frames for the "Searching with AI..." row.
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Lines moved per PageUp/PageDown.
const PAGE_SCROLL: usize = 10;

/// A request running on the worker thread.
struct InFlight {
    turn: PendingTurn,
    rx: Receiver<superexpat_core::Result<ChatResponse>>,
}

/// Main application state.
pub struct App {
    session: ChatSession,
    backend: Arc<dyn ChatBackend>,
    in_flight: Option<InFlight>,
    /// Text currently typed into the input line
    pub input: String,
    /// Scroll offset of the message pane, in rendered lines from the top
    pub scroll_offset: usize,
    /// Largest useful scroll offset, updated by the renderer
    pub max_scroll: usize,
    /// Stick to the bottom of the message pane
    pub follow_tail: bool,
    /// Animation frame counter (increments each tick)
    pub animation_frame: u64,
    /// Posters that could not be loaded, keyed by message index and card key
    failed_posters: HashSet<(usize, CardKey)>,
    /// Whether the app should exit
    pub should_quit: bool,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            session: ChatSession::new(),
            backend,
            in_flight: None,
            input: String::new(),
            scroll_offset: 0,
            max_scroll: 0,
            follow_tail: true,
            animation_frame: 0,
            failed_posters: HashSet::new(),
            should_quit: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Current spinner glyph.
    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[(self.animation_frame as usize) % SPINNER_FRAMES.len()]
    }

    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// True when the poster of `key` in message `message_index` failed to load.
    pub fn image_failed(&self, message_index: usize, key: &CardKey) -> bool {
        self.failed_posters.contains(&(message_index, key.clone()))
    }

    /// Submit the input line as a new turn.
    pub fn submit_input(&mut self) {
        let text = self.input.clone();
        if self.start_turn(&text) {
            self.input.clear();
        }
    }

    /// Submit one of the welcome-screen sample queries.
    pub fn submit_sample(&mut self, index: usize) {
        if let Some(query) = SAMPLE_QUERIES.get(index) {
            self.start_turn(query);
        }
    }

    fn start_turn(&mut self, text: &str) -> bool {
        let Some(turn) = self.session.begin_turn(text) else {
            return false;
        };
        self.follow_tail = true;

        let (tx, rx) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let query = turn.query().to_string();
        let spawned = thread::Builder::new()
            .name("chat-request".to_string())
            .spawn(move || {
                // The receiver only disappears when the app is exiting.
                let _ = tx.send(backend.send(&query));
            });

        match spawned {
            Ok(_) => self.in_flight = Some(InFlight { turn, rx }),
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn request worker");
                self.finish_turn(
                    turn,
                    Err(Error::Transport(format!("failed to start request: {e}"))),
                );
            }
        }
        true
    }

    /// Apply the result of the in-flight request, if it has arrived.
    pub fn poll_pending(&mut self) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };

        match in_flight.rx.try_recv() {
            Ok(outcome) => self.finish_turn(in_flight.turn, outcome),
            Err(TryRecvError::Empty) => self.in_flight = Some(in_flight),
            Err(TryRecvError::Disconnected) => self.finish_turn(
                in_flight.turn,
                Err(Error::Transport(
                    "request worker exited without a response".to_string(),
                )),
            ),
        }
    }

    fn finish_turn(&mut self, turn: PendingTurn, outcome: superexpat_core::Result<ChatResponse>) {
        self.session.complete_turn(turn, outcome);
        self.follow_tail = true;

        let index = self.session.messages().len() - 1;
        if let Some(AssistantView::Results { cards, .. }) =
            AssistantView::from_message(&self.session.messages()[index])
        {
            for card in cards.iter().filter(|card| card.poster_is_broken()) {
                tracing::debug!(key = %card.key, "Poster not loadable, using placeholder");
                self.failed_posters.insert((index, card.key.clone()));
            }
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(PAGE_SCROLL),
            KeyCode::PageDown => self.scroll_down(PAGE_SCROLL),
            KeyCode::Home => {
                self.follow_tail = false;
                self.scroll_offset = 0;
            }
            KeyCode::End => {
                self.follow_tail = true;
            }
            // Input is disabled while a request is in flight.
            _ if self.is_busy() => {}
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c @ '1'..='4') if self.session.is_empty() && self.input.is_empty() => {
                self.submit_sample(c as usize - '1' as usize);
            }
            KeyCode::Char(c) => {
                self.input.push(c);
            }
            _ => {}
        }
    }

    fn scroll_up(&mut self, lines: usize) {
        if self.follow_tail {
            self.scroll_offset = self.max_scroll;
        }
        self.follow_tail = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(self.max_scroll);
        if self.scroll_offset >= self.max_scroll {
            self.follow_tail = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use superexpat_core::{Item, Role};

    /// Backend that replays canned outcomes.
    struct ScriptedBackend {
        outcomes: Mutex<Vec<superexpat_core::Result<ChatResponse>>>,
    }

    impl ChatBackend for ScriptedBackend {
        fn send(&self, _message: &str) -> superexpat_core::Result<ChatResponse> {
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    fn app_with(outcomes: Vec<superexpat_core::Result<ChatResponse>>) -> App {
        App::new(Arc::new(ScriptedBackend {
            outcomes: Mutex::new(outcomes),
        }))
    }

    fn response(items: Vec<Item>) -> ChatResponse {
        ChatResponse {
            total_results: items.len() as u64,
            ai_summary: None,
            results: items,
            intent: None,
            query: None,
            location: None,
            pagination: None,
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn wait_until_idle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_busy() {
            assert!(Instant::now() < deadline, "request never settled");
            app.poll_pending();
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_enter_submits_and_clears_input() {
        let mut app = app_with(vec![Ok(response(vec![Item::default()]))]);
        type_text(&mut app, "jobs in Berlin");
        press(&mut app, KeyCode::Enter);

        assert!(app.input.is_empty());
        assert!(app.is_busy());
        assert_eq!(app.messages().len(), 1);

        wait_until_idle(&mut app);
        assert_eq!(app.messages().len(), 2);
        assert_eq!(app.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn test_blank_input_is_kept_and_ignored() {
        let mut app = app_with(vec![]);
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input, "   ");
        assert!(app.messages().is_empty());
        assert!(!app.is_busy());
    }

    #[test]
    fn test_typing_is_ignored_while_busy() {
        let mut app = app_with(vec![Ok(response(vec![]))]);
        type_text(&mut app, "events");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "more");
        press(&mut app, KeyCode::Enter);

        assert!(app.input.is_empty());
        wait_until_idle(&mut app);
        assert_eq!(app.messages().len(), 2);
    }

    #[test]
    fn test_sample_keys_only_on_welcome_screen() {
        let mut app = app_with(vec![Ok(response(vec![]))]);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.messages()[0].content.as_deref(), Some("jobs in Berlin"));
        wait_until_idle(&mut app);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.input, "3");
        assert_eq!(app.messages().len(), 2);
    }

    #[test]
    fn test_error_outcome_becomes_error_message() {
        let mut app = app_with(vec![Err(Error::Http {
            status: 502,
            reason: "Bad Gateway".to_string(),
        })]);
        app.submit_sample(0);
        wait_until_idle(&mut app);

        let reply = &app.messages()[1];
        assert!(reply.error);
        assert!(reply.content.as_deref().unwrap().contains("HTTP 502"));
    }

    #[test]
    fn test_broken_posters_are_recorded() {
        let broken = Item {
            id: Some("a".to_string()),
            poster: Some("file:///tmp/poster.png".to_string()),
            ..Default::default()
        };
        let fine = Item {
            id: Some("b".to_string()),
            poster: Some("https://img.example/b.png".to_string()),
            ..Default::default()
        };
        let mut app = app_with(vec![Ok(response(vec![broken, fine]))]);
        app.submit_sample(1);
        wait_until_idle(&mut app);

        assert!(app.image_failed(1, &CardKey::Id("a".to_string())));
        assert!(!app.image_failed(1, &CardKey::Id("b".to_string())));
    }

    #[test]
    fn test_scrolling_leaves_and_rejoins_tail() {
        let mut app = app_with(vec![]);
        app.max_scroll = 30;
        app.scroll_offset = 30;

        press(&mut app, KeyCode::PageUp);
        assert!(!app.follow_tail);
        assert_eq!(app.scroll_offset, 20);

        press(&mut app, KeyCode::PageDown);
        assert!(app.follow_tail);
        assert_eq!(app.scroll_offset, 30);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(vec![]);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let mut app = app_with(vec![]);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }
}
