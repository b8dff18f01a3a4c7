use std::time::Instant;
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use chat_tui::{ChatError, ConversationStore, StoreEvent, SubmissionController, Toasts};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,

    // Conversation core
    pub store: ConversationStore,
    pub controller: SubmissionController,
    pub toasts: Toasts,
    store_events: mpsc::UnboundedReceiver<StoreEvent>,
    in_flight: Option<CancellationToken>,

    // Input state
    pub cursor: usize, // cursor position in pending input, in chars

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of chat area for scroll calculations
    pub chat_width: u16,  // Inner width of chat area for wrap calculations
    pub chat_area: Option<Rect>,
    scroll_on_layout: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub backend_url: String,
}

impl App {
    pub fn new(controller: SubmissionController, toasts: Toasts, backend_url: String) -> Self {
        let mut store = ConversationStore::new();
        let store_events = store.subscribe();

        Self {
            should_quit: false,
            store,
            controller,
            toasts,
            store_events,
            in_flight: None,
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            scroll_on_layout: false,
            animation_frame: 0,
            backend_url,
        }
    }

    // Draft editing

    pub fn insert_char(&mut self, c: char) {
        let mut draft = self.store.pending_input().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.insert(byte_pos, c);
        self.store.set_pending_input(draft);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.remove_at_cursor();
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft_len() {
            self.remove_at_cursor();
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft_len();
    }

    fn draft_len(&self) -> usize {
        self.store.pending_input().chars().count()
    }

    fn remove_at_cursor(&mut self) {
        let mut draft = self.store.pending_input().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.remove(byte_pos);
        self.store.set_pending_input(draft);
    }

    // Submission lifecycle

    pub fn is_awaiting(&self) -> bool {
        self.store.is_awaiting_reply()
    }

    /// Start a submission and run its call in the background. The result
    /// comes back through `tx` as `AppEvent::Reply`.
    pub fn submit(&mut self, tx: &mpsc::UnboundedSender<AppEvent>) {
        let Some(submission) = self.controller.begin(&mut self.store) else {
            return;
        };

        self.cursor = 0;
        self.in_flight = Some(submission.cancel_token());

        let controller = self.controller.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = controller.dispatch(&submission).await;
            if tx.send(AppEvent::Reply(result)).is_err() {
                tracing::debug!("reply arrived after the event loop closed");
            }
        });
    }

    pub fn on_reply(&mut self, result: Result<String, ChatError>) {
        self.in_flight = None;
        self.controller.finish(&mut self.store, &mut self.toasts, result);
    }

    /// Abort the outstanding call, if any. It settles as a failure.
    pub fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            tracing::info!("cancelling in-flight request");
            token.cancel();
        }
    }

    /// React to store changes: new messages and the thinking indicator pull
    /// the view to the bottom.
    pub fn sync_store_events(&mut self) {
        let mut follow = false;
        while let Ok(event) = self.store_events.try_recv() {
            match event {
                StoreEvent::MessageAppended(_) | StoreEvent::AwaitingChanged(true) => follow = true,
                StoreEvent::PendingInputChanged | StoreEvent::AwaitingChanged(false) => {}
            }
        }
        if follow {
            self.scroll_to_bottom();
        }
    }

    /// Tick animation frame and drop timed-out notifications
    pub fn tick(&mut self, now: Instant) {
        if self.is_awaiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.toasts.expire(now);
    }

    // Scrolling

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        let overflow = self.total_chat_lines().saturating_sub(visible_height as usize);
        u16::try_from(overflow).unwrap_or(u16::MAX)
    }

    /// Record the inner size of the chat pane from the last layout. A scroll
    /// requested before the size was known is applied here.
    pub fn set_chat_viewport(&mut self, area: Rect) {
        self.chat_area = Some(area);
        self.chat_height = area.height.saturating_sub(2);
        self.chat_width = area.width.saturating_sub(2);

        if self.scroll_on_layout {
            self.scroll_on_layout = false;
            self.scroll_to_bottom();
        }
    }

    /// Scroll to the bottom once the next layout pass has run
    pub fn scroll_to_bottom_after_layout(&mut self) {
        self.scroll_on_layout = true;
    }

    /// Rendered height of the transcript, estimating wrap at the chat width
    pub fn total_chat_lines(&self) -> usize {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 50 };

        let mut total_lines: usize = 0;
        for msg in self.store.messages() {
            total_lines += 1; // Role and time line
            for line in msg.content().lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                total_lines += if char_count == 0 { 1 } else { char_count.div_ceil(wrap_width) };
            }
            total_lines += 1; // Blank line after message
        }

        if self.is_awaiting() {
            total_lines += 2; // "Bot" + "Thinking..."
        }
        total_lines
    }
}
