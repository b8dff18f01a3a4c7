use std::time::Instant;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent, tx: &mpsc::UnboundedSender<AppEvent>) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => app.scroll_to_bottom_after_layout(),
        AppEvent::Tick => app.tick(Instant::now()),
        AppEvent::Reply(result) => app.on_reply(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &mpsc::UnboundedSender<AppEvent>) {
    // AltGr arrives as CONTROL | ALT on some terminals and must still type
    if key.modifiers.contains(KeyModifiers::CONTROL) && !key.modifiers.contains(KeyModifiers::ALT) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('x') => app.cancel_in_flight(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit(tx),
        KeyCode::Esc => {
            app.toasts.dismiss();
        }
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_tui::{ChatClient, SubmissionController, Toasts};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Arc;

    fn test_app() -> App {
        let backend = Arc::new(ChatClient::new("http://127.0.0.1:9"));
        App::new(SubmissionController::new(backend), Toasts::default(), String::new())
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 2, 4, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(1, 2, rect));
    }

    #[test]
    fn test_ctrl_c_quits_and_typing_edits_draft() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::unbounded_channel();

        handle_event(&mut app, key(KeyCode::Char('h'), KeyModifiers::NONE), &tx).unwrap();
        handle_event(&mut app, key(KeyCode::Char('i'), KeyModifiers::NONE), &tx).unwrap();
        assert_eq!(app.store.pending_input(), "hi");

        handle_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL), &tx).unwrap();
        assert!(app.should_quit);
        assert_eq!(app.store.pending_input(), "hi");
    }

    #[test]
    fn test_altgr_chord_inserts_character() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::unbounded_channel();

        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        handle_event(&mut app, key(KeyCode::Char('@'), altgr), &tx).unwrap();
        handle_event(&mut app, key(KeyCode::Char('c'), altgr), &tx).unwrap();

        assert_eq!(app.store.pending_input(), "@c");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_resize_scrolls_after_next_layout() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::unbounded_channel();
        app.set_chat_viewport(Rect::new(0, 0, 42, 32));
        for i in 0..10 {
            app.store.append_message(chat_tui::Role::User, &format!("message {i}")).unwrap();
        }
        app.sync_store_events();
        assert_eq!(app.chat_scroll, 0);

        handle_event(&mut app, AppEvent::Resize(42, 10), &tx).unwrap();
        // Old viewport still fits everything
        assert_eq!(app.chat_scroll, 0);

        app.set_chat_viewport(Rect::new(0, 0, 42, 12));
        assert_eq!(app.chat_scroll, 20);
    }

    #[test]
    fn test_esc_dismisses_toast() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::unbounded_channel();
        app.toasts.push_reply_failed();

        handle_event(&mut app, key(KeyCode::Esc, KeyModifiers::NONE), &tx).unwrap();
        assert!(app.toasts.is_empty());
    }

    #[tokio::test]
    async fn test_enter_then_reply_event() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::unbounded_channel();

        for c in "ping".chars() {
            handle_event(&mut app, key(KeyCode::Char(c), KeyModifiers::NONE), &tx).unwrap();
        }
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE), &tx).unwrap();
        assert!(app.is_awaiting());

        // A second Enter while awaiting does nothing
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE), &tx).unwrap();
        assert_eq!(app.store.len(), 1);

        handle_event(&mut app, AppEvent::Reply(Ok("pong".to_string())), &tx).unwrap();
        assert!(!app.is_awaiting());
        assert_eq!(app.store.len(), 2);
    }
}
