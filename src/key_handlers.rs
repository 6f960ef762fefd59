// src/key_handlers.rs

use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_chat_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => {
            app.session.draft.pop();
        }
        KeyCode::Up => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                app.logs.scroll_offset = app.logs.scroll_offset.saturating_add(1);
            } else {
                app.scroll_up(1);
            }
        }
        KeyCode::Down => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                app.logs.scroll_offset = app.logs.scroll_offset.saturating_sub(1);
            } else {
                app.scroll_down(1);
            }
        }
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::End => app.jump_to_latest(),
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'c' => app.should_quit = true,
                    'u' => app.scroll_up(10),
                    'd' => app.scroll_down(10),
                    _ => {}
                }
            } else {
                app.session.draft.push(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::reassemble::RevealPolicy;
    use crate::session::Transition;
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::Receiver<Transition>) {
        let (tx, rx) = mpsc::channel(8);
        let config = Config {
            reveal_policy: RevealPolicy::Immediate,
            ..Config::default()
        };
        (App::new(&config, tx), rx)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press_ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_builds_the_draft_and_backspace_trims_it() {
        let (mut app, _rx) = test_app();
        for c in "hi!".chars() {
            handle_chat_input(press(KeyCode::Char(c)), &mut app);
        }
        assert_eq!(app.session.draft, "hi!");

        handle_chat_input(press(KeyCode::Backspace), &mut app);
        assert_eq!(app.session.draft, "hi");
    }

    #[test]
    fn escape_and_ctrl_c_both_quit() {
        let (mut app, _rx) = test_app();
        handle_chat_input(press(KeyCode::Esc), &mut app);
        assert!(app.should_quit);

        let (mut app, _rx) = test_app();
        handle_chat_input(press_ctrl(KeyCode::Char('c')), &mut app);
        assert!(app.should_quit);
    }

    #[test]
    fn enter_on_a_blank_draft_does_nothing() {
        let (mut app, _rx) = test_app();
        app.session.draft = "   ".to_string();
        handle_chat_input(press(KeyCode::Enter), &mut app);

        assert!(app.session.messages().is_empty());
        assert!(!app.session.is_busy());
        assert_eq!(app.session.draft, "   ");
    }

    #[tokio::test]
    async fn enter_submits_and_locks_the_session() {
        let (mut app, _rx) = test_app();
        app.session.draft = "hello".to_string();
        handle_chat_input(press(KeyCode::Enter), &mut app);

        assert!(app.session.is_busy());
        assert_eq!(app.session.messages().len(), 1);
        assert!(app.session.draft.is_empty());

        // A second Enter while busy changes nothing.
        app.session.draft = "more".to_string();
        handle_chat_input(press(KeyCode::Enter), &mut app);
        assert_eq!(app.session.messages().len(), 1);
        assert_eq!(app.session.draft, "more");
    }

    #[test]
    fn ctrl_up_scrolls_the_log_pane_back() {
        let (mut app, _rx) = test_app();
        handle_chat_input(press_ctrl(KeyCode::Up), &mut app);
        handle_chat_input(press_ctrl(KeyCode::Up), &mut app);
        assert_eq!(app.logs.scroll_offset, 2);

        handle_chat_input(press_ctrl(KeyCode::Down), &mut app);
        assert_eq!(app.logs.scroll_offset, 1);
    }
}
