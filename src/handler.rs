use crate::app::{App, InputMode};
use crate::tui::AppEvent;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl-C quits from any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::Char('g') => app.scroll_chat_to_top(),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        // Back to the input box
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        // Submit on modifier-free Enter. The guard in Conversation::submit
        // makes this a no-op while an answer is in flight or the input is
        // blank, so holding Enter can't queue duplicate requests.
        KeyCode::Enter if key.modifiers.is_empty() => {
            app.submit_question();
        }
        KeyCode::Backspace => app.conversation.delete_char_before_cursor(),
        KeyCode::Delete => app.conversation.delete_char_at_cursor(),
        KeyCode::Left => app.conversation.move_cursor_left(),
        KeyCode::Right => app.conversation.move_cursor_right(),
        KeyCode::Home => app.conversation.move_cursor_home(),
        KeyCode::End => app.conversation.move_cursor_end(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::Char(c) => app.conversation.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => {
            app.scroll_down();
            app.scroll_down();
            app.scroll_down();
        }
        MouseEventKind::ScrollUp => {
            app.scroll_up();
            app.scroll_up();
            app.scroll_up();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        App::new("test-key", &Config::new())
    }

    #[tokio::test]
    async fn test_typing_updates_input() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('h')));
        handle_key(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.conversation.input(), "hi");

        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.conversation.input(), "h");
    }

    #[tokio::test]
    async fn test_enter_on_empty_input_does_nothing() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.conversation.messages().is_empty());
        assert!(app.answer_task.is_none());
    }

    #[tokio::test]
    async fn test_enter_with_modifier_does_not_submit() {
        let mut app = test_app();
        app.conversation.set_input("hello");
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT),
        );
        assert!(app.conversation.messages().is_empty());
        assert_eq!(app.conversation.input(), "hello");
    }

    #[tokio::test]
    async fn test_esc_switches_to_normal_mode() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_key(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn test_q_quits_in_normal_mode_only() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.conversation.input(), "q");

        app.input_mode = InputMode::Normal;
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_in_any_mode() {
        let mut app = test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
