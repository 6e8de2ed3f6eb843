use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use dsa_mentor_core::AnswerSource;
use ratatui::layout::Rect;

use crate::app::{App, FocusPane};
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub fn handle_event<S: AnswerSource>(app: &mut App<S>, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            app.focus = FocusPane::Input;
            app.insert_str(&text);
        }
        AppEvent::Resize => {
            // Panel sizes change on the next draw; keep the scroll in range
            app.answer_scroll = app.answer_scroll.min(app.max_scroll());
        }
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key<S: AnswerSource>(app: &mut App<S>, key: KeyEvent) {
    // Global keys that work in any focus
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('l') => app.clear(),
            KeyCode::Char('d') => app.scroll_down(app.half_page()),
            KeyCode::Char('u') => app.scroll_up(app.half_page()),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::PageDown => app.scroll_down(app.half_page()),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        _ => match app.focus {
            FocusPane::Input => handle_input_key(app, key),
            FocusPane::Suggestions => handle_suggestions_key(app, key),
        },
    }
}

fn handle_input_key<S: AnswerSource>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Esc => app.clear(),
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_suggestions_key<S: AnswerSource>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.suggestion_prev(),
        KeyCode::Right | KeyCode::Char('l') => app.suggestion_next(),
        KeyCode::Enter | KeyCode::Char(' ') => app.submit_suggestion(app.selected_suggestion),
        KeyCode::Esc => app.focus = FocusPane::Input,
        KeyCode::Char(c) => {
            // Typing goes back to the input box
            app.focus = FocusPane::Input;
            app.cursor_end();
            app.insert_char(c);
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse<S: AnswerSource>(app: &mut App<S>, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_LINES),
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked = app
                .suggestion_areas
                .iter()
                .position(|area| point_in_rect(mouse.column, mouse.row, *area));
            if let Some(index) = clicked {
                app.submit_suggestion(index);
            }
        }
        _ => {}
    }
}
