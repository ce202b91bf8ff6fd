use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use overscroll_core::TouchEvent;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Start a refresh as if the header had been pulled
    Refresh,
    /// Load the next page as if the footer had been pulled
    LoadMore,
    ToggleLoadMore,
    /// Activate the footer the way a click does
    TapFooter,
    ScrollUp,
    ScrollDown,
    JumpToTop,
    JumpToBottom,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Refresh,
        (KeyCode::Char('m'), KeyModifiers::NONE) => Action::LoadMore,
        (KeyCode::Char('e'), KeyModifiers::NONE) => Action::ToggleLoadMore,
        (KeyCode::Enter, KeyModifiers::NONE) => Action::TapFooter,

        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => Action::ScrollDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => Action::ScrollUp,
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::JumpToTop,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::JumpToBottom,

        _ => Action::None,
    }
}

/// Translate a left-button mouse gesture into a touch event
///
/// `top` is the first terminal row of the list area; every row is
/// `row_pixels` tall. Other buttons and wheel events are not touches.
pub fn touch_from_mouse(
    mouse: &MouseEvent,
    top: u16,
    row_pixels: i32,
    now_ms: i64,
) -> Option<TouchEvent> {
    let y = (i32::from(mouse.row) - i32::from(top)) as f32 * row_pixels as f32;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(TouchEvent::down(y, now_ms)),
        MouseEventKind::Drag(MouseButton::Left) => Some(TouchEvent::moved(y, now_ms)),
        MouseEventKind::Up(MouseButton::Left) => Some(TouchEvent::up(y, now_ms)),
        _ => None,
    }
}
