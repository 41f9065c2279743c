/// Input: raw platform events and their translation into intents.
///
/// Backends implement `InputSource` and hand over every event available right
/// now, in arrival order, without blocking. `translate` turns that batch into
/// the tick's intents:
///   KeyDown(arrow) → Move, KeyDown(Space) → TillSoil, WindowClose → Quit.
/// Key-up and everything else produce nothing.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::config::GameConfig;
use crate::domain::entity::MoveDir;
use crate::domain::intent::Intent;
use super::gamepad::GamepadState;

/// Keys the game understands. Backends fold their own key sets onto these.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawEvent {
    KeyDown(Key),
    KeyUp(Key),
    WindowClose,
    Other,
}

pub trait InputSource {
    /// Take every pending event. Must not block; leaves the queue empty.
    fn drain(&mut self) -> io::Result<Vec<RawEvent>>;
}

pub fn translate(events: &[RawEvent]) -> Vec<Intent> {
    events.iter().filter_map(|&e| intent_for(e)).collect()
}

fn intent_for(event: RawEvent) -> Option<Intent> {
    match event {
        RawEvent::KeyDown(Key::Up) => Some(Intent::Move(MoveDir::Up)),
        RawEvent::KeyDown(Key::Down) => Some(Intent::Move(MoveDir::Down)),
        RawEvent::KeyDown(Key::Left) => Some(Intent::Move(MoveDir::Left)),
        RawEvent::KeyDown(Key::Right) => Some(Intent::Move(MoveDir::Right)),
        RawEvent::KeyDown(Key::Space) => Some(Intent::TillSoil),
        RawEvent::WindowClose => Some(Intent::Quit),
        RawEvent::KeyUp(_) | RawEvent::Other => None,
    }
}

/// Drain `source` once and translate: one call per tick.
pub fn intents_for_tick<I: InputSource + ?Sized>(source: &mut I) -> io::Result<Vec<Intent>> {
    Ok(translate(&source.drain()?))
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_TILL: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_CLOSE: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

fn game_key(code: KeyCode) -> Option<Key> {
    if KEYS_UP.contains(&code) {
        Some(Key::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Key::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(Key::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Key::Right)
    } else if KEYS_TILL.contains(&code) {
        Some(Key::Space)
    } else {
        None
    }
}

/// Terminal keyboard backend (crossterm).
///
/// A terminal has no close button: Esc, `q` and Ctrl+C stand in for it.
/// Release events only arrive when the terminal supports keyboard enhancement;
/// the game never needs them, so they are passed through as `KeyUp` either way.
pub struct KeyboardInput {
    /// Treat auto-repeat as fresh presses. Without keyboard enhancement the
    /// terminal reports repeats as presses anyway.
    key_repeat: bool,
}

impl KeyboardInput {
    pub fn new(key_repeat: bool) -> Self {
        KeyboardInput { key_repeat }
    }

    fn map_event(&self, event: Event) -> RawEvent {
        match event {
            Event::Key(key) => self.map_key(key),
            _ => RawEvent::Other,
        }
    }

    fn map_key(&self, key: KeyEvent) -> RawEvent {
        let down = match key.kind {
            KeyEventKind::Press => true,
            KeyEventKind::Repeat => {
                if !self.key_repeat {
                    return RawEvent::Other;
                }
                true
            }
            KeyEventKind::Release => false,
        };

        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'));
        if ctrl_c || KEYS_CLOSE.contains(&key.code) {
            return if down { RawEvent::WindowClose } else { RawEvent::Other };
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return RawEvent::Other;
        }

        match (game_key(key.code), down) {
            (Some(k), true) => RawEvent::KeyDown(k),
            (Some(k), false) => RawEvent::KeyUp(k),
            (None, _) => RawEvent::Other,
        }
    }
}

impl InputSource for KeyboardInput {
    fn drain(&mut self) -> io::Result<Vec<RawEvent>> {
        let mut events = Vec::with_capacity(8);
        while poll(Duration::ZERO)? {
            events.push(self.map_event(event::read()?));
        }
        Ok(events)
    }
}

/// Every input device of the process behind one source.
/// Keyboard events of a tick come before gamepad events of the same tick.
pub struct Devices {
    keyboard: KeyboardInput,
    gamepad: GamepadState,
}

impl Devices {
    pub fn new(config: &GameConfig) -> Self {
        let mut gamepad = GamepadState::new();
        gamepad.load_button_config(&config.gamepad);
        Devices {
            keyboard: KeyboardInput::new(config.input.key_repeat),
            gamepad,
        }
    }

    pub fn gamepad_connected(&self) -> bool {
        self.gamepad.connected
    }
}

impl InputSource for Devices {
    fn drain(&mut self) -> io::Result<Vec<RawEvent>> {
        let mut events = self.keyboard.drain()?;
        events.extend(self.gamepad.drain()?);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(key(code, KeyEventKind::Press))
    }

    #[test]
    fn translate_keeps_event_order() {
        let events = [
            RawEvent::KeyDown(Key::Up),
            RawEvent::KeyDown(Key::Space),
            RawEvent::KeyDown(Key::Left),
            RawEvent::WindowClose,
            RawEvent::KeyDown(Key::Right),
        ];
        assert_eq!(
            translate(&events),
            vec![
                Intent::Move(MoveDir::Up),
                Intent::TillSoil,
                Intent::Move(MoveDir::Left),
                Intent::Quit,
                Intent::Move(MoveDir::Right),
            ]
        );
    }

    #[test]
    fn key_up_and_other_are_ignored() {
        let events = [
            RawEvent::KeyUp(Key::Up),
            RawEvent::Other,
            RawEvent::KeyUp(Key::Space),
            RawEvent::KeyDown(Key::Down),
        ];
        assert_eq!(translate(&events), vec![Intent::Move(MoveDir::Down)]);
    }

    #[test]
    fn intents_for_tick_drains_everything() {
        struct Queue(Vec<RawEvent>);
        impl InputSource for Queue {
            fn drain(&mut self) -> io::Result<Vec<RawEvent>> {
                Ok(std::mem::take(&mut self.0))
            }
        }

        let mut q = Queue(vec![RawEvent::KeyDown(Key::Space), RawEvent::KeyDown(Key::Up)]);
        assert_eq!(intents_for_tick(&mut q).unwrap().len(), 2);
        assert!(q.0.is_empty());
        assert!(intents_for_tick(&mut q).unwrap().is_empty());
    }

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        let kb = KeyboardInput::new(true);
        assert_eq!(kb.map_event(press(KeyCode::Up)), RawEvent::KeyDown(Key::Up));
        assert_eq!(kb.map_event(press(KeyCode::Char('w'))), RawEvent::KeyDown(Key::Up));
        assert_eq!(kb.map_event(press(KeyCode::Char('S'))), RawEvent::KeyDown(Key::Down));
        assert_eq!(kb.map_event(press(KeyCode::Left)), RawEvent::KeyDown(Key::Left));
        assert_eq!(kb.map_event(press(KeyCode::Char('d'))), RawEvent::KeyDown(Key::Right));
        assert_eq!(kb.map_event(press(KeyCode::Char(' '))), RawEvent::KeyDown(Key::Space));
    }

    #[test]
    fn close_keys_and_ctrl_c_close_the_window() {
        let kb = KeyboardInput::new(true);
        assert_eq!(kb.map_event(press(KeyCode::Esc)), RawEvent::WindowClose);
        assert_eq!(kb.map_event(press(KeyCode::Char('q'))), RawEvent::WindowClose);

        let mut ctrl_c = key(KeyCode::Char('c'), KeyEventKind::Press);
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        assert_eq!(kb.map_event(Event::Key(ctrl_c)), RawEvent::WindowClose);

        // releasing Esc is not a second close
        assert_eq!(
            kb.map_event(Event::Key(key(KeyCode::Esc, KeyEventKind::Release))),
            RawEvent::Other
        );
    }

    #[test]
    fn ctrl_modified_game_keys_are_ignored() {
        let kb = KeyboardInput::new(true);
        let mut ctrl_w = key(KeyCode::Char('w'), KeyEventKind::Press);
        ctrl_w.modifiers = KeyModifiers::CONTROL;
        assert_eq!(kb.map_event(Event::Key(ctrl_w)), RawEvent::Other);
    }

    #[test]
    fn release_becomes_key_up() {
        let kb = KeyboardInput::new(true);
        let ev = Event::Key(key(KeyCode::Right, KeyEventKind::Release));
        assert_eq!(kb.map_event(ev), RawEvent::KeyUp(Key::Right));
    }

    #[test]
    fn repeat_follows_config() {
        let ev = Event::Key(key(KeyCode::Up, KeyEventKind::Repeat));
        assert_eq!(KeyboardInput::new(true).map_event(ev.clone()), RawEvent::KeyDown(Key::Up));
        assert_eq!(KeyboardInput::new(false).map_event(ev), RawEvent::Other);
    }

    #[test]
    fn unknown_keys_and_non_key_events_are_other() {
        let kb = KeyboardInput::new(true);
        assert_eq!(kb.map_event(press(KeyCode::Char('z'))), RawEvent::Other);
        assert_eq!(kb.map_event(Event::Resize(80, 24)), RawEvent::Other);
        let mouse = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(kb.map_event(mouse), RawEvent::Other);
    }
}
