/// Gamepad input using gilrs, folded into the same raw events as the keyboard.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Up / Down / Left / Right
///   A / X                 →  Space (till)
///   Select                →  window close (quit)
///
/// Without the `gamepad` feature, or without a gamepad subsystem, `drain`
/// always yields nothing.

use std::io;

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use super::input::{InputSource, Key, RawEvent};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2" => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

#[cfg(feature = "gamepad")]
fn dpad_key(btn: Button) -> Option<Key> {
    match btn {
        Button::DPadUp => Some(Key::Up),
        Button::DPadDown => Some(Key::Down),
        Button::DPadLeft => Some(Key::Left),
        Button::DPadRight => Some(Key::Right),
        _ => None,
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    till: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            till: vec![Btn::A, Btn::X],
            quit: vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Lists with no recognizable button name keep the current mapping.
    fn apply(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names
                .iter()
                .filter_map(|s| {
                    let btn = Btn::from_name(s);
                    if btn.is_none() {
                        log::warn!("unknown gamepad button name in config: {s:?}");
                    }
                    btn
                })
                .collect()
        }
        let till = parse_list(&cfg.till);
        if !till.is_empty() { self.till = till; }
        let quit = parse_list(&cfg.quit);
        if !quit.is_empty() { self.quit = quit; }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn event_for(&self, btn: Btn, pressed: bool) -> Option<RawEvent> {
        if self.till.contains(&btn) {
            Some(if pressed { RawEvent::KeyDown(Key::Space) } else { RawEvent::KeyUp(Key::Space) })
        } else if pressed && self.quit.contains(&btn) {
            Some(RawEvent::WindowClose)
        } else {
            None
        }
    }
}

/// Left stick as four digital directions; only edges become events.
#[derive(Default)]
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
struct Stick {
    x: f32,
    y: f32,
    held: [bool; 4],
}

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
impl Stick {
    const KEYS: [Key; 4] = [Key::Up, Key::Down, Key::Left, Key::Right];

    fn edges(&mut self, out: &mut Vec<RawEvent>) {
        let now = [
            self.y > STICK_DEADZONE,
            self.y < -STICK_DEADZONE,
            self.x < -STICK_DEADZONE,
            self.x > STICK_DEADZONE,
        ];
        for (i, key) in Self::KEYS.iter().enumerate() {
            if now[i] != self.held[i] {
                out.push(if now[i] { RawEvent::KeyDown(*key) } else { RawEvent::KeyUp(*key) });
            }
        }
        self.held = now;
    }

    fn release(&mut self, out: &mut Vec<RawEvent>) {
        self.x = 0.0;
        self.y = 0.0;
        self.edges(out);
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    stick: Stick,
    action_map: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::debug!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            stick: Stick::default(),
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map.apply(cfg);
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self, out: &mut Vec<RawEvent>) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.on_button(btn, true, out);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.on_button(btn, false, out);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.on_axis(axis, value, out);
                }
                EventType::Connected => {
                    self.connected = true;
                    log::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick.release(out);
                    log::info!("gamepad disconnected");
                }
                _ => {}
            }
        }
    }

    /// Stick edges go out as soon as the axis moves, in arrival order with buttons.
    #[cfg(feature = "gamepad")]
    fn on_axis(&mut self, axis: Axis, value: f32, out: &mut Vec<RawEvent>) {
        match axis {
            Axis::LeftStickX => self.stick.x = value,
            Axis::LeftStickY => self.stick.y = value,
            _ => return,
        }
        self.stick.edges(out);
    }

    #[cfg(feature = "gamepad")]
    fn on_button(&mut self, btn: Button, pressed: bool, out: &mut Vec<RawEvent>) {
        if let Some(key) = dpad_key(btn) {
            out.push(if pressed { RawEvent::KeyDown(key) } else { RawEvent::KeyUp(key) });
            return;
        }
        if let Some(ev) = Btn::from_gilrs(btn).and_then(|b| self.action_map.event_for(b, pressed)) {
            out.push(ev);
        }
    }
}

impl InputSource for GamepadState {
    fn drain(&mut self) -> io::Result<Vec<RawEvent>> {
        #[allow(unused_mut)]
        let mut out = Vec::new();
        #[cfg(feature = "gamepad")]
        self.poll_gilrs(&mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn button_names_and_aliases() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name("RB"), Some(Btn::R1));
        assert_eq!(Btn::from_name(" back "), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn till_buttons_press_and_release_space() {
        let map = ActionMap::default();
        assert_eq!(map.event_for(Btn::A, true), Some(RawEvent::KeyDown(Key::Space)));
        assert_eq!(map.event_for(Btn::X, false), Some(RawEvent::KeyUp(Key::Space)));
        assert_eq!(map.event_for(Btn::B, true), None);
    }

    #[test]
    fn quit_button_fires_on_press_only() {
        let map = ActionMap::default();
        assert_eq!(map.event_for(Btn::Select, true), Some(RawEvent::WindowClose));
        assert_eq!(map.event_for(Btn::Select, false), None);
    }

    #[test]
    fn config_overrides_mapping_and_ignores_junk() {
        let mut map = ActionMap::default();
        map.apply(&GamepadConfig {
            till: names(&["B", "nonsense"]),
            quit: names(&["???"]),
        });
        assert_eq!(map.till, vec![Btn::B]);
        // nothing recognizable: default stays
        assert_eq!(map.quit, vec![Btn::Select]);
    }

    #[test]
    fn stick_emits_edges_only() {
        let mut stick = Stick::default();
        let mut out = Vec::new();

        stick.x = 0.9;
        stick.edges(&mut out);
        assert_eq!(out, vec![RawEvent::KeyDown(Key::Right)]);

        out.clear();
        stick.x = 0.8;
        stick.edges(&mut out);
        assert!(out.is_empty());

        stick.x = 0.1;
        stick.y = 0.6;
        stick.edges(&mut out);
        assert_eq!(out, vec![RawEvent::KeyDown(Key::Up), RawEvent::KeyUp(Key::Right)]);
    }

    #[test]
    fn stick_release_lets_go_of_everything() {
        let mut stick = Stick { x: -1.0, y: -1.0, held: [false; 4] };
        let mut out = Vec::new();
        stick.edges(&mut out);
        out.clear();
        stick.release(&mut out);
        assert_eq!(out, vec![RawEvent::KeyUp(Key::Down), RawEvent::KeyUp(Key::Left)]);
    }

    #[cfg(feature = "gamepad")]
    #[test]
    fn stick_and_buttons_keep_arrival_order() {
        let mut pad = GamepadState {
            gilrs: None,
            stick: Stick::default(),
            action_map: ActionMap::default(),
            connected: false,
        };
        let mut out = Vec::new();
        pad.on_axis(Axis::LeftStickX, -1.0, &mut out);
        pad.on_button(Button::South, true, &mut out);
        pad.on_axis(Axis::LeftStickX, 0.0, &mut out);
        pad.on_axis(Axis::RightStickX, 1.0, &mut out);

        assert_eq!(
            out,
            vec![
                RawEvent::KeyDown(Key::Left),
                RawEvent::KeyDown(Key::Space),
                RawEvent::KeyUp(Key::Left),
            ]
        );
    }
}
