/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Problems found while loading are collected in `warnings`; the logger is
/// not up yet at this point, so the caller reports them afterwards.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub gamepad: GamepadConfig,
    /// Explicit log filter; `None` picks one from where the log goes.
    pub log_level: Option<String>,
    /// Send the log to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub tile_size: u32,
    pub fps: u32,
    pub title: String,
}

/// Largest grid accepted from config; the terminal back buffer grows with it.
const MAX_GRID_CELLS: u64 = 256 * 256;

impl DisplayConfig {
    /// Grid dimensions covered by the screen: `screen / tile_size`.
    pub fn grid_size(&self) -> (u32, u32) {
        if self.tile_size == 0 {
            return (0, 0);
        }
        (self.screen_width / self.tile_size, self.screen_height / self.tile_size)
    }

    /// Non-empty grid, at most `MAX_GRID_CELLS` tiles, pixel coordinates within `i32`.
    fn is_usable(&self) -> bool {
        let (gw, gh) = self.grid_size();
        let max_px = i32::MAX as u32;
        gw > 0
            && gh > 0
            && (gw as u64) * (gh as u64) <= MAX_GRID_CELLS
            && self.screen_width <= max_px
            && self.screen_height <= max_px
            && self.fps > 0
    }
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    pub key_repeat: bool,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub till: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    input: TomlInput,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_screen_width")]
    screen_width: u32,
    #[serde(default = "default_screen_height")]
    screen_height: u32,
    #[serde(default = "default_tile_size")]
    tile_size: u32,
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default = "default_title")]
    title: String,
}

#[derive(Deserialize, Debug)]
struct TomlInput {
    #[serde(default = "default_key_repeat")]
    key_repeat: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_till")]
    till: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_screen_width() -> u32 { 640 }
fn default_screen_height() -> u32 { 480 }
fn default_tile_size() -> u32 { 32 }
fn default_fps() -> u32 { 60 }
fn default_title() -> String { "Farm Grid".into() }
fn default_key_repeat() -> bool { true }
fn default_till() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            tile_size: default_tile_size(),
            fps: default_fps(),
            title: default_title(),
        }
    }
}

impl Default for TomlInput {
    fn default() -> Self {
        TomlInput { key_repeat: default_key_repeat() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            till: default_till(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), Vec::new())
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&candidate_dirs(), &mut warnings);
        GameConfig::from_toml(toml_cfg, warnings)
    }

    /// Parse config text directly, without any file lookup.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(cfg, Vec::new()))
    }

    fn from_toml(cfg: TomlConfig, mut warnings: Vec<String>) -> Self {
        let mut display = DisplayConfig {
            screen_width: cfg.display.screen_width,
            screen_height: cfg.display.screen_height,
            tile_size: cfg.display.tile_size,
            fps: cfg.display.fps,
            title: cfg.display.title,
        };

        if !display.is_usable() {
            warnings.push(format!(
                "invalid [display] settings ({}x{} screen, tile {}, {} fps); using defaults",
                display.screen_width, display.screen_height, display.tile_size, display.fps,
            ));
            let d = TomlDisplay::default();
            display = DisplayConfig {
                screen_width: d.screen_width,
                screen_height: d.screen_height,
                tile_size: d.tile_size,
                fps: d.fps,
                title: d.title,
            };
        }

        GameConfig {
            display,
            input: InputConfig { key_repeat: cfg.input.key_repeat },
            gamepad: GamepadConfig {
                till: cfg.gamepad.till,
                quit: cfg.gamepad.quit,
            },
            log_level: cfg.general.log_level.filter(|l| !l.trim().is_empty()),
            log_file: cfg.general.log_file.filter(|f| !f.trim().is_empty()).map(PathBuf::from),
            warnings,
        }
    }
}

impl GameConfig {
    /// Default log filter. A log sharing the terminal with the game stays at
    /// `warn` so it does not scribble over the screen; a log going elsewhere
    /// gets the per-move diagnostics at `info`.
    pub fn log_filter(&self, on_screen: bool) -> &str {
        match &self.log_level {
            Some(level) => level,
            None if on_screen => "warn",
            None => "info",
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First `config.toml` found wins. A malformed file means all defaults.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            return read_toml(&path, warnings);
        }
    }
    TomlConfig::default()
}

fn read_toml(path: &Path, warnings: &mut Vec<String>) -> TomlConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warnings.push(format!("{} parse error, using default settings: {e}", path.display()));
                TomlConfig::default()
            }
        },
        Err(e) => {
            warnings.push(format!("could not read {}: {e}", path.display()));
            TomlConfig::default()
        }
    }
}
