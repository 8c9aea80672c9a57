//! Persistent user settings

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const SETTINGS_DIR_NAME: &str = "refscrn";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_HOTKEY: &str = "Alt+A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub hotkey: String,
    pub auto_start: bool,
    pub default_save_path: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            hotkey: DEFAULT_HOTKEY.to_string(),
            auto_start: false,
            default_save_path: export::default_save_dir(),
        }
    }
}

impl AppSettings {
    /// Load from the user config directory; missing or unreadable files give defaults
    pub fn load() -> Self {
        let loaded = resolve_settings_path().and_then(|path| load_from_path(&path));
        match loaded {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = resolve_settings_path()?;
        save_to_path(&path, self)?;
        Ok(path)
    }

    pub fn hotkey(&self) -> HotkeySpec {
        HotkeySpec::parse(&self.hotkey)
    }

    /// Remember the folder of a successful save
    pub fn remember_save_dir(&mut self, saved_file: &Path) -> bool {
        match saved_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && dir != self.default_save_path => {
                self.default_save_path = dir.to_path_buf();
                true
            }
            _ => false,
        }
    }
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| anyhow!("no user config directory"))?;
    Ok(base.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
}

fn load_from_path(path: &Path) -> Result<AppSettings> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read settings file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(AppSettings::default());
    }

    serde_json::from_str(&content)
        .with_context(|| format!("deserialize settings file {}", path.display()))
}

fn save_to_path(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create settings folder {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings).context("serialize settings")?;
    std::fs::write(path, json).with_context(|| format!("write settings file {}", path.display()))
}

/// Parsed global hotkey such as `Ctrl+Alt+A`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeySpec {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
    pub key: String,
}

impl Default for HotkeySpec {
    fn default() -> Self {
        Self { ctrl: false, alt: true, shift: false, win: false, key: "A".to_string() }
    }
}

impl HotkeySpec {
    /// Modifiers are matched case-insensitively; the last token is the key.
    /// Anything unparsable falls back to `Alt+A`.
    pub fn parse(text: &str) -> Self {
        let tokens: Vec<&str> = text.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = tokens.split_last() else {
            return Self::default();
        };
        if key.is_empty() {
            log::warn!("Hotkey {:?} has no key, using {}", text, DEFAULT_HOTKEY);
            return Self::default();
        }

        let mut spec = Self {
            ctrl: false,
            alt: false,
            shift: false,
            win: false,
            key: key.to_ascii_uppercase(),
        };
        for modifier in modifiers {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => spec.ctrl = true,
                "alt" => spec.alt = true,
                "shift" => spec.shift = true,
                "win" | "windows" | "super" => spec.win = true,
                other => {
                    log::warn!("Unknown hotkey modifier {:?} in {:?}, using {}", other, text, DEFAULT_HOTKEY);
                    return Self::default();
                }
            }
        }
        spec
    }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, name) in [(self.ctrl, "Ctrl"), (self.alt, "Alt"), (self.shift, "Shift"), (self.win, "Win")] {
            if on {
                write!(f, "{}+", name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}
