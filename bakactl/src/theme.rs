use std::env;
use std::fmt;
use std::str::FromStr;

use comfy_table::Color;
use tracing::debug;

use client::{BooruError, LocalStorage, STORAGE_KEY_THEME};
use common::TagType;

const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("invalid theme: '{s}' (expected 'light' or 'dark')")),
        }
    }
}

/// Terminal background preference from `COLORFGBG` (`fg;bg` or
/// `fg;default;bg`). Dark when unset or unreadable.
#[must_use]
pub fn os_theme() -> Theme {
    env::var("COLORFGBG")
        .ok()
        .and_then(|v| theme_from_colorfgbg(&v))
        .unwrap_or(Theme::Dark)
}

fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    // 0-6 and 8 are the dark entries of the 16 colour palette
    if bg <= 6 || bg == 8 {
        Some(Theme::Dark)
    } else {
        Some(Theme::Light)
    }
}

/// Current colour theme, persisted in local storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeStore {
    theme: Theme,
}

impl ThemeStore {
    /// Saved theme if any, terminal preference otherwise.
    #[must_use]
    pub fn load(storage: &LocalStorage) -> Self {
        Self::from_saved(storage.get(STORAGE_KEY_THEME), os_theme())
    }

    /// Any saved value other than `dark` reads as light.
    #[must_use]
    pub fn from_saved(saved: Option<&str>, fallback: Theme) -> Self {
        let theme = match saved {
            Some(value) if value == Theme::Dark.as_str() => Theme::Dark,
            Some(_) => Theme::Light,
            None => fallback,
        };
        Self { theme }
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub const fn is_dark(&self) -> bool {
        self.theme.is_dark()
    }

    /// Flips the theme and saves it.
    pub fn toggle(&mut self, storage: &mut LocalStorage) -> Result<Theme, BooruError> {
        self.theme = self.theme.toggled();
        storage.set(STORAGE_KEY_THEME, self.theme.as_str())?;
        debug!("Theme switched to {}", self.theme);
        Ok(self.theme)
    }

    #[must_use]
    pub const fn palette(&self, color: bool) -> Palette {
        Palette {
            theme: self.theme,
            color,
        }
    }
}

/// ANSI colours for terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    theme: Theme,
    color: bool,
}

impl Palette {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            theme: Theme::Dark,
            color: false,
        }
    }

    fn tag_code(&self, kind: &TagType) -> &'static str {
        match (self.theme, kind) {
            (Theme::Dark, TagType::Copyright) => "\x1b[95m",
            (Theme::Dark, TagType::Character) => "\x1b[92m",
            (Theme::Dark, TagType::Artist) => "\x1b[91m",
            (Theme::Dark, TagType::Meta) => "\x1b[93m",
            (Theme::Dark, TagType::Rating) => "\x1b[96m",
            (Theme::Dark, TagType::Year) => "\x1b[94m",
            (Theme::Light, TagType::Copyright) => "\x1b[35m",
            (Theme::Light, TagType::Character) => "\x1b[32m",
            (Theme::Light, TagType::Artist) => "\x1b[31m",
            (Theme::Light, TagType::Meta) => "\x1b[33m",
            (Theme::Light, TagType::Rating) => "\x1b[36m",
            (Theme::Light, TagType::Year) => "\x1b[34m",
            (_, TagType::General | TagType::Other(_)) => "",
        }
    }

    /// Table cell colour for a tag type.
    #[must_use]
    pub fn tag_color(&self, kind: &TagType) -> Option<Color> {
        if !self.color {
            return None;
        }
        match (self.theme, kind) {
            (_, TagType::General | TagType::Other(_)) => None,
            (Theme::Dark, TagType::Copyright) => Some(Color::Magenta),
            (Theme::Dark, TagType::Character) => Some(Color::Green),
            (Theme::Dark, TagType::Artist) => Some(Color::Red),
            (Theme::Dark, TagType::Meta) => Some(Color::Yellow),
            (Theme::Dark, TagType::Rating) => Some(Color::Cyan),
            (Theme::Dark, TagType::Year) => Some(Color::Blue),
            (Theme::Light, TagType::Copyright) => Some(Color::DarkMagenta),
            (Theme::Light, TagType::Character) => Some(Color::DarkGreen),
            (Theme::Light, TagType::Artist) => Some(Color::DarkRed),
            (Theme::Light, TagType::Meta) => Some(Color::DarkYellow),
            (Theme::Light, TagType::Rating) => Some(Color::DarkCyan),
            (Theme::Light, TagType::Year) => Some(Color::DarkBlue),
        }
    }

    /// Tag name coloured by its type.
    #[must_use]
    pub fn tag(&self, name: &str, kind: &TagType) -> String {
        let code = self.tag_code(kind);
        if !self.color || code.is_empty() {
            return name.to_string();
        }
        format!("{code}{name}{ANSI_RESET}")
    }

    #[must_use]
    pub fn highlight(&self, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = if self.theme.is_dark() {
            "\x1b[47;30m"
        } else {
            "\x1b[40;97m"
        };
        format!("{code}{text}{ANSI_RESET}")
    }
}
