//! Light/dark theme preference.
//!
//! The preference lives in a long-term [`KeyValueStore`], separate from the
//! session cache. Priority when loading: saved value, then the system
//! preference, then light.

use portfolio_session::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

pub const THEME_STORAGE_KEY: &str = "portfolio.theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme mode: {other}")),
        }
    }
}

pub struct ThemePreference {
    storage: Arc<dyn KeyValueStore>,
    mode: ThemeMode,
}

impl ThemePreference {
    /// `system` is the platform's current preference, if it reports one.
    pub fn load(storage: Arc<dyn KeyValueStore>, system: Option<ThemeMode>) -> Self {
        let mode = saved_mode(storage.as_ref())
            .or(system)
            .unwrap_or_default();
        Self { storage, mode }
    }

    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    #[must_use]
    pub fn is_dark_mode(&self) -> bool {
        self.mode == ThemeMode::Dark
    }

    pub fn set_theme(&mut self, mode: ThemeMode) {
        self.mode = mode;
        self.storage
            .set(THEME_STORAGE_KEY, mode.as_str().to_string());
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.set_theme(self.mode.toggled());
        self.mode
    }

    /// Follow a system preference change unless the user picked a theme.
    /// Returns whether the mode was applied.
    pub fn on_system_change(&mut self, system: ThemeMode) -> bool {
        if saved_mode(self.storage.as_ref()).is_some() {
            return false;
        }
        self.mode = system;
        true
    }
}

fn saved_mode(storage: &dyn KeyValueStore) -> Option<ThemeMode> {
    storage.get(THEME_STORAGE_KEY)?.parse().ok()
}
