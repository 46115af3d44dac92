use std::str::FromStr;

use crate::error::StorageError;
use crate::storage::{KeyValueStore, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
    EyeCare,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "eye-care" => Ok(Theme::EyeCare),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::EyeCare,
            Theme::EyeCare => Theme::Light,
        }
    }

    /// Saved preference, or the default when unset or unrecognised
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!("failed to read theme preference: {}", e);
                Theme::default()
            }
        }
    }

    pub fn save<S: KeyValueStore>(self, store: &S) -> Result<(), StorageError> {
        store.set(THEME_KEY, &self.to_string())
    }
}
