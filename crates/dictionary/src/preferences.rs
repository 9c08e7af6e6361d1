use std::ops::RangeInclusive;
use std::str::FromStr;

use tokio::sync::Mutex;

use crate::kv::{keys, KeyValueStore, SharedStore};
use crate::DictionaryError;

pub const FONT_SIZE_MULTIPLIER_RANGE: RangeInclusive<f32> = 0.5..=2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    /// `None` follows the system appearance.
    pub dark_mode: Option<bool>,
    pub font_size_multiplier: f32,
    pub push_notifications: bool,
    pub do_not_disturb: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: None,
            font_size_multiplier: 1.0,
            push_notifications: true,
            do_not_disturb: false,
        }
    }
}

impl Preferences {
    pub fn dark_mode_enabled(&self, system_dark: bool) -> bool {
        self.dark_mode.unwrap_or(system_dark)
    }
}

async fn read_value<T: FromStr>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(raw) => raw?,
        Err(error) => {
            log::warn!("Failed to read preference {key}: {error}");
            return None;
        }
    };
    let value = raw.trim().parse().ok();
    if value.is_none() {
        log::warn!("Ignoring unreadable preference {key}={raw:?}");
    }
    value
}

/// Each preference is read on its own; a missing or unreadable one keeps its default.
pub async fn load_preferences(store: &dyn KeyValueStore) -> Preferences {
    let defaults = Preferences::default();
    let font_size_multiplier = read_value::<f32>(store, keys::FONT_SIZE_MULTIPLIER)
        .await
        .filter(|multiplier| FONT_SIZE_MULTIPLIER_RANGE.contains(multiplier))
        .unwrap_or(defaults.font_size_multiplier);
    Preferences {
        dark_mode: read_value(store, keys::DARK_MODE).await,
        font_size_multiplier,
        push_notifications: read_value(store, keys::PUSH_NOTIFICATIONS)
            .await
            .unwrap_or(defaults.push_notifications),
        do_not_disturb: read_value(store, keys::DO_NOT_DISTURB)
            .await
            .unwrap_or(defaults.do_not_disturb),
    }
}

struct PreferencesState {
    preferences: Preferences,
    in_sync: bool,
}

/// Same write discipline as the favorites: update in memory, then write under the lock.
pub struct PreferencesStore {
    storage: SharedStore,
    state: Mutex<PreferencesState>,
}

impl PreferencesStore {
    pub async fn open(storage: SharedStore) -> Self {
        let preferences = load_preferences(storage.as_ref()).await;
        Self {
            storage,
            state: Mutex::new(PreferencesState {
                preferences,
                in_sync: true,
            }),
        }
    }

    pub async fn current(&self) -> Preferences {
        self.state.lock().await.preferences
    }

    pub async fn is_in_sync(&self) -> bool {
        self.state.lock().await.in_sync
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<bool, DictionaryError> {
        self.update(keys::DARK_MODE, |preferences| {
            preferences.dark_mode = Some(enabled);
            enabled.to_string()
        })
        .await?;
        Ok(enabled)
    }

    /// Flips whatever is currently shown, so the first toggle from "follow system"
    /// goes to the opposite of `system_dark`.
    pub async fn toggle_dark_mode(&self, system_dark: bool) -> Result<bool, DictionaryError> {
        let mut enabled = false;
        self.update(keys::DARK_MODE, |preferences| {
            enabled = !preferences.dark_mode_enabled(system_dark);
            preferences.dark_mode = Some(enabled);
            enabled.to_string()
        })
        .await?;
        Ok(enabled)
    }

    pub async fn set_font_size_multiplier(&self, multiplier: f32) -> Result<(), DictionaryError> {
        if !FONT_SIZE_MULTIPLIER_RANGE.contains(&multiplier) {
            return Err(DictionaryError::InvalidPreference {
                name: keys::FONT_SIZE_MULTIPLIER,
                reason: format!(
                    "{multiplier} is outside {}..={}",
                    FONT_SIZE_MULTIPLIER_RANGE.start(),
                    FONT_SIZE_MULTIPLIER_RANGE.end()
                ),
            });
        }
        self.update(keys::FONT_SIZE_MULTIPLIER, |preferences| {
            preferences.font_size_multiplier = multiplier;
            multiplier.to_string()
        })
        .await
    }

    pub async fn toggle_push_notifications(&self) -> Result<bool, DictionaryError> {
        let mut enabled = false;
        self.update(keys::PUSH_NOTIFICATIONS, |preferences| {
            preferences.push_notifications = !preferences.push_notifications;
            enabled = preferences.push_notifications;
            enabled.to_string()
        })
        .await?;
        Ok(enabled)
    }

    pub async fn toggle_do_not_disturb(&self) -> Result<bool, DictionaryError> {
        let mut enabled = false;
        self.update(keys::DO_NOT_DISTURB, |preferences| {
            preferences.do_not_disturb = !preferences.do_not_disturb;
            enabled = preferences.do_not_disturb;
            enabled.to_string()
        })
        .await?;
        Ok(enabled)
    }

    async fn update<F>(&self, key: &'static str, apply: F) -> Result<(), DictionaryError>
    where
        F: FnOnce(&mut Preferences) -> String,
    {
        let mut state = self.state.lock().await;
        let value = apply(&mut state.preferences);
        let result = self.storage.set(key, &value).await;
        state.in_sync = result.is_ok();
        result.map_err(|error| {
            log::error!("Failed to save preference {key}: {error}");
            DictionaryError::from(error)
        })
    }
}
