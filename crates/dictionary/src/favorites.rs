use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::Mutex;

use crate::kv::{keys, KeyValueStore, SharedStore};
use crate::{DictionaryError, WordEntry, WordId};

/// Saved words keyed by id. Stored as a JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesMap {
    entries: BTreeMap<WordId, WordEntry>,
}

impl FavoritesMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: WordId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: WordId) -> Option<&WordEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordEntry> {
        self.entries.values()
    }
}

impl FromIterator<WordEntry> for FavoritesMap {
    fn from_iter<I: IntoIterator<Item = WordEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|entry| (entry.id, entry)).collect(),
        }
    }
}

impl Serialize for FavoritesMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

impl<'de> Deserialize<'de> for FavoritesMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<WordEntry>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// Adds `word` when it is not saved yet, removes it otherwise.
pub fn toggle_favorite(current: &FavoritesMap, word: &WordEntry) -> FavoritesMap {
    let mut next = current.clone();
    if next.entries.remove(&word.id).is_none() {
        next.entries.insert(word.id, word.clone());
    }
    next
}

/// Never fails: anything unreadable counts as no favorites.
pub async fn load_favorites(store: &dyn KeyValueStore) -> FavoritesMap {
    let raw = match store.get(keys::SAVED_WORDS).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return FavoritesMap::new(),
        Err(error) => {
            log::warn!("Failed to read saved words, starting empty: {error}");
            return FavoritesMap::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(favorites) => favorites,
        Err(error) => {
            log::warn!("Discarding unreadable saved words: {error}");
            FavoritesMap::new()
        }
    }
}

pub async fn persist_favorites(
    store: &dyn KeyValueStore,
    favorites: &FavoritesMap,
) -> Result<(), DictionaryError> {
    let json = serde_json::to_string(favorites).map_err(|source| DictionaryError::Encode {
        what: "saved words",
        source,
    })?;
    store.set(keys::SAVED_WORDS, &json).await.map_err(|error| {
        log::error!("Failed to save {} saved words: {error}", favorites.len());
        DictionaryError::from(error)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

struct FavoritesState {
    favorites: FavoritesMap,
    in_sync: bool,
}

/// Saved words plus the store they are written back to after every change.
pub struct FavoritesStore {
    storage: SharedStore,
    state: Mutex<FavoritesState>,
}

impl FavoritesStore {
    pub async fn open(storage: SharedStore) -> Self {
        let favorites = load_favorites(storage.as_ref()).await;
        log::info!("Loaded {} saved words", favorites.len());
        Self {
            storage,
            state: Mutex::new(FavoritesState {
                favorites,
                in_sync: true,
            }),
        }
    }

    /// Applies the toggle in memory, then writes it out before releasing the lock,
    /// so overlapping toggles are applied and written one at a time.
    ///
    /// An error means the write failed; the in-memory change is kept and
    /// [`FavoritesStore::is_in_sync`] reports `false` until a later write succeeds.
    pub async fn toggle(&self, word: &WordEntry) -> Result<Toggle, DictionaryError> {
        let mut state = self.state.lock().await;
        state.favorites = toggle_favorite(&state.favorites, word);
        let toggle = if state.favorites.contains(word.id) {
            Toggle::Added
        } else {
            Toggle::Removed
        };
        let result = persist_favorites(self.storage.as_ref(), &state.favorites).await;
        state.in_sync = result.is_ok();
        result.map(|_| toggle)
    }

    pub async fn is_saved(&self, id: WordId) -> bool {
        self.state.lock().await.favorites.contains(id)
    }

    pub async fn snapshot(&self) -> FavoritesMap {
        self.state.lock().await.favorites.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.favorites.len()
    }

    pub async fn is_in_sync(&self) -> bool {
        self.state.lock().await.in_sync
    }
}
