use std::collections::HashMap;

mod daily;
mod dictionary;
mod favorites;
mod filter;
mod kv;
mod preferences;

pub use daily::{
    get_daily_selection, load_daily_selection, persist_daily_selection, DailySelection,
    DailySelectionStore, DEFAULT_QUOTES,
};
pub use dictionary::{WordEntry, WordId};
pub use favorites::{
    load_favorites, persist_favorites, toggle_favorite, FavoritesMap, FavoritesStore, Toggle,
};
pub use filter::{compare_words, filter_words, FilterMode, LONG_WORD_MIN_CHARS, SHORT_WORD_MAX_CHARS};
pub use kv::{keys, KeyValueStore, MemoryStore, SharedStore, StorageError};
pub use preferences::{
    load_preferences, Preferences, PreferencesStore, FONT_SIZE_MULTIPLIER_RANGE,
};

const BUNDLED_WORDS: &str = include_str!("../data/words.json");

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("invalid word list: {0}")]
    InvalidWordList(String),
    #[error("there are no {0} to choose the daily selection from")]
    NothingToSelect(&'static str),
    #[error("invalid value for {name}: {reason}")]
    InvalidPreference { name: &'static str, reason: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The read-only word list, indexed by id.
#[derive(Debug, Clone)]
pub struct Dictionary {
    words: Vec<WordEntry>,
    by_id: HashMap<WordId, usize>,
}

impl Dictionary {
    /// Word list compiled into the crate.
    pub fn bundled() -> Result<Self, DictionaryError> {
        Self::from_json(BUNDLED_WORDS)
    }

    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let words: Vec<WordEntry> = serde_json::from_str(json)
            .map_err(|error| DictionaryError::InvalidWordList(error.to_string()))?;
        Self::new(words)
    }

    /// Rejects duplicate ids and blank words.
    pub fn new(words: Vec<WordEntry>) -> Result<Self, DictionaryError> {
        let mut by_id = HashMap::with_capacity(words.len());
        for (index, entry) in words.iter().enumerate() {
            if entry.word.trim().is_empty() {
                return Err(DictionaryError::InvalidWordList(format!(
                    "word {} has no text",
                    entry.id
                )));
            }
            if by_id.insert(entry.id, index).is_some() {
                return Err(DictionaryError::InvalidWordList(format!(
                    "id {} is used more than once",
                    entry.id
                )));
            }
        }
        log::debug!("Loaded {} words", words.len());
        Ok(Self { words, by_id })
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, id: WordId) -> Option<&WordEntry> {
        self.by_id.get(&id).map(|&index| &self.words[index])
    }

    /// Exact lookup ignoring case and surrounding whitespace.
    pub fn find(&self, word: &str) -> Option<&WordEntry> {
        let word = word.trim().to_lowercase();
        self.words
            .iter()
            .find(|entry| entry.word.to_lowercase() == word)
    }

    pub fn search(&self, query: &str, mode: FilterMode) -> Vec<WordEntry> {
        filter_words(&self.words, query, mode)
    }
}
