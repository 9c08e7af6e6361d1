use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::kv::{keys, KeyValueStore, SharedStore};
use crate::{Dictionary, DictionaryError, WordEntry, WordId};

pub const DEFAULT_QUOTES: [&str; 5] = [
    "Words are, in my not-so-humble opinion, our most inexhaustible source of magic.",
    "Language is the roadmap of a culture.",
    "A different language is a different vision of life.",
    "To have another language is to possess a second soul.",
    "Words can inspire. And words can destroy. Choose yours well.",
];

/// Word of the day and quote, valid for `date` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySelection {
    pub date: NaiveDate,
    pub word: WordEntry,
    pub quote: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSelection {
    date: NaiveDate,
    word_id: WordId,
    quote: String,
}

/// Returns `cached` unchanged when it is for `today`; otherwise picks a word and a
/// quote uniformly at random.
pub fn get_daily_selection<R: Rng + ?Sized>(
    today: NaiveDate,
    cached: Option<&DailySelection>,
    words: &[WordEntry],
    quotes: &[String],
    rng: &mut R,
) -> Result<DailySelection, DictionaryError> {
    if let Some(cached) = cached.filter(|cached| cached.date == today) {
        return Ok(cached.clone());
    }
    let word = words
        .choose(rng)
        .ok_or(DictionaryError::NothingToSelect("words"))?;
    let quote = quotes
        .choose(rng)
        .ok_or(DictionaryError::NothingToSelect("quotes"))?;
    Ok(DailySelection {
        date: today,
        word: word.clone(),
        quote: quote.clone(),
    })
}

/// Reads the cached selection. Unreadable data, or a word that is no longer in
/// `dictionary`, counts as no cache.
pub async fn load_daily_selection(
    store: &dyn KeyValueStore,
    dictionary: &Dictionary,
) -> Option<DailySelection> {
    let raw = match store.get(keys::DAILY_SELECTION).await {
        Ok(raw) => raw?,
        Err(error) => {
            log::warn!("Failed to read the daily selection: {error}");
            return None;
        }
    };
    let stored: StoredSelection = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(error) => {
            log::warn!("Discarding unreadable daily selection: {error}");
            return None;
        }
    };
    let Some(word) = dictionary.get(stored.word_id) else {
        log::warn!("Daily selection refers to unknown word {}", stored.word_id);
        return None;
    };
    Some(DailySelection {
        date: stored.date,
        word: word.clone(),
        quote: stored.quote,
    })
}

pub async fn persist_daily_selection(
    store: &dyn KeyValueStore,
    selection: &DailySelection,
) -> Result<(), DictionaryError> {
    let stored = StoredSelection {
        date: selection.date,
        word_id: selection.word.id,
        quote: selection.quote.clone(),
    };
    let json = serde_json::to_string(&stored).map_err(|source| DictionaryError::Encode {
        what: "daily selection",
        source,
    })?;
    store
        .set(keys::DAILY_SELECTION, &json)
        .await
        .map_err(DictionaryError::from)
}

struct DailyState {
    loaded: bool,
    cached: Option<DailySelection>,
    rng: StdRng,
}

pub struct DailySelectionStore {
    storage: SharedStore,
    dictionary: Arc<Dictionary>,
    quotes: Vec<String>,
    state: Mutex<DailyState>,
}

impl DailySelectionStore {
    pub fn new(storage: SharedStore, dictionary: Arc<Dictionary>, quotes: Vec<String>) -> Self {
        Self::with_rng(storage, dictionary, quotes, StdRng::from_entropy())
    }

    pub fn with_rng(
        storage: SharedStore,
        dictionary: Arc<Dictionary>,
        quotes: Vec<String>,
        rng: StdRng,
    ) -> Self {
        Self {
            storage,
            dictionary,
            quotes,
            state: Mutex::new(DailyState {
                loaded: false,
                cached: None,
                rng,
            }),
        }
    }

    /// The selection for `today`, picking and saving a new one on the first call of a day.
    /// A failed save is logged and the new selection is still returned.
    pub async fn selection_for(&self, today: NaiveDate) -> Result<DailySelection, DictionaryError> {
        let mut state = self.state.lock().await;
        if !state.loaded {
            state.cached = load_daily_selection(self.storage.as_ref(), &self.dictionary).await;
            state.loaded = true;
        }
        let DailyState { cached, rng, .. } = &mut *state;
        let selection = get_daily_selection(
            today,
            cached.as_ref(),
            self.dictionary.words(),
            &self.quotes,
            rng,
        )?;
        if cached.as_ref() != Some(&selection) {
            log::info!("Picked '{}' as the word of {today}", selection.word.word);
            if let Err(error) = persist_daily_selection(self.storage.as_ref(), &selection).await {
                log::error!("Failed to save the daily selection: {error}");
            }
            state.cached = Some(selection.clone());
        }
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::testing::FlakyStore;
    use crate::kv::MemoryStore;

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn quotes() -> Vec<String> {
        DEFAULT_QUOTES.iter().map(|quote| quote.to_string()).collect()
    }

    fn dictionary() -> Arc<Dictionary> {
        Arc::new(Dictionary::bundled().unwrap())
    }

    #[test]
    fn same_day_returns_the_cached_selection() {
        let dict = dictionary();
        let mut rng = StdRng::seed_from_u64(7);
        let first = get_daily_selection(day(16), None, dict.words(), &quotes(), &mut rng).unwrap();
        for _ in 0..10 {
            let again =
                get_daily_selection(day(16), Some(&first), dict.words(), &quotes(), &mut rng)
                    .unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn new_day_replaces_the_cached_date() {
        let dict = dictionary();
        let mut rng = StdRng::seed_from_u64(7);
        let first = get_daily_selection(day(16), None, dict.words(), &quotes(), &mut rng).unwrap();
        let next =
            get_daily_selection(day(17), Some(&first), dict.words(), &quotes(), &mut rng).unwrap();
        assert_eq!(next.date, day(17));
        assert!(dict.get(next.word.id).is_some());
        assert!(DEFAULT_QUOTES.contains(&&next.quote[..]));
    }

    #[test]
    fn empty_inputs_cannot_be_selected_from() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            get_daily_selection(day(16), None, &[], &quotes(), &mut rng),
            Err(DictionaryError::NothingToSelect("words"))
        ));
        let dict = dictionary();
        assert!(matches!(
            get_daily_selection(day(16), None, dict.words(), &[], &mut rng),
            Err(DictionaryError::NothingToSelect("quotes"))
        ));
    }

    #[tokio::test]
    async fn store_is_idempotent_within_a_day_and_persists() {
        let storage: SharedStore = MemoryStore::shared();
        let dict = dictionary();
        let store = DailySelectionStore::with_rng(
            storage.clone(),
            dict.clone(),
            quotes(),
            StdRng::seed_from_u64(3),
        );
        let first = store.selection_for(day(16)).await.unwrap();
        assert_eq!(store.selection_for(day(16)).await.unwrap(), first);
        assert_eq!(load_daily_selection(storage.as_ref(), &dict).await, Some(first));

        let next = store.selection_for(day(17)).await.unwrap();
        assert_eq!(next.date, day(17));
        assert_eq!(
            load_daily_selection(storage.as_ref(), &dict).await.map(|s| s.date),
            Some(day(17))
        );
    }

    #[tokio::test]
    async fn persisted_selection_survives_a_restart() {
        let storage: SharedStore = MemoryStore::shared();
        let dict = dictionary();
        let first = DailySelectionStore::with_rng(
            storage.clone(),
            dict.clone(),
            quotes(),
            StdRng::seed_from_u64(11),
        )
        .selection_for(day(16))
        .await
        .unwrap();
        let restarted = DailySelectionStore::with_rng(
            storage,
            dict,
            quotes(),
            StdRng::seed_from_u64(99),
        );
        assert_eq!(restarted.selection_for(day(16)).await.unwrap(), first);
    }

    #[tokio::test]
    async fn failed_save_still_returns_and_caches_the_selection() {
        let flaky = Arc::new(FlakyStore::default());
        let dict = dictionary();
        let store = DailySelectionStore::with_rng(
            flaky.clone(),
            dict.clone(),
            quotes(),
            StdRng::seed_from_u64(5),
        );
        flaky.set_failing(true);

        let first = store.selection_for(day(16)).await.unwrap();
        assert_eq!(first.date, day(16));
        assert_eq!(store.selection_for(day(16)).await.unwrap(), first);
        assert_eq!(load_daily_selection(flaky.as_ref(), &dict).await, None);
    }

    #[tokio::test]
    async fn stale_word_id_counts_as_no_cache() {
        let storage = MemoryStore::new();
        storage
            .set(
                keys::DAILY_SELECTION,
                r#"{"date":"2026-10-16","wordId":4242,"quote":"q"}"#,
            )
            .await
            .unwrap();
        assert_eq!(load_daily_selection(&storage, &dictionary()).await, None);
        storage.set(keys::DAILY_SELECTION, "garbage").await.unwrap();
        assert_eq!(load_daily_selection(&storage, &dictionary()).await, None);
    }

    #[tokio::test]
    async fn stored_format_uses_date_word_id_and_quote() {
        let storage = MemoryStore::new();
        let dict = dictionary();
        let selection = DailySelection {
            date: day(16),
            word: dict.get(WordId(1)).unwrap().clone(),
            quote: "Language is the roadmap of a culture.".to_owned(),
        };
        persist_daily_selection(&storage, &selection).await.unwrap();
        let raw = storage.get(keys::DAILY_SELECTION).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["date"], "2026-10-16");
        assert_eq!(json["wordId"], 1);
        assert_eq!(json["quote"], "Language is the roadmap of a culture.");
    }
}
