use std::cmp::Ordering;
use std::fmt;

use crate::WordEntry;

pub const SHORT_WORD_MAX_CHARS: usize = 6;
pub const LONG_WORD_MIN_CHARS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    AZ,
    ZA,
    Short,
    Long,
}

impl FilterMode {
    pub const ALL: [FilterMode; 5] = [Self::All, Self::AZ, Self::ZA, Self::Short, Self::Long];

    /// Unknown names fall back to [`FilterMode::All`].
    pub fn parse_lossy(name: &str) -> Self {
        match &name.trim().to_ascii_lowercase()[..] {
            "az" | "a-z" => Self::AZ,
            "za" | "z-a" => Self::ZA,
            "short" => Self::Short,
            "long" => Self::Long,
            _ => Self::All,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::AZ => "az",
            Self::ZA => "za",
            Self::Short => "short",
            Self::Long => "long",
        }
    }
}

impl From<&str> for FilterMode {
    fn from(name: &str) -> Self {
        Self::parse_lossy(name)
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive ordering with the raw text as tie-break, so the order is total.
pub fn compare_words(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Narrows `all_words` to the entries whose word contains `query` (ignoring case),
/// then sorts for AZ/ZA, then applies the short/long length class.
///
/// A blank query matches everything; any other query is matched as given,
/// surrounding whitespace included.
pub fn filter_words(all_words: &[WordEntry], query: &str, mode: FilterMode) -> Vec<WordEntry> {
    let match_all = query.trim().is_empty();
    let needle = query.to_lowercase();
    let mut words = all_words
        .iter()
        .filter(|entry| match_all || entry.word.to_lowercase().contains(&needle))
        .cloned()
        .collect::<Vec<WordEntry>>();
    match mode {
        FilterMode::AZ => words.sort_by(|a, b| compare_words(&a.word, &b.word)),
        FilterMode::ZA => words.sort_by(|a, b| compare_words(&b.word, &a.word)),
        _ => {}
    }
    match mode {
        FilterMode::Short => words.retain(|entry| entry.char_len() <= SHORT_WORD_MAX_CHARS),
        FilterMode::Long => words.retain(|entry| entry.char_len() >= LONG_WORD_MIN_CHARS),
        _ => {}
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WordId;

    fn entry(id: u32, word: &str) -> WordEntry {
        WordEntry {
            id: WordId(id),
            word: word.to_owned(),
            part_of_speech: None,
            meaning: String::new(),
            synonyms: Vec::new(),
            example: None,
        }
    }

    fn words(entries: &[WordEntry]) -> Vec<&str> {
        entries.iter().map(|entry| &entry.word[..]).collect()
    }

    fn sample() -> Vec<WordEntry> {
        vec![
            entry(1, "Petrichor"),
            entry(2, "candid"),
            entry(3, "Eloquent"),
            entry(4, "Serendipity"),
            entry(5, "Candid"),
            entry(6, "Verbose"),
            entry(7, "Ephemeral"),
        ]
    }

    #[test]
    fn substring_match_ignores_case_and_keeps_order() {
        let all = vec![entry(1, "Ephemeral"), entry(2, "Eloquent")];
        assert_eq!(words(&filter_words(&all, "el", FilterMode::All)), ["Eloquent"]);
        assert_eq!(words(&filter_words(&all, "EPH", FilterMode::All)), ["Ephemeral"]);
        assert_eq!(
            words(&filter_words(&sample(), "e", FilterMode::All)),
            ["Petrichor", "Eloquent", "Serendipity", "Verbose", "Ephemeral"]
        );
    }

    #[test]
    fn empty_or_blank_query_matches_everything() {
        assert_eq!(filter_words(&sample(), "", FilterMode::All), sample());
        assert_eq!(filter_words(&sample(), "   ", FilterMode::All), sample());
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_query() {
        let all = vec![entry(1, "Eloquent"), entry(2, "Cruel"), entry(3, "ice cream")];
        assert!(filter_words(&all, " el", FilterMode::All).is_empty());
        assert!(filter_words(&all, "m ", FilterMode::All).is_empty());
        assert_eq!(words(&filter_words(&all, "e c", FilterMode::All)), ["ice cream"]);
        assert_eq!(words(&filter_words(&all, "el", FilterMode::All)), ["Eloquent", "Cruel"]);
    }

    #[test]
    fn az_and_za_are_total_orders() {
        let az = filter_words(&sample(), "", FilterMode::AZ);
        assert_eq!(
            words(&az),
            ["Candid", "candid", "Eloquent", "Ephemeral", "Petrichor", "Serendipity", "Verbose"]
        );
        let mut za = filter_words(&sample(), "", FilterMode::ZA);
        za.reverse();
        assert_eq!(za, az);
    }

    #[test]
    fn sorted_results_are_a_permutation_of_the_unsorted_ones() {
        let mut all = filter_words(&sample(), "i", FilterMode::All);
        let mut az = filter_words(&sample(), "i", FilterMode::AZ);
        all.sort_by_key(|entry| entry.id);
        az.sort_by_key(|entry| entry.id);
        assert_eq!(all, az);
    }

    #[test]
    fn short_keeps_six_characters_or_fewer() {
        let all = vec![entry(1, "Candid"), entry(2, "Verbose"), entry(3, "Ephemeral")];
        assert_eq!(words(&filter_words(&all, "", FilterMode::Short)), ["Candid"]);
    }

    #[test]
    fn long_keeps_nine_characters_or_more() {
        let all = vec![entry(1, "Candid"), entry(2, "Verbose"), entry(3, "Ephemeral")];
        assert_eq!(words(&filter_words(&all, "", FilterMode::Long)), ["Ephemeral"]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let all = vec![entry(1, "Café"), entry(2, "Naïveté")];
        assert_eq!(words(&filter_words(&all, "", FilterMode::Short)), ["Café"]);
    }

    #[test]
    fn query_applies_before_length_class() {
        assert_eq!(
            words(&filter_words(&sample(), "er", FilterMode::Long)),
            ["Serendipity", "Ephemeral"]
        );
    }

    #[test]
    fn unknown_modes_fall_back_to_all() {
        assert_eq!(FilterMode::parse_lossy("sideways"), FilterMode::All);
        assert_eq!(FilterMode::from(" A-Z "), FilterMode::AZ);
        for mode in FilterMode::ALL {
            assert_eq!(FilterMode::parse_lossy(mode.name()), mode);
        }
    }
}
