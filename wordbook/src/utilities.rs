use std::io::{self, Write};

use dictionary::WordEntry;

/// Reads one line; `None` once stdin is closed.
pub fn input(prompt: &str) -> io::Result<Option<String>> {
    let mut line = String::new();
    print!("{prompt}");
    io::stdout().flush()?;
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

pub fn str_to_bool(str: &str) -> Option<bool> {
    match &str.trim().to_ascii_lowercase()[..] {
        "y" | "yes" | "yeah" | "yea" | "true" | "on" => Some(true),
        "n" | "no" | "nope" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Closest words to `query` by Jaro similarity, best first.
pub fn suggest<'a>(words: &'a [WordEntry], query: &str, limit: usize) -> Vec<&'a WordEntry> {
    let query = query.trim().to_lowercase();
    let mut scored = words
        .iter()
        .map(|entry| (entry, strsim::jaro(&entry.word.to_lowercase(), &query)))
        .filter(|(_, score)| *score > 0.6)
        .collect::<Vec<(&WordEntry, f64)>>();
    // most similar at the start
    scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    scored.into_iter().take(limit).map(|(entry, _)| entry).collect()
}
