use std::sync::Arc;

use anyhow::Context;
use config::Config;
use dictionary::{
    DailySelectionStore, Dictionary, DictionaryError, FavoritesStore, FilterMode,
    PreferencesStore, SharedStore, Toggle, WordEntry,
};
use storage::Storage;
use utilities::{input, str_to_bool, suggest};

mod config;
mod logger;
mod storage;
mod utilities;

const HELP: &str = "\
Commands:
    search <text>        words containing <text>
    words                every word, using the current mode
    mode [all|az|za|short|long]
    show <word>          definition, synonyms and example
    save <word>          save or unsave a word
    unsave <word>        remove a saved word
    saved                list saved words
    today                word of the day and quote
    settings             show preferences
    dark [on|off]        set or flip dark mode
    font <multiplier>    font size multiplier
    notify [on|off]      push notifications
    dnd [on|off]         do not disturb
    exit";

struct App {
    config: Config,
    dictionary: Arc<Dictionary>,
    favorites: FavoritesStore,
    daily: DailySelectionStore,
    preferences: PreferencesStore,
    mode: FilterMode,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logger::init(&config.logging)?;

    let dictionary = Arc::new(load_dictionary(&config)?);
    let storage = Arc::new(
        Storage::initialize(&config.storage.path)
            .await
            .with_context(|| format!("Failed to open {}", config.storage.path.display()))?,
    );
    let shared: SharedStore = storage.clone();
    let mut app = App {
        favorites: FavoritesStore::open(shared.clone()).await,
        daily: DailySelectionStore::new(shared.clone(), dictionary.clone(), config.daily.quotes()),
        preferences: PreferencesStore::open(shared).await,
        dictionary,
        config,
        mode: FilterMode::All,
    };

    while let Some(line) = input(">> ")? {
        let line = line.trim();
        let mut command_parts = line.split_ascii_whitespace();
        let Some(command) = command_parts.next() else {
            continue;
        };
        let argument = command_parts.collect::<Vec<&str>>().join(" ");
        match command {
            "exit" | "leave" | "quit" | "e" | "q" | "l" => {
                break;
            }
            "help" | "?" => println!("{HELP}"),
            "search" | "find" => search(&app, &argument),
            "words" => search(&app, ""),
            "mode" => set_mode(&mut app, &argument),
            "show" | "define" => show_word(&app, &argument).await,
            "save" => toggle_saved(&app, &argument, false).await,
            "unsave" => toggle_saved(&app, &argument, true).await,
            "saved" => list_saved(&app).await,
            "today" => show_today(&app).await?,
            "settings" => show_settings(&app).await,
            "dark" | "font" | "notify" | "dnd" => {
                if let Err(error) = change_setting(&app, command, &argument).await {
                    println!("Couldn't change the setting: {error}");
                }
            }
            _ => {
                println!("Unknown command {command}. Type help for a list of commands.");
            }
        }
    }
    storage.close().await;
    Ok(())
}

fn load_dictionary(config: &Config) -> anyhow::Result<Dictionary> {
    match &config.words.path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read word list: {}", path.display()))?;
            Dictionary::from_json(&json)
                .with_context(|| format!("Failed to load word list: {}", path.display()))
        }
        None => Dictionary::bundled().context("Failed to load the bundled word list"),
    }
}

fn search(app: &App, query: &str) {
    let words = app.dictionary.search(query, app.mode);
    if words.is_empty() {
        println!("No words match '{query}' ({} mode).", app.mode);
        let suggestions = suggest(app.dictionary.words(), query, 3);
        if !suggestions.is_empty() {
            let names = suggestions
                .iter()
                .map(|entry| &entry.word[..])
                .collect::<Vec<&str>>();
            println!("Did you mean: {}?", names.join(", "));
        }
        return;
    }
    for entry in &words {
        println!("{:<16} {}", entry.word, entry.meaning);
    }
    println!("{} word(s), {} mode.", words.len(), app.mode);
}

fn set_mode(app: &mut App, argument: &str) {
    if !argument.is_empty() {
        app.mode = FilterMode::parse_lossy(argument);
    }
    let modes = FilterMode::ALL.map(FilterMode::name);
    println!("Mode: {} (available: {})", app.mode, modes.join(", "));
}

/// Exact match first, otherwise a single close suggestion.
fn lookup<'a>(app: &'a App, word: &str) -> Option<&'a WordEntry> {
    if word.is_empty() {
        println!("Which word?");
        return None;
    }
    if let Some(entry) = app.dictionary.find(word) {
        return Some(entry);
    }
    match suggest(app.dictionary.words(), word, 1).first() {
        Some(entry) => println!("Couldn't find '{word}'. Did you mean {}?", entry.word),
        None => println!("Couldn't find the word you were looking for."),
    }
    None
}

async fn show_word(app: &App, word: &str) {
    if let Some(entry) = lookup(app, word) {
        let saved = app.favorites.is_saved(entry.id).await;
        print_definition(entry, saved);
    }
}

/// With `only_remove`, a word that isn't saved is left alone.
async fn toggle_saved(app: &App, word: &str, only_remove: bool) {
    let Some(entry) = lookup(app, word) else {
        return;
    };
    if only_remove && !app.favorites.is_saved(entry.id).await {
        println!("'{}' is not saved.", entry.word);
        return;
    }
    match app.favorites.toggle(entry).await {
        Ok(Toggle::Added) => println!("Saved '{}'.", entry.word),
        Ok(Toggle::Removed) => println!("Removed '{}' from saved words.", entry.word),
        Err(error) => {
            let state = if app.favorites.is_saved(entry.id).await {
                "saved"
            } else {
                "removed"
            };
            println!("'{}' is {state} for now, but writing it to disk failed: {error}", entry.word);
        }
    }
}

async fn list_saved(app: &App) {
    let favorites = app.favorites.snapshot().await;
    if favorites.is_empty() {
        println!("No saved words yet. Use 'save <word>' to add one.");
        return;
    }
    for entry in favorites.iter() {
        println!("{:<16} {}", entry.word, entry.meaning);
    }
    if !app.favorites.is_in_sync().await {
        println!("(the last change to saved words could not be written to disk)");
    }
}

async fn show_today(app: &App) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let selection = match app.daily.selection_for(today).await {
        Ok(selection) => selection,
        Err(error @ DictionaryError::NothingToSelect(_)) => {
            println!("No word of the day: {error}");
            return Ok(());
        }
        Err(error) => return Err(error).context("Failed to pick the word of the day"),
    };
    println!("Word of the day, {}:", selection.date.format("%A %-d %B %Y"));
    let saved = app.favorites.is_saved(selection.word.id).await;
    print_definition(&selection.word, saved);
    println!();
    println!("Daily quote: \u{201c}{}\u{201d}", selection.quote);
    Ok(())
}

async fn show_settings(app: &App) {
    let preferences = app.preferences.current().await;
    let dark = match preferences.dark_mode {
        Some(true) => "on",
        Some(false) => "off",
        None => "follow system",
    };
    let on_off = |value: bool| if value { "on" } else { "off" };
    println!("Dark mode:          {dark}");
    println!("Font size:          {}x", preferences.font_size_multiplier);
    println!("Push notifications: {}", on_off(preferences.push_notifications));
    println!("Do not disturb:     {}", on_off(preferences.do_not_disturb));
    if !app.preferences.is_in_sync().await {
        println!("(the last change could not be written to disk)");
    }
}

async fn change_setting(app: &App, setting: &str, argument: &str) -> Result<(), DictionaryError> {
    let wanted = str_to_bool(argument);
    if !argument.is_empty() && wanted.is_none() && setting != "font" {
        println!("Expected on or off, got '{argument}'.");
        return Ok(());
    }
    let preferences = app.preferences.current().await;
    match setting {
        "dark" => {
            let enabled = match wanted {
                Some(enabled) => app.preferences.set_dark_mode(enabled).await?,
                None => {
                    app.preferences
                        .toggle_dark_mode(app.config.display.system_dark)
                        .await?
                }
            };
            println!("Dark mode {}.", if enabled { "on" } else { "off" });
        }
        "font" => match argument.parse::<f32>() {
            Ok(multiplier) => {
                app.preferences.set_font_size_multiplier(multiplier).await?;
                println!("Font size set to {multiplier}x.");
            }
            Err(_) => println!("Expected a number such as 1.25, got '{argument}'."),
        },
        "notify" => {
            let enabled = match wanted {
                Some(enabled) if enabled == preferences.push_notifications => enabled,
                _ => app.preferences.toggle_push_notifications().await?,
            };
            println!("Push notifications {}.", if enabled { "on" } else { "off" });
        }
        "dnd" => {
            let enabled = match wanted {
                Some(enabled) if enabled == preferences.do_not_disturb => enabled,
                _ => app.preferences.toggle_do_not_disturb().await?,
            };
            println!("Do not disturb {}.", if enabled { "on" } else { "off" });
        }
        other => unreachable!("There is no such setting {other}"),
    }
    Ok(())
}

fn print_definition(entry: &WordEntry, saved: bool) {
    let marker = if saved { " [saved]" } else { "" };
    match &entry.part_of_speech {
        Some(part_of_speech) => println!("{} ({part_of_speech}){marker}", entry.word),
        None => println!("{}{marker}", entry.word),
    }
    println!("    {}", entry.meaning);
    if let Some(example) = &entry.example {
        println!("      example: {example}");
    }
    if !entry.synonyms.is_empty() {
        println!("      synonyms: {}", entry.synonyms.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use dictionary::{MemoryStore, WordId};

    use super::*;

    async fn test_app() -> App {
        let config = Config::default();
        let dictionary = Arc::new(Dictionary::bundled().unwrap());
        let shared = MemoryStore::shared();
        App {
            favorites: FavoritesStore::open(shared.clone()).await,
            daily: DailySelectionStore::new(shared.clone(), dictionary.clone(), config.daily.quotes()),
            preferences: PreferencesStore::open(shared).await,
            dictionary,
            config,
            mode: FilterMode::All,
        }
    }

    #[tokio::test]
    async fn unsave_leaves_unsaved_words_alone() {
        let app = test_app().await;
        toggle_saved(&app, "petrichor", true).await;
        assert!(!app.favorites.is_saved(WordId(1)).await);
        assert_eq!(app.favorites.len().await, 0);
    }

    #[tokio::test]
    async fn save_then_unsave_removes_the_word() {
        let app = test_app().await;
        toggle_saved(&app, "Petrichor", false).await;
        assert!(app.favorites.is_saved(WordId(1)).await);
        toggle_saved(&app, "petrichor", true).await;
        assert!(!app.favorites.is_saved(WordId(1)).await);
    }
}
