//! Vocabulary import: JSON word lists, pasted text tables and the import directory.

use crate::models::{BatchId, Vocabulary};
use crate::store::CardStore;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));
static LEADING_INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.?\s*").expect("valid regex"));

/// Header cells of the tables learners usually paste.
const HEADER_MARKERS: &[&str] = &["stt", "từ vựng", "nghĩa"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a non-empty JSON array of words")]
    NotAnArray,
    #[error("no valid entries found")]
    NoValidEntries,
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Outcome of importing one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub batch: BatchId,
    pub added: usize,
    pub duplicates: usize,
    /// Records missing a word or meaning.
    pub skipped: usize,
}

/// One word-list entry as exported by the vocabulary sheets.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    word: Option<String>,
    definition: Option<String>,
    part_of_speech: Option<String>,
    pronunciation: Option<String>,
    example_en: Option<String>,
    example_vi: Option<String>,
}

impl RawEntry {
    fn into_vocabulary(self) -> Option<Vocabulary> {
        let word = self.word?.trim().to_string();
        let meaning = self.definition?.trim().to_string();
        let vocab = Vocabulary::new(word, meaning)
            .with_word_type(self.part_of_speech.unwrap_or_default().trim())
            .with_phonetic(self.pronunciation.unwrap_or_default().trim())
            .with_examples(
                self.example_en.unwrap_or_default().trim(),
                self.example_vi.unwrap_or_default().trim(),
            );
        vocab.is_valid().then_some(vocab)
    }
}

/// Parsed entries plus the number of malformed records dropped.
#[derive(Debug, Default)]
pub struct ParsedEntries {
    pub entries: Vec<Vocabulary>,
    pub skipped: usize,
}

/// Parse a JSON array of word records. Malformed records are skipped.
pub fn parse_json(text: &str) -> ImportResult<ParsedEntries> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let items = match value {
        serde_json::Value::Array(items) if !items.is_empty() => items,
        _ => return Err(ImportError::NotAnArray),
    };

    let mut parsed = ParsedEntries::default();
    for item in items {
        match serde_json::from_value::<RawEntry>(item).ok().and_then(RawEntry::into_vocabulary) {
            Some(vocab) => parsed.entries.push(vocab),
            None => parsed.skipped += 1,
        }
    }
    Ok(parsed)
}

/// Parse a copied table: tab, pipe or wide-space separated columns.
pub fn parse_text(text: &str) -> ParsedEntries {
    let mut parsed = ParsedEntries::default();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let lower = line.to_lowercase();
        if HEADER_MARKERS.iter().any(|m| lower.contains(m)) {
            continue;
        }

        match parse_text_line(line) {
            Some(vocab) => parsed.entries.push(vocab),
            None => parsed.skipped += 1,
        }
    }
    parsed
}

fn split_columns(line: &str) -> Option<Vec<String>> {
    let parts: Vec<&str> = if line.contains('\t') {
        line.split('\t').collect()
    } else if line.contains('|') {
        line.split('|').collect()
    } else if MULTI_SPACE.is_match(line) {
        MULTI_SPACE.split(line).collect()
    } else {
        return None;
    };
    Some(
        parts
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect(),
    )
}

fn parse_text_line(line: &str) -> Option<Vocabulary> {
    let parts = split_columns(line)?;
    if parts.len() < 2 {
        return None;
    }

    // Leading "STT" index column
    let columns = if parts[0].starts_with(|c: char| c.is_ascii_digit()) {
        &parts[1..]
    } else {
        &parts[..]
    };

    let mut vocab = Vocabulary::default();
    match columns {
        [word, word_type, phonetic, meaning @ ..] if !meaning.is_empty() => {
            vocab.word = word.clone();
            vocab.word_type = word_type.clone();
            vocab.phonetic = phonetic.clone();
            vocab.meaning = meaning.join(" ");
        }
        [word, middle, meaning] => {
            vocab.word = word.clone();
            if middle.contains('/') {
                vocab.phonetic = middle.clone();
            } else {
                vocab.word_type = middle.clone();
            }
            vocab.meaning = meaning.clone();
        }
        [word, meaning] => {
            vocab.word = word.clone();
            vocab.meaning = meaning.clone();
        }
        _ => return None,
    }

    vocab.word = LEADING_INDEX.replace(&vocab.word, "").trim().to_string();
    let plausible = vocab.word.chars().count() >= 2 && vocab.word.chars().any(|c| c.is_ascii_alphabetic());
    (plausible && vocab.is_valid()).then_some(vocab)
}

/// Add parsed entries to the store as one new batch.
///
/// Words already in the store, or repeated within the entries, are
/// counted as duplicates. No batch is consumed when nothing is valid.
pub fn import_entries(store: &mut CardStore, parsed: ParsedEntries) -> ImportResult<ImportReport> {
    if parsed.entries.is_empty() {
        return Err(ImportError::NoValidEntries);
    }

    let batch = store.next_batch();
    let mut report = ImportReport {
        batch,
        added: 0,
        duplicates: 0,
        skipped: parsed.skipped,
    };
    for vocab in parsed.entries {
        if store.is_word_duplicate(&vocab.word) {
            report.duplicates += 1;
        } else {
            store.add(vocab, batch);
            report.added += 1;
        }
    }

    tracing::info!(
        batch,
        added = report.added,
        duplicates = report.duplicates,
        skipped = report.skipped,
        "imported vocabulary batch"
    );
    Ok(report)
}

/// Import a file: `.json` as a word list, anything else as a text table.
pub fn import_file(store: &mut CardStore, path: &Path) -> ImportResult<ImportReport> {
    let text = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json { parse_json(&text)? } else { parse_text(&text) };
    import_entries(store, parsed)
}

#[derive(Debug, Deserialize)]
struct DirectoryIndex {
    #[serde(default)]
    files: Vec<String>,
}

/// Result of syncing the import directory.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub batches: Vec<ImportReport>,
    /// Files recorded as loaded during this sync.
    pub newly_loaded: Vec<String>,
}

impl SyncReport {
    pub fn added(&self) -> usize {
        self.batches.iter().map(|r| r.added).sum()
    }
}

/// Import files listed in `<dir>/index.json` that were not loaded before.
///
/// `loaded` is updated in place. A missing directory or index is not an error.
pub fn sync_directory(store: &mut CardStore, dir: &Path, loaded: &mut Vec<String>) -> SyncReport {
    let mut report = SyncReport::default();

    let index_path = dir.join("index.json");
    let index: DirectoryIndex = match std::fs::read_to_string(&index_path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(path = %index_path.display(), error = %e, "unreadable import index");
                return report;
            }
        },
        Err(_) => return report,
    };

    let already: HashSet<String> = loaded.iter().cloned().collect();
    let fresh: Vec<&String> = index.files.iter().filter(|f| !already.contains(*f)).collect();
    if fresh.is_empty() {
        tracing::debug!("no new import files");
        return report;
    }

    for file in fresh {
        let path = dir.join(file);
        let outcome = std::fs::read_to_string(&path)
            .map_err(ImportError::from)
            .and_then(|text| parse_json(&text))
            .and_then(|parsed| import_entries(store, parsed));
        match outcome {
            Ok(batch) => {
                report.batches.push(batch);
                loaded.push(file.clone());
                report.newly_loaded.push(file.clone());
            }
            Err(e) => tracing::warn!(file = %file, error = %e, "could not import file"),
        }
    }
    report
}
