use std::fs;
use std::path::Path;

use crate::error::{InputError, StorageError};
use crate::storage::{KeyValueStore, PRACTICE_TEXT_KEY};

pub const DEFAULT_PRACTICE_TEXT: &str =
    "The quick brown fox jumps over the lazy dog. Simple words help build rhythm and get fingers moving.";

/// Stand-in text for PDF uploads until real extraction exists
pub const PDF_PLACEHOLDER_TEXT: &str =
    "PDF content extraction would go here. For now, this is placeholder text for the PDF you uploaded.";

/// Kinds of files accepted as practice material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    PlainText,
    Pdf,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(SourceKind::PlainText),
            "pdf" => Ok(SourceKind::Pdf),
            other => Err(InputError::UnsupportedFileType(other.to_string())),
        }
    }
}

pub fn extract_text_from_file(path: &Path) -> Result<String, InputError> {
    match SourceKind::from_path(path)? {
        SourceKind::PlainText => fs::read_to_string(path).map_err(|source| InputError::Unreadable {
            path: path.display().to_string(),
            source,
        }),
        SourceKind::Pdf => Ok(PDF_PLACEHOLDER_TEXT.to_string()),
    }
}

/// Pick the text for a new session. Custom text wins over a file; blank
/// results are rejected.
pub fn choose_practice_text(
    custom: Option<&str>,
    file: Option<&Path>,
) -> Result<String, InputError> {
    let custom = custom.filter(|text| !text.is_empty());

    let text = match (custom, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => extract_text_from_file(path)?,
        (None, None) => String::new(),
    };

    if text.trim().is_empty() {
        return Err(InputError::EmptyText);
    }
    Ok(text)
}

pub fn save_pending<S: KeyValueStore>(store: &S, text: &str) -> Result<(), StorageError> {
    store.set(PRACTICE_TEXT_KEY, text)
}

/// Text queued for the next session, or the default sentence
pub fn load_pending<S: KeyValueStore>(store: &S) -> String {
    match store.get(PRACTICE_TEXT_KEY) {
        Ok(Some(text)) if !text.is_empty() => text,
        Ok(_) => DEFAULT_PRACTICE_TEXT.to_string(),
        Err(e) => {
            tracing::warn!("failed to read practice text, using default: {}", e);
            DEFAULT_PRACTICE_TEXT.to_string()
        }
    }
}
