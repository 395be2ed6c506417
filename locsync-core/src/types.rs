//! Domain types for localization records.
//!
//! A [`Record`] is identified by its [`RecordId`]; two records are *equal*
//! only when every [`Field`] matches.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::RecordError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable key of a record, shared by the spreadsheet, cache and remote store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One localization entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub record_id: RecordId,
    pub character: String,
    pub russian: String,
    pub english: String,
    pub character_limit: String,
    pub version: String,
    pub narrative_comment: String,
}

impl Record {
    /// Build a record from positional cells in [`Field::ALL`] order.
    ///
    /// Missing trailing cells become empty strings; cells past the seventh
    /// are ignored. An empty (or whitespace-only) id is rejected.
    pub fn from_cells<I, S>(cells: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = cells.into_iter().map(Into::into);
        let mut next = || cells.next().unwrap_or_default();

        let record_id = next();
        if record_id.trim().is_empty() {
            return Err(RecordError::EmptyId);
        }

        Ok(Self {
            record_id: RecordId(record_id),
            character: next(),
            russian: next(),
            english: next(),
            character_limit: next(),
            version: next(),
            narrative_comment: next(),
        })
    }

    /// Overwrite a single field. Used when applying a [`FieldDiff`].
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::RecordId => self.record_id = RecordId(value),
            Field::Character => self.character = value,
            Field::Russian => self.russian = value,
            Field::English => self.english = value,
            Field::CharacterLimit => self.character_limit = value,
            Field::Version => self.version = value,
            Field::NarrativeComment => self.narrative_comment = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// Named fields of a [`Record`], ordered as they appear in the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    RecordId,
    Character,
    Russian,
    English,
    CharacterLimit,
    Version,
    NarrativeComment,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::RecordId,
        Field::Character,
        Field::Russian,
        Field::English,
        Field::CharacterLimit,
        Field::Version,
        Field::NarrativeComment,
    ];

    /// Snake-case name; doubles as the cache column name.
    pub fn name(self) -> &'static str {
        match self {
            Field::RecordId => "record_id",
            Field::Character => "character",
            Field::Russian => "russian",
            Field::English => "english",
            Field::CharacterLimit => "character_limit",
            Field::Version => "version",
            Field::NarrativeComment => "narrative_comment",
        }
    }

    pub fn get(self, record: &Record) -> &str {
        match self {
            Field::RecordId => record.record_id.as_str(),
            Field::Character => &record.character,
            Field::Russian => &record.russian,
            Field::English => &record.english,
            Field::CharacterLimit => &record.character_limit,
            Field::Version => &record.version,
            Field::NarrativeComment => &record.narrative_comment,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Changed fields mapped to their new value. Iterates in [`Field::ALL`] order.
pub type FieldDiff = BTreeMap<Field, String>;

// ---------------------------------------------------------------------------
// Logical tables
// ---------------------------------------------------------------------------

/// An independent namespace of records with its own spreadsheet tab,
/// cache table and remote view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalTable {
    StaticTexts,
    GameText,
}

impl LogicalTable {
    /// Processing order.
    pub const ALL: [LogicalTable; 2] = [LogicalTable::StaticTexts, LogicalTable::GameText];

    pub fn display_name(self) -> &'static str {
        match self {
            LogicalTable::StaticTexts => "Static Texts",
            LogicalTable::GameText => "Game Text",
        }
    }

    pub fn cache_table(self) -> &'static str {
        match self {
            LogicalTable::StaticTexts => "static_texts",
            LogicalTable::GameText => "game_text",
        }
    }
}

impl fmt::Display for LogicalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
