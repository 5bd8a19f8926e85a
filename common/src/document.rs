use std::fmt;

use chrono::NaiveDate;

use crate::error::DocumentError;

/// Caller-assigned identifier of a document. Stable for the page session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        DocumentId(id)
    }
}

/// A dated revision marker. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    number: u32,
    date: NaiveDate,
}

impl Version {
    pub fn new(number: u32, date: NaiveDate) -> Self {
        Self { number, date }
    }

    /// Builds a version from a `YYYY-MM-DD` date string.
    pub fn parse(number: u32, date: &str) -> Result<Self, DocumentError> {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|source| DocumentError::InvalidDate {
                input: date.to_string(),
                source,
            })?;
        Ok(Self::new(number, parsed))
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A titled record with an append-only version history.
///
/// Identity is the `id` alone; see [`Document::same_entity`].
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    title: String,
    versions: Vec<Version>,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            versions: Vec::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.last()
    }

    /// Appends `version` to the history. Ordering is the caller's concern.
    pub fn add_version(&mut self, version: Version) {
        self.versions.push(version);
    }

    /// Two documents are the same logical entity iff their ids match.
    pub fn same_entity(&self, other: &Document) -> bool {
        self.id == other.id
    }
}
