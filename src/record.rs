//! The record type produced by extraction and consumed by every sink

/// One discovered listing item
///
/// The identifier is fixed at construction and is the de-duplication key:
/// two records with the same identifier are the same logical item. All other
/// fields are sourced from markup and fall back to empty text or zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    identifier: u64,

    /// Item title
    pub title: String,

    /// Canonical address of the item
    pub location: String,

    /// Short excerpt, possibly empty
    pub summary: String,

    /// Tags in presentation order
    pub labels: Vec<String>,

    /// Timestamp text as sourced; never parsed
    pub observed_at: String,

    pub score: u64,
    pub response_count: u64,
    pub view_count: u64,
}

impl Record {
    /// Creates a record with the given identifier and every other field at its default
    pub fn new(identifier: u64) -> Self {
        Self {
            identifier,
            title: String::new(),
            location: String::new(),
            summary: String::new(),
            labels: Vec::new(),
            observed_at: String::new(),
            score: 0,
            response_count: 0,
            view_count: 0,
        }
    }

    /// Returns the record identifier
    pub fn identifier(&self) -> u64 {
        self.identifier
    }

    /// Sets the title, consuming and returning the record
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Sorts records oldest-first by identifier
pub fn sort_ascending(records: &mut [Record]) {
    records.sort_by_key(Record::identifier);
}
