//! IOD list entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an IOD, derived from its table identifier.
///
/// Composite IODs live in Annex A of PS3.3 (`table_A.*`), Normalized IODs
/// in Annex B (`table_B.*`). Anything else is grouped under `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IodKind {
    /// Composite IOD (Information Entity / Module / Reference / Usage table shape).
    Composite,
    /// Normalized IOD (Module / Reference / Description table shape).
    Normalized,
    /// Neither annex A nor annex B.
    Other,
}

impl IodKind {
    /// Derive the kind from a table identifier such as `"table_A.49-1"`.
    #[must_use]
    pub fn from_table_id(table_id: &str) -> Self {
        if table_id.contains("_A.") {
            Self::Composite
        } else if table_id.contains("_B.") {
            Self::Normalized
        } else {
            Self::Other
        }
    }

    /// Display label for the Kind column.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Composite => "Composite",
            Self::Normalized => "Normalized",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for IodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the IOD list.
///
/// Immutable value extracted from the table-of-contents document. Identity
/// is `table_id`; the list itself is rebuilt wholesale on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IodEntry {
    /// Display title, e.g. `"CR Image"`.
    pub name: String,
    /// Stable unique key, e.g. `"table_A.2-1"`.
    pub table_id: String,
    /// Deep link to the specification table in the source document.
    pub table_url: String,
    /// Kind derived from the table identifier.
    pub kind: IodKind,
}

impl IodEntry {
    /// Create a new entry, deriving the kind from `table_id`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        table_id: impl Into<String>,
        table_url: impl Into<String>,
    ) -> Self {
        let table_id = table_id.into();
        let kind = IodKind::from_table_id(&table_id);
        Self {
            name: name.into(),
            table_id,
            table_url: table_url.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_table_id() {
        assert_eq!(IodKind::from_table_id("table_A.49-1"), IodKind::Composite);
        assert_eq!(IodKind::from_table_id("table_B.26.2-1"), IodKind::Normalized);
        assert_eq!(IodKind::from_table_id("table_C.7-1"), IodKind::Other);
        assert_eq!(IodKind::from_table_id(""), IodKind::Other);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(IodKind::Composite.label(), "Composite");
        assert_eq!(IodKind::Normalized.label(), "Normalized");
        assert_eq!(IodKind::Other.to_string(), "Other");
    }

    #[test]
    fn test_entry_new_derives_kind() {
        let entry = IodEntry::new("CR Image", "table_A.2-1", "part03.html#table_A.2-1");
        assert_eq!(entry.kind, IodKind::Composite);
        assert_eq!(entry.name, "CR Image");
    }

    #[test]
    fn test_entry_serde_round_trip() {
        let entry = IodEntry::new("CR Image", "table_A.2-1", "part03.html#table_A.2-1");
        let json = serde_json::to_string(&entry).unwrap();
        let back: IodEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
