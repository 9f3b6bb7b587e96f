//! External specification-source collaborator.
//!
//! The DICOM HTML parsing library is consumed exclusively through
//! [`SpecSource`]. The gateway depends only on these signatures and on the
//! structural views returned here; implementations own fetching, caching of
//! the raw documents they read, and all table parsing.

use dss_model::{IodKind, SpecTree};

use crate::error::Result;
use crate::progress::ProgressSink;

/// One anchor entry of the table-of-contents list-of-tables section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocAnchor {
    /// Link target, typically `"<file>#<table_id>"`.
    pub href: String,
    /// Link text, e.g. `"A.2-1. CR Image IOD Modules"`.
    pub text: String,
}

impl TocAnchor {
    /// Convenience constructor used heavily in tests.
    #[must_use]
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Structural view of the parsed table-of-contents document.
#[derive(Debug, Clone)]
pub struct TocDocument {
    /// Standard version banner, e.g. `"2024e"`.
    pub version: String,
    /// Anchors of the list-of-tables section in document order, or `None`
    /// when the section is structurally absent.
    pub list_of_tables: Option<Vec<TocAnchor>>,
}

/// Column-to-attribute mapping handed to the external table parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    /// `(column index, attribute name)` pairs.
    pub columns: &'static [(usize, &'static str)],
    /// Attribute used as the node display name.
    pub name_attr: &'static str,
    /// Column indices the parser should skip entirely.
    pub skip_columns: &'static [usize],
}

const COMPOSITE_IOD_MAPPING: ColumnMapping = ColumnMapping {
    columns: &[(0, "ie"), (1, "module"), (2, "ref"), (3, "usage")],
    name_attr: "module",
    skip_columns: &[],
};

const NORMALIZED_IOD_MAPPING: ColumnMapping = ColumnMapping {
    columns: &[(0, "module"), (1, "ref"), (2, "description")],
    name_attr: "module",
    skip_columns: &[],
};

const COMPOSITE_MODULE_MAPPING: ColumnMapping = ColumnMapping {
    columns: &[
        (0, "elem_name"),
        (1, "elem_tag"),
        (2, "elem_type"),
        (3, "elem_description"),
    ],
    name_attr: "elem_name",
    skip_columns: &[],
};

const NORMALIZED_MODULE_MAPPING: ColumnMapping = ColumnMapping {
    columns: &[
        (0, "elem_name"),
        (1, "elem_tag"),
        (2, "elem_type"),
        (3, "elem_description"),
    ],
    name_attr: "elem_name",
    skip_columns: &[2],
};

/// IOD-table column mapping for the given kind.
///
/// Static lookup: Composite IODs expose an IE/Module/Reference/Usage shape,
/// everything else the Module/Reference/Description shape.
#[must_use]
pub fn iod_column_mapping(kind: IodKind) -> &'static ColumnMapping {
    match kind {
        IodKind::Composite => &COMPOSITE_IOD_MAPPING,
        IodKind::Normalized | IodKind::Other => &NORMALIZED_IOD_MAPPING,
    }
}

/// Module-table column mapping for the given kind.
///
/// Normalized module tables carry no type column, so it is skipped there.
#[must_use]
pub fn module_column_mapping(kind: IodKind) -> &'static ColumnMapping {
    match kind {
        IodKind::Composite => &COMPOSITE_MODULE_MAPPING,
        IodKind::Normalized | IodKind::Other => &NORMALIZED_MODULE_MAPPING,
    }
}

/// Everything the external builder needs to produce one IOD's tree.
#[derive(Debug, Clone)]
pub struct SpecTreeRequest<'a> {
    /// Source document URL.
    pub url: &'a str,
    /// Cache file name of the raw source document.
    pub cache_file_name: &'a str,
    /// File name of the derived model artifact, keyed by table id.
    pub model_file_name: String,
    /// Table identifier of the IOD.
    pub table_id: &'a str,
    /// Mapping for the IOD-level table.
    pub iod_mapping: &'static ColumnMapping,
    /// Mapping for the referenced module tables.
    pub module_mapping: &'static ColumnMapping,
}

/// The external parsing library, as seen by the gateway.
///
/// Implementations are called from worker threads and may block freely.
pub trait SpecSource: Send + Sync {
    /// Fetch and parse the table-of-contents document.
    ///
    /// `cache_file_name` names the raw-document cache entry to read or
    /// write; `force_download` bypasses it.
    fn fetch_table_of_contents(
        &self,
        url: &str,
        cache_file_name: &str,
        force_download: bool,
        progress: &dyn ProgressSink,
    ) -> Result<TocDocument>;

    /// Fetch, parse and build the specification tree of a single IOD.
    fn build_spec_tree(
        &self,
        request: &SpecTreeRequest<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<SpecTree>;
}
