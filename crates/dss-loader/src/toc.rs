//! IOD entry extraction from the table-of-contents document.
//!
//! The extraction is coupled to the exact phrasing of the published
//! list-of-tables section ("<number>. <title> IOD Modules"), which is why
//! it lives here as one isolated, independently testable function.

use std::sync::LazyLock;

use regex::Regex;

use dss_model::IodEntry;

use crate::source::TocAnchor;

/// Marker identifying IOD module tables among all list-of-tables anchors.
const IOD_MODULES_MARKER: &str = "IOD Modules";

/// Suffix stripped from the extracted title.
const IOD_MODULES_SUFFIX: &str = " IOD Modules";

/// Fallback table id recorded when an anchor href carries no fragment.
const TABLE_ID_NOT_FOUND: &str = "table_id_not_found";

/// Table-number prefix: optional leading letter, dot-separated integer
/// groups, a dash, an integer, a period, then the title.
static TITLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]?\.\d+(?:\.\d+)*-\d+\.\s*(.+)$").expect("valid title prefix pattern")
});

/// Extract the IOD entry list from the list-of-tables anchors.
///
/// `toc_url` is the URL the document was fetched from; anchor hrefs are
/// resolved against its directory.
#[must_use]
pub fn extract_iod_entries(anchors: &[TocAnchor], toc_url: &str) -> Vec<IodEntry> {
    let base = base_url(toc_url);
    anchors
        .iter()
        .filter(|anchor| anchor.text.contains(IOD_MODULES_MARKER))
        .map(|anchor| {
            let table_id = match anchor.href.rsplit_once('#') {
                Some((_, fragment)) if !fragment.is_empty() => fragment.to_string(),
                _ => {
                    tracing::warn!(href = %anchor.href, "table id not found in href");
                    TABLE_ID_NOT_FOUND.to_string()
                }
            };
            let table_url = join_url(base, &anchor.href);
            IodEntry::new(extract_title(&anchor.text), table_id, table_url)
        })
        .collect()
}

/// Strip the table-number prefix and the " IOD Modules" suffix.
fn extract_title(text: &str) -> &str {
    let title = TITLE_PREFIX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str());
    title.strip_suffix(IOD_MODULES_SUFFIX).unwrap_or(title)
}

/// Directory part of the TOC URL, trailing slash included.
fn base_url(toc_url: &str) -> &str {
    match toc_url.rfind('/') {
        Some(index) => &toc_url[..=index],
        None => "",
    }
}

/// Resolve an anchor href against the TOC base URL.
fn join_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{base}{href}")
    }
}
