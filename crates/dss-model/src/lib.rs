//! Domain model for DICOM Spec Studio.
//!
//! This crate holds the in-memory representation of the browsable DICOM
//! standard content:
//!
//! - [`IodEntry`] / [`IodKind`] - one row of the flat IOD list extracted
//!   from the standard's table of contents.
//! - [`SpecTree`] - the module/attribute hierarchy of a single IOD,
//!   stored as an arena with handle-based parent/children links.
//!
//! Everything here is plain data: loading, caching and view construction
//! live in the sibling crates.

mod entry;
mod tree;

pub use entry::{IodEntry, IodKind};
pub use tree::{NodeId, NodeKind, SpecNode, SpecTree, TreeError};
