//! Table and table-of-contents aggregation.
//!
//! TOC fragments are YAML mappings of entry id to entry fields. A
//! [`TocBuilder`] ingests one fragment (the custom variant) or follows a
//! driver fragment that pulls entries out of other fragments (the aggregated
//! variant), resolves entries that borrow their fields from shared
//! definitions, and projects the result into contents, definition-list and
//! table views. [`TocBuilder::finalize`] validates everything and returns a
//! read-only [`Toc`] ready for rendering.

pub mod builder;
pub mod entry;
pub mod error;
pub mod kind;
pub mod reference;
pub mod table;

pub use builder::{driver_sources, DfnItem, Toc, TocBuilder};
pub use entry::{EntryBody, EntryFields, RawEntry, TocEntry, DEFAULT_ORDER};
pub use error::TocError;
pub use kind::{TocFormat, TocKind, TocVariant};
pub use reference::ReferenceSet;
pub use table::{Table, TableFragment};
