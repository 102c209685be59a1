//! YAML fragment ingestion for folio.
//!
//! Every generator in the pipeline reads structured data files. This crate
//! loads single- and multi-document YAML into typed records and walks source
//! trees to find the files a task cares about.

pub mod files;
pub mod ingest;

pub use files::{expand_tree, file_stem, has_prefix};
pub use ingest::{ingest_yaml, ingest_yaml_list, ingest_yaml_str, YamlError};
