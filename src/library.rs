//! Audio file discovery and metadata extraction.
//!
//! `index` walks a directory tree, keeps files whose extension is in the
//! configured allow-list and extracts description and duration for each one
//! on a bounded worker pool.

mod chunk;
mod display;
mod metadata;
mod model;
mod scan;

pub use chunk::{ChunkError, extract_description, parse_description};
pub use display::{format_duration, matches_query, sort_by_file_name};
pub use metadata::{MetadataError, extract, try_extract};
pub use model::{AudioEntry, Metadata};
pub use scan::{IndexError, IndexReport, index};

#[cfg(test)]
pub(crate) mod fixtures;
