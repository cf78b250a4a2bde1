//! Lookup structures over the resources of one scan
//!
//! The [`ResourceIndex`] is built once from the extracted resources and is then
//! read-only. Rules select their candidates from it with a type pattern, and the
//! `resources()` / `resources_in_file()` rule functions query it directly.
//!
//! [`matches_path`] implements the path-glob semantics shared by exceptions and
//! the `exclude_paths` setting.

mod path_match;
mod resource_index;

pub use path_match::matches_path;
pub use resource_index::ResourceIndex;
