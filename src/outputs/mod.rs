//! Output generation for finished runs.
//!
//! - [`json`]: Writes the `{ "data": [...] }` feed to stdout or a file

pub mod json;
