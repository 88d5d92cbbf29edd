//! Resort repository seam.
//!
//! HTTP-facing code depends only on `ResortRepository`; the file-backed
//! implementation lives in `crate::file::resort_store`.

pub mod repository;

pub use repository::{DeleteOutcome, ResortRepository};
