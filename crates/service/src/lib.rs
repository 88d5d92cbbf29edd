//! Service layer for the ski resort backend.
//! - `storage`: reusable flat-file table on top of `tokio::fs` and `csv`.
//! - `resorts` / `file`: the resort repository seam and its file-backed store.
//! - `weather`: forecast proxy to the external weather API.

pub mod errors;
pub mod storage;
pub mod resorts;
pub mod file;
pub mod weather;
#[cfg(test)]
pub mod test_support;
