//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores. The resort data lives in a
//! header-addressed CSV file; see `csv_table`.

pub mod csv_table;
