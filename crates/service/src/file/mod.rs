//! File-backed implementations of the service repositories.

pub mod resort_store;
