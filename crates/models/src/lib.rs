pub mod errors;
pub mod resort;

pub use resort::{fold_name, Resort, ResortCandidate, ResortRow, NAME_COLUMN, RESORT_COLUMNS};
