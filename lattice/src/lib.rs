pub mod grid;
pub mod tables;

pub use tables::{LookupTables, NeighborView};
