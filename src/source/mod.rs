//! Chip Source Layer
//!
//! Where chip collections come from, and the snapshot-then-resolve helper.

mod traits;
mod memory;


pub use traits::{resolve_from_source, ChipSource};
pub use memory::InMemoryChipSource;
