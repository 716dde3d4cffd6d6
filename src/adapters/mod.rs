// Adapters layer: concrete record sources.

pub mod jsonl;
pub mod memory;

pub use jsonl::{JsonLinesSource, UserRow};
pub use memory::InMemorySource;
