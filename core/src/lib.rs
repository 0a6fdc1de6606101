//! In-memory inverted index with positional postings, a worker pool, and the
//! builders and query parsers that drive them sequentially or concurrently.

pub mod builder;
pub mod error;
pub mod index;
pub mod json;
pub mod query;
pub mod scheduler;
pub mod search;
pub mod shared;
pub mod tokenizer;

pub use error::IndexError;
pub use index::{InvertedIndex, Position};
pub use query::{ConcurrentQueryParser, QueryEngine, QueryParser, QueryResults};
pub use scheduler::{Spawner, WorkQueue};
pub use search::{SearchResult, Searchable};
pub use shared::SharedIndex;
