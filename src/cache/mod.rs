pub mod response_cache;
pub mod store;

mod macros;

pub use response_cache::{CacheKey, ResponseCache};
pub use store::{CacheEntry, CacheError, CacheMap, CacheStore, FileStore, MemoryStore};
