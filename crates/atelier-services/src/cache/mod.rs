pub mod mutations;
pub mod query_cache;

pub use mutations::{run_optimistic, OptimisticUpdate};
pub use query_cache::{QueryCache, QueryKey, QueryKind, Snapshot, DEFAULT_STALE_TIME};
