pub mod payload;
pub mod query_cache;
