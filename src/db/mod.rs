pub mod catalog;
pub mod redis;

pub use catalog::{create_pool, load_catalog};
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use redis::CacheWriterHandle;
