pub mod catalog;
pub mod favorites;
pub mod redis;

pub use self::catalog::Catalog;
pub use self::favorites::FavoritesStore;
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
