mod access_token_cache;
mod config;

pub use access_token_cache::AccessTokenCache;
pub use config::{default_max_size, AccessTokenCacheConfig};
