use std::num::NonZeroUsize;
use std::time::Duration;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

const DEFAULT_CACHE_LIMIT: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(limit) => limit,
    None => unreachable!(),
};

fn default_cache_limit() -> NonZeroUsize {
    DEFAULT_CACHE_LIMIT
}

/// Configuration of a [`CompileCache`](crate::CompileCache)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct CompileCacheConfig {
    /// Number of compiled documents kept in memory; the least recently used ones are evicted
    /// first. Defaults to 512
    #[serde(default = "default_cache_limit")]
    pub limit: NonZeroUsize,

    /// How long a compiled document stays cached, in human-readable format (e.g. `10m`).
    /// Entries never expire when unset
    #[serde(with = "humantime_serde", default)]
    #[schemars(with = "Option<String>", default)]
    pub ttl: Option<Duration>,
}

impl Default for CompileCacheConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CACHE_LIMIT,
            ttl: None,
        }
    }
}
