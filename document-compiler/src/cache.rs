use std::borrow::Borrow;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use apollo_compiler::ast;
use lru::LruCache;
use parking_lot::Mutex;

use crate::compiler::compile;
use crate::config::CompileCacheConfig;
use crate::document_spec::DocumentSpec;
use crate::error::CompileError;
use crate::schema::SchemaDescriptor;
use crate::schema::SchemaId;
use crate::schema::SchemaRef;

type CacheKey = (SchemaId, DocumentSpec);

/// A cache key, owned or borrowed, so that lookups do not need to clone the spec.
trait KeyView {
    fn view(&self) -> (SchemaId, &DocumentSpec);
}

impl KeyView for CacheKey {
    fn view(&self) -> (SchemaId, &DocumentSpec) {
        (self.0, &self.1)
    }
}

impl KeyView for (SchemaId, &DocumentSpec) {
    fn view(&self) -> (SchemaId, &DocumentSpec) {
        (self.0, self.1)
    }
}

impl<'a> Borrow<dyn KeyView + 'a> for CacheKey {
    fn borrow(&self) -> &(dyn KeyView + 'a) {
        self
    }
}

// Must hash like `CacheKey` itself.
impl Hash for dyn KeyView + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.view().hash(state);
    }
}

impl PartialEq for dyn KeyView + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.view() == other.view()
    }
}

impl Eq for dyn KeyView + '_ {}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: Result<Arc<ast::Document>, CompileError>,
    inserted_at: Instant,
}

/// Memoizes [`compile`] by schema identity and spec.
///
/// Successes and failures are both cached: compiling the same spec against the same schema
/// always gives the same outcome. Replacing a schema with a new [`SchemaRef`] stops the old
/// entries from being used, even if the new schema is structurally identical; they then age
/// out of the LRU, or can be dropped at once with [`CompileCache::invalidate_schema`].
///
/// Compilation runs outside of the lock. Concurrent callers missing on the same key may each
/// compile, but they all return the result of whichever compilation was stored first.
pub struct CompileCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Option<Duration>,
}

impl CompileCache {
    pub fn new(config: &CompileCacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.limit)),
            ttl: config.ttl,
        }
    }

    /// Compiles `spec` against `schema`, or returns the outcome of a previous compilation.
    pub fn compile<S: SchemaDescriptor>(
        &self,
        schema: &SchemaRef<S>,
        spec: &DocumentSpec,
    ) -> Result<Arc<ast::Document>, CompileError> {
        if let Some(result) = self.get(&(schema.id(), spec)) {
            tracing::trace!(schema = %schema.id(), outcome = outcome(&result), "compile cache hit");
            return result;
        }
        tracing::debug!(schema = %schema.id(), "compile cache miss");
        let result = compile(schema.schema(), spec).map(Arc::new);
        self.insert((schema.id(), spec.clone()), result)
    }

    /// The number of cached compilations, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Evicts every compilation made against the schema `schema_id`. Returns how many were
    /// evicted.
    pub fn invalidate_schema(&self, schema_id: SchemaId) -> usize {
        let mut entries = self.entries.lock();
        let keys = entries
            .iter()
            .filter(|((id, _), _)| *id == schema_id)
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        for key in &keys {
            entries.pop(key);
        }
        tracing::debug!(schema = %schema_id, evicted = keys.len(), "invalidated schema");
        keys.len()
    }

    fn get(
        &self,
        key: &(SchemaId, &DocumentSpec),
    ) -> Option<Result<Arc<ast::Document>, CompileError>> {
        let key: &dyn KeyView = key;
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if !self.is_expired(entry) => return Some(entry.result.clone()),
            Some(_) => {}
            None => return None,
        }
        entries.pop(key);
        tracing::debug!(schema = %key.view().0, "compile cache entry expired");
        None
    }

    /// Stores `result` unless a live entry was stored for `key` in the meantime, and returns
    /// the stored result.
    fn insert(
        &self,
        key: CacheKey,
        result: Result<Arc<ast::Document>, CompileError>,
    ) -> Result<Arc<ast::Document>, CompileError> {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&key).filter(|entry| !self.is_expired(entry)) {
            tracing::trace!(schema = %key.0, "compile cache entry was stored concurrently");
            return entry.result.clone();
        }
        let schema_id = key.0;
        let replaced = entries.contains(&key);
        tracing::debug!(schema = %schema_id, outcome = outcome(&result), "caching compilation");
        let evicted = entries.push(
            key,
            CacheEntry {
                result: result.clone(),
                inserted_at: Instant::now(),
            },
        );
        if let Some(((evicted_schema, _), _)) = evicted.filter(|_| !replaced) {
            tracing::debug!(schema = %evicted_schema, "evicted least recently used compilation");
        }
        result
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }
}

impl Default for CompileCache {
    fn default() -> Self {
        Self::new(&CompileCacheConfig::default())
    }
}

impl std::fmt::Debug for CompileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileCache")
            .field("len", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn outcome(result: &Result<Arc<ast::Document>, CompileError>) -> &'static str {
    match result {
        Ok(_) => "compiled",
        Err(error) => error.code(),
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use apollo_compiler::Schema;
    use apollo_compiler::name;
    use apollo_compiler::validation::Valid;
    use tracing_test::traced_test;

    use super::*;
    use crate::operation_path::OperationPath;

    fn schema() -> SchemaRef<Valid<Schema>> {
        SchemaRef::new(
            Schema::parse_and_validate(
                "type Query { a: String, b: String, c(id: ID!): String }",
                "schema.graphql",
            )
            .unwrap(),
        )
    }

    fn spec(field: &str) -> DocumentSpec {
        DocumentSpec::builder()
            .add_field_path(OperationPath::fields([apollo_compiler::Name::new(field).unwrap()]))
            .unwrap()
            .build()
    }

    fn cache(limit: usize, ttl: Option<Duration>) -> CompileCache {
        CompileCache::new(&CompileCacheConfig {
            limit: NonZeroUsize::new(limit).unwrap(),
            ttl,
        })
    }

    #[test]
    fn evicts_least_recently_used_entries() {
        let schema = schema();
        let cache = cache(2, None);
        let a = cache.compile(&schema, &spec("a")).unwrap();
        cache.compile(&schema, &spec("b")).unwrap();
        // `a` becomes the most recently used entry
        assert!(Arc::ptr_eq(&a, &cache.compile(&schema, &spec("a")).unwrap()));
        cache.compile(&schema, &spec("c")).unwrap_err();
        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&a, &cache.compile(&schema, &spec("a")).unwrap()));
    }

    #[test]
    fn borrowed_keys_find_owned_entries() {
        use std::hash::BuildHasher;

        let schema = schema();
        let spec = spec("a");
        let owned: CacheKey = (schema.id(), spec.clone());
        let borrowed = (schema.id(), &spec);
        let other_spec = self::spec("b");
        let other = (schema.id(), &other_spec);

        let hasher = std::collections::hash_map::RandomState::new();
        let owned_view: &dyn KeyView = &owned;
        let borrowed_view: &dyn KeyView = &borrowed;
        let other_view: &dyn KeyView = &other;
        assert_eq!(hasher.hash_one(&owned), hasher.hash_one(borrowed_view));
        assert!(owned_view == borrowed_view);
        assert!(owned_view != other_view);

        let cache = CompileCache::default();
        let compiled = cache.compile(&schema, &spec).unwrap();
        let found = cache.get(&borrowed).unwrap().unwrap();
        assert!(Arc::ptr_eq(&compiled, &found));
        assert!(cache.get(&other).is_none());
    }

    #[test]
    fn expired_entries_are_compiled_again() {
        let schema = schema();
        let cache = cache(8, Some(Duration::ZERO));
        let first = cache.compile(&schema, &spec("a")).unwrap();
        let second = cache.compile(&schema, &spec("a")).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidates_one_schema() {
        let first = schema();
        let second = schema();
        let cache = CompileCache::default();
        cache.compile(&first, &spec("a")).unwrap();
        cache.compile(&first, &spec("b")).unwrap();
        cache.compile(&second, &spec("a")).unwrap();
        assert_eq!(cache.invalidate_schema(first.id()), 2);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_compilations_converge() {
        let schema = schema();
        let cache = CompileCache::default();
        let spec = spec("a");
        let documents = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(|| cache.compile(&schema, &spec).unwrap()))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });
        let stored = cache.compile(&schema, &spec).unwrap();
        assert!(documents
            .iter()
            .all(|document| Arc::ptr_eq(document, &stored)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    #[traced_test]
    fn logs_cache_outcomes() {
        let schema = schema();
        let cache = CompileCache::default();
        let failing = DocumentSpec::builder()
            .add_field_path(OperationPath::fields([name!("c")]))
            .unwrap()
            .build();
        cache.compile(&schema, &failing).unwrap_err();
        cache.compile(&schema, &failing).unwrap_err();

        assert!(logs_contain("compile cache miss"));
        assert!(logs_contain("outcome=\"ARGUMENT_BINDING\""));
        assert!(logs_contain("compile cache hit"));
        assert!(logs_contain("failed to compile document"));
    }
}
