//! Result caching around a single query

use crate::cache::{CachePolicy, ExpiringCache, Fingerprint};
use crate::error::{Result, TableError};
use crate::query::TableQuery;
use crate::store::{TableEntity, TableFilter, TableStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache type shared by [`QueryCache`] instances
pub type ResultCache = ExpiringCache<Vec<TableEntity>>;

/// Memoizes one query's result under its fingerprint
///
/// On a hit the store is not called at all. On a miss the wrapped query runs,
/// its result is stored under the configured policy, then returned. A failed
/// query leaves the cache untouched and its error is returned unchanged.
///
/// `QueryCache` is itself a [`TableQuery`], so it can be passed anywhere a
/// query is expected.
pub struct QueryCache<Q> {
    query: Q,
    fingerprint: Fingerprint,
    cache: Arc<ResultCache>,
    policy: CachePolicy,
}

impl<Q> QueryCache<Q>
where
    Q: TableQuery,
{
    /// Wrap `query` with a never-expiring policy on `cache`
    pub fn new(query: Q, cache: Arc<ResultCache>) -> Result<Self> {
        Self::builder().query(query).cache(cache).build()
    }

    /// Create a builder for full control over fingerprint and policy
    pub fn builder() -> QueryCacheBuilder<Q> {
        QueryCacheBuilder::default()
    }

    /// The wrapped query
    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// The cache results are written to
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }
}

#[async_trait]
impl<Q> TableQuery for QueryCache<Q>
where
    Q: TableQuery,
{
    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn filter(&self) -> &TableFilter {
        self.query.filter()
    }

    async fn execute(&self, store: &dyn TableStore) -> Result<Vec<TableEntity>> {
        if let Some(cached) = self.cache.try_get(&self.fingerprint).await {
            debug!(
                "Serving {} entities from cache for {}",
                cached.len(),
                self.fingerprint
            );
            return Ok(cached);
        }

        debug!("Executing query on cache miss: {}", self.fingerprint);
        let result = match self.query.execute(store).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Query {} failed, nothing cached: {}", self.fingerprint, e);
                return Err(e);
            }
        };

        self.cache
            .set(self.fingerprint.clone(), result.clone(), &self.policy)
            .await?;

        Ok(result)
    }
}

/// Builder for [`QueryCache`]
pub struct QueryCacheBuilder<Q> {
    query: Option<Q>,
    fingerprint: Option<Fingerprint>,
    cache: Option<Arc<ResultCache>>,
    policy: Option<CachePolicy>,
}

impl<Q> Default for QueryCacheBuilder<Q> {
    fn default() -> Self {
        Self {
            query: None,
            fingerprint: None,
            cache: None,
            policy: None,
        }
    }
}

impl<Q> QueryCacheBuilder<Q>
where
    Q: TableQuery,
{
    /// Set the query to wrap (required)
    pub fn query(mut self, query: Q) -> Self {
        self.query = Some(query);
        self
    }

    /// Override the fingerprint derived from the query
    pub fn fingerprint(mut self, fingerprint: impl Into<Fingerprint>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Set the cache; a private cache is created when omitted
    pub fn cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the policy; results never expire when omitted
    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Build the query cache
    pub fn build(self) -> Result<QueryCache<Q>> {
        let query = match (self.query, &self.fingerprint) {
            (Some(query), _) => query,
            (None, None) => {
                return Err(TableError::InvalidArgument(
                    "query cache needs a query or a fingerprint; neither was given".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(TableError::InvalidArgument(
                    "query cache needs a query to run on a cache miss".to_string(),
                ))
            }
        };

        let fingerprint = self
            .fingerprint
            .unwrap_or_else(|| query.fingerprint().to_string());
        if fingerprint.trim().is_empty() {
            return Err(TableError::InvalidArgument(
                "fingerprint must not be empty".to_string(),
            ));
        }

        let policy = self.policy.unwrap_or_default();
        policy.validate()?;

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(ExpiringCache::with_defaults()));

        Ok(QueryCache {
            query,
            fingerprint,
            cache,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::EqualPartitionTopN;
    use crate::store::MemoryTableStore;
    use std::time::Duration;

    fn top_n() -> EqualPartitionTopN {
        EqualPartitionTopN::new("APP_201503", 10).unwrap()
    }

    #[test]
    fn test_builder_requires_query() {
        let err = QueryCache::<EqualPartitionTopN>::builder().build().err().unwrap();
        assert!(err.is_invalid_argument());

        let err = QueryCache::<EqualPartitionTopN>::builder()
            .fingerprint("explicit")
            .build()
            .err()
            .unwrap();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_builder_fingerprint_resolution() {
        let derived = QueryCache::builder().query(top_n()).build().unwrap();
        assert_eq!(derived.fingerprint(), top_n().fingerprint());

        let explicit = QueryCache::builder()
            .query(top_n())
            .fingerprint("dashboard:errors")
            .build()
            .unwrap();
        assert_eq!(explicit.fingerprint(), "dashboard:errors");

        let err = QueryCache::builder()
            .query(top_n())
            .fingerprint(" ")
            .build()
            .err()
            .unwrap();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_builder_defaults_and_policy_validation() {
        let cached = QueryCache::builder().query(top_n()).build().unwrap();
        assert!(cached.policy().is_eternal());

        let err = QueryCache::builder()
            .query(top_n())
            .policy(CachePolicy::sliding(Duration::ZERO))
            .build()
            .err()
            .unwrap();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_filter_delegates_to_query() {
        let cached = QueryCache::new(top_n(), Arc::new(ExpiringCache::with_defaults())).unwrap();
        assert_eq!(cached.filter(), top_n().filter());
        assert_eq!(cached.query().take(), 10);
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let store = MemoryTableStore::new();
        store
            .upsert(TableEntity::new("APP_201503", "1"))
            .await
            .unwrap();

        let cache = Arc::new(ExpiringCache::with_defaults());
        let cached = QueryCache::new(top_n(), cache.clone()).unwrap();

        let first = cached.execute(&store).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(cache.contains_key(cached.fingerprint()).await);

        // A write after caching is not visible until the entry goes away.
        store
            .upsert(TableEntity::new("APP_201503", "2"))
            .await
            .unwrap();
        let second = cached.execute(&store).await.unwrap();
        assert_eq!(second.len(), 1);

        cache.remove(cached.fingerprint()).await;
        let third = cached.execute(&store).await.unwrap();
        assert_eq!(third.len(), 2);
    }
}
