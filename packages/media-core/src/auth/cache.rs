use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::auth::keyset::KeySet;
use crate::auth::source::KeySetSource;
use crate::errors::FetchError;

/// TTL 付きで鍵セットをキャッシュする取得元
///
/// 鍵セットは 1 つだけなので、キーが `()` の moka キャッシュに載せる。
/// - TTL 経過後の最初の呼び出しで取り直す
/// - 同時に発生したミスは `try_get_with` でまとめられ、取得は 1 回だけ走る
/// - 取得失敗はキャッシュしない
/// - `invalidate` で即座に破棄できる（未知の kid を見つけたときに使う）
pub struct CachedKeySource<S> {
    inner: S,
    cache: Cache<(), KeySet>,
}

impl<S: KeySetSource> CachedKeySource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
        }
    }
}

#[async_trait]
impl<S: KeySetSource> KeySetSource for CachedKeySource<S> {
    async fn fetch(&self) -> Result<KeySet, FetchError> {
        self.cache
            .try_get_with((), self.inner.fetch())
            .await
            .map_err(|e: Arc<FetchError>| Arc::unwrap_or_clone(e))
    }

    async fn invalidate(&self) -> bool {
        let cached = self.cache.contains_key(&());
        self.cache.invalidate(&()).await;
        if cached {
            tracing::debug!("key set cache invalidated");
        }
        cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{JWKS_JSON, JWKS_ROTATED_JSON, ROTATED_KID};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 呼び出し回数を数え、呼ばれるたびに用意した JWKS を順に返す（空文字は取得失敗）
    struct CountingSource {
        calls: AtomicUsize,
        documents: Vec<&'static str>,
    }

    impl CountingSource {
        fn new(documents: Vec<&'static str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                documents,
            }
        }
    }

    #[async_trait]
    impl KeySetSource for CountingSource {
        async fn fetch(&self) -> Result<KeySet, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let doc = self.documents[n.min(self.documents.len() - 1)];
            if doc.is_empty() {
                return Err(FetchError::Timeout);
            }
            KeySet::from_jwks_json(doc.as_bytes())
        }
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let cache = CachedKeySource::new(CountingSource::new(vec![JWKS_JSON]), Duration::from_secs(60));

        cache.fetch().await.unwrap();
        cache.fetch().await.unwrap();

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_expires() {
        let cache = CachedKeySource::new(
            CountingSource::new(vec![JWKS_JSON]),
            Duration::from_millis(50),
        );

        cache.fetch().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.fetch().await.unwrap();

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_picks_up_rotated_key() {
        let cache = CachedKeySource::new(
            CountingSource::new(vec![JWKS_JSON, JWKS_ROTATED_JSON]),
            Duration::from_secs(60),
        );

        assert!(!cache.fetch().await.unwrap().contains(ROTATED_KID));
        assert!(cache.invalidate().await);
        assert!(cache.fetch().await.unwrap().contains(ROTATED_KID));

        assert!(cache.invalidate().await);
        // 空のキャッシュを破棄しても false
        assert!(!cache.invalidate().await);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = CachedKeySource::new(
            CountingSource::new(vec!["", JWKS_JSON]),
            Duration::from_secs(60),
        );

        assert!(cache.fetch().await.is_err());
        assert!(cache.fetch().await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let cache = Arc::new(CachedKeySource::new(
            CountingSource::new(vec![JWKS_JSON]),
            Duration::from_secs(60),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.fetch().await.map(|set| set.len()) })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        }
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
    }
}
