//! # Permission Flows
//!
//! The permission cache behind the guard container, with a slow identity
//! provider.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use av_01_permission_cache::{AccessLevel, ResourceGrant};
    use av_02_name_filters::InMemoryFilterStore;
    use av_runtime::{GuardContainer, RuntimeConfig};

    use crate::integration::fixtures::{AssetTable, FakeIdentityProvider, TokioClock};

    fn guards_with(
        provider: Arc<FakeIdentityProvider>,
        config: RuntimeConfig,
    ) -> Arc<GuardContainer<AssetTable, InMemoryFilterStore>> {
        Arc::new(
            GuardContainer::new(
                config,
                provider,
                Arc::new(AssetTable::new()),
                Arc::new(InMemoryFilterStore::new()),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_burst_of_requests_hits_provider_once() {
        let provider = Arc::new(FakeIdentityProvider::new(Duration::from_millis(50)));
        provider.grant("alice", ResourceGrant::new("org/docs", AccessLevel::Write));
        let guards = guards_with(provider.clone(), RuntimeConfig::default());

        let requests: Vec<_> = (0..16)
            .map(|_| {
                let guards = Arc::clone(&guards);
                tokio::spawn(async move {
                    guards
                        .authorize("alice", "org/docs", AccessLevel::Read)
                        .await
                })
            })
            .collect();

        for request in requests {
            assert!(request.await.unwrap());
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_principal_is_denied_and_cached() {
        let provider = Arc::new(FakeIdentityProvider::new(Duration::ZERO));
        let guards = guards_with(provider.clone(), RuntimeConfig::default());

        assert!(!guards.authorize("mallory", "org/docs", AccessLevel::Read).await);
        assert!(!guards.authorize("mallory", "org/docs", AccessLevel::Read).await);
        assert_eq!(provider.calls(), 1);
        assert_eq!(
            guards.permission_cache().metrics().snapshot().fetch_failures,
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out_to_empty() {
        let provider = Arc::new(FakeIdentityProvider::new(Duration::from_secs(120)));
        provider.grant("alice", ResourceGrant::new("org/docs", AccessLevel::Admin));
        let guards = guards_with(provider, RuntimeConfig::default());

        assert!(guards.permissions_for("alice").await.is_empty());
        assert!(!guards.permission_cache().is_loading("alice"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_expired_entries_under_the_container() {
        let provider = Arc::new(FakeIdentityProvider::new(Duration::ZERO));
        provider.grant("alice", ResourceGrant::new("org/docs", AccessLevel::Read));

        let mut config = RuntimeConfig::default();
        config.permissions.ttl = Duration::from_secs(30);
        config.permissions.sweep_interval = Duration::from_secs(60);
        let guards = Arc::new(
            GuardContainer::with_time_source(
                config,
                provider,
                Arc::new(AssetTable::new()),
                Arc::new(InMemoryFilterStore::new()),
                Arc::new(TokioClock::new(1_700_000_000)),
            )
            .unwrap(),
        );
        let handle = guards.start().unwrap();

        assert_eq!(guards.permissions_for("alice").await.len(), 1);
        tokio::time::sleep(Duration::from_secs(45)).await;
        // Expired but not yet swept: the first tick is one interval after start.
        assert_eq!(guards.permission_cache().len(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(guards.permission_cache().len(), 0);
        assert_eq!(guards.permission_cache().metrics().snapshot().swept, 1);

        handle.shutdown().await;
    }
}
