//! # Asset Name Flows
//!
//! The tenant filter registry in front of an asset table, through the guard
//! container lifecycle.
//!
//! 1. Cold start backfills from the table and answers membership
//! 2. New names are visible at once and survive a restart through the store
//! 3. Uniqueness checks skip the table when the filter rules a name out

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use av_02_name_filters::{FilterStore, InMemoryFilterStore};
    use av_runtime::{GuardContainer, RuntimeConfig};

    use crate::integration::fixtures::{AssetTable, FakeIdentityProvider};

    fn guards(
        assets: Arc<AssetTable>,
        store: Arc<InMemoryFilterStore>,
    ) -> GuardContainer<AssetTable, InMemoryFilterStore> {
        GuardContainer::new(
            RuntimeConfig::default(),
            Arc::new(FakeIdentityProvider::new(Duration::ZERO)),
            assets,
            store,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_backfilled_tenant_answers_membership() {
        let assets = Arc::new(AssetTable::new());
        assets.insert("org/docs", "a.png");
        assets.insert("org/docs", "b.png");
        let guards = guards(assets.clone(), Arc::new(InMemoryFilterStore::new()));
        let filters = guards.name_filters();

        assert!(filters.might_contain("org/docs", "a.png").await);
        assert!(filters.might_contain("org/docs", "b.png").await);
        assert!(!filters.might_contain("org/docs", "c.png").await);
        assert!(!filters.might_contain("org/site", "a.png").await);
        assert_eq!(assets.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_names_survive_restart() {
        let assets = Arc::new(AssetTable::new());
        let store = Arc::new(InMemoryFilterStore::new());

        {
            let guards = guards(assets.clone(), store.clone());
            let handle = guards.start().unwrap();

            guards.name_filters().add_name("org/docs", "Logo.png").await;
            assets.insert("org/docs", "Logo.png");
            handle.shutdown().await;
        }
        assert_eq!(assets.list_calls(), 1);
        assert!(store.load("org/docs").await.unwrap().is_some());

        let guards = guards(assets.clone(), store);
        assert!(guards.name_filters().might_contain("org/docs", "  logo.PNG ").await);
        assert_eq!(assets.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_uniqueness_checks_mostly_skip_the_table() {
        let assets = Arc::new(AssetTable::new());
        for i in 0..1_000 {
            assets.insert("org/media", &format!("photo-{:04}.jpg", i));
        }
        let guards = guards(assets.clone(), Arc::new(InMemoryFilterStore::new()));
        let filters = guards.name_filters();

        for i in 0..1_000 {
            let name = format!("photo-{:04}.jpg", i);
            assert!(filters.name_exists("org/media", &name).await.unwrap());
        }
        assert_eq!(assets.exists_calls(), 1_000);

        for i in 0..1_000 {
            let name = format!("video-{:04}.mp4", i);
            assert!(!filters.name_exists("org/media", &name).await.unwrap());
        }
        assert!(assets.exists_calls() < 1_010);
    }

    #[tokio::test]
    async fn test_clear_cache_keeps_persisted_rows() {
        let assets = Arc::new(AssetTable::new());
        assets.insert("org/docs", "a.png");
        let store = Arc::new(InMemoryFilterStore::new());
        let guards = guards(assets.clone(), store.clone());
        let handle = guards.start().unwrap();
        let filters = guards.name_filters();

        assert!(filters.might_contain("org/docs", "a.png").await);
        filters.flush().await;
        filters.clear_cache();
        assert!(filters.tenants().is_empty());

        assert!(filters.might_contain("org/docs", "a.png").await);
        assert_eq!(assets.list_calls(), 1);
        assert_eq!(store.len(), 1);

        handle.shutdown().await;
    }
}
