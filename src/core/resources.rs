//! Kit resource cache
//!
//! Forms, tags, sequences and custom fields change rarely, so their lists are
//! kept in state storage and refetched once older than the configured TTL.

use crate::adapters::database::traits::StateStorage;
use crate::adapters::kit::KitApi;
use crate::domain::resource::{CachedResources, Resource, ResourceKind};
use crate::domain::subscription::Subscription;
use crate::domain::Result;
use chrono::Utc;
use std::sync::Arc;

pub struct ResourceCache {
    kit: Arc<dyn KitApi>,
    storage: Arc<dyn StateStorage>,
    ttl_seconds: u64,
}

impl ResourceCache {
    pub fn new(kit: Arc<dyn KitApi>, storage: Arc<dyn StateStorage>, ttl_seconds: u64) -> Self {
        Self {
            kit,
            storage,
            ttl_seconds,
        }
    }

    /// Cached list of `kind`, refetched when missing or stale
    pub async fn get(&self, kind: ResourceKind) -> Result<CachedResources> {
        match self.storage.load_resources(kind).await? {
            Some(cached) if !cached.is_stale(self.ttl_seconds, Utc::now()) => Ok(cached),
            Some(_) => {
                tracing::debug!(kind = %kind, "Cached resources are stale");
                self.refresh(kind).await
            }
            None => self.refresh(kind).await,
        }
    }

    /// Fetches `kind` from Kit and stores it
    pub async fn refresh(&self, kind: ResourceKind) -> Result<CachedResources> {
        let resources = self.kit.list_resources(kind).await?;
        let cached = CachedResources::new(kind, resources);
        self.storage.save_resources(&cached).await?;

        tracing::info!(kind = %kind, count = cached.resources.len(), "Refreshed Kit resources");
        Ok(cached)
    }

    /// Refreshes every resource kind, stopping at the first failure
    pub async fn refresh_all(&self) -> Result<Vec<CachedResources>> {
        let mut refreshed = Vec::with_capacity(ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            refreshed.push(self.refresh(kind).await?);
        }
        Ok(refreshed)
    }

    /// Looks up the resource a subscription points at
    ///
    /// # Returns
    ///
    /// `Ok(None)` when Kit has no such resource, e.g. a deleted form.
    pub async fn resolve(&self, subscription: Subscription) -> Result<Option<Resource>> {
        let cached = self.get(subscription.kind()).await?;
        Ok(cached.find(subscription.resource_id()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;
    use crate::core::test_support::{resource, FakeKit};
    use crate::domain::ids::ResourceId;
    use chrono::Duration;

    fn tag(id: u64) -> Subscription {
        Subscription::Tag(ResourceId::new(id).unwrap())
    }

    #[tokio::test]
    async fn test_fresh_cache_is_not_refetched() {
        let kit = Arc::new(
            FakeKit::new().with_resources(ResourceKind::Tags, vec![resource(1, "VIP")]),
        );
        let cache = ResourceCache::new(kit.clone(), Arc::new(MemoryStorage::new()), 3600);

        cache.get(ResourceKind::Tags).await.unwrap();
        cache.get(ResourceKind::Tags).await.unwrap();

        assert_eq!(kit.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_is_refetched() {
        let kit = Arc::new(
            FakeKit::new().with_resources(ResourceKind::Tags, vec![resource(1, "VIP")]),
        );
        let storage = Arc::new(MemoryStorage::new());
        let mut old = CachedResources::new(ResourceKind::Tags, Vec::new());
        old.fetched_at = Utc::now() - Duration::hours(2);
        storage.save_resources(&old).await.unwrap();
        let cache = ResourceCache::new(kit.clone(), storage, 3600);

        let cached = cache.get(ResourceKind::Tags).await.unwrap();

        assert_eq!(kit.list_calls(), 1);
        assert_eq!(cached.resources.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_known_and_unknown() {
        let kit = Arc::new(
            FakeKit::new().with_resources(ResourceKind::Tags, vec![resource(1, "VIP")]),
        );
        let cache = ResourceCache::new(kit, Arc::new(MemoryStorage::new()), 3600);

        assert_eq!(
            cache.resolve(tag(1)).await.unwrap().map(|r| r.name),
            Some("VIP".to_string())
        );
        assert_eq!(cache.resolve(tag(2)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_all_covers_every_kind() {
        let kit = Arc::new(FakeKit::new());
        let cache = ResourceCache::new(kit.clone(), Arc::new(MemoryStorage::new()), 3600);

        let refreshed = cache.refresh_all().await.unwrap();

        assert_eq!(refreshed.len(), ResourceKind::ALL.len());
        assert_eq!(kit.list_calls(), ResourceKind::ALL.len());
    }
}
