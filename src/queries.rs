//! Read helpers pairing each query key with its gateway loader.

use std::sync::Arc;

use crate::cache::{CacheData, CacheEntry, CacheSubscription, EntityCache, QueryKey};
use crate::gateway::UserGateway;
use crate::model::UserId;

#[derive(Clone)]
pub struct UserQueries {
    cache: EntityCache,
    gateway: Arc<dyn UserGateway>,
}

impl UserQueries {
    pub fn new(cache: EntityCache, gateway: Arc<dyn UserGateway>) -> Self {
        Self { cache, gateway }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// The user list for `search`, from cache when fresh.
    pub async fn users(&self, search: Option<&str>) -> CacheEntry {
        let key = QueryKey::collection(search);
        let gateway = Arc::clone(&self.gateway);
        let term = key.search().map(str::to_string);
        self.cache
            .read(&key, move || async move {
                gateway.list(term.as_deref()).await.map(CacheData::Users)
            })
            .await
    }

    /// One user by id, from cache when fresh.
    pub async fn user(&self, id: &UserId) -> CacheEntry {
        let key = QueryKey::item(id.clone());
        let gateway = Arc::clone(&self.gateway);
        let id = id.clone();
        self.cache
            .read(&key, move || async move {
                gateway.get(&id).await.map(CacheData::User)
            })
            .await
    }

    pub fn watch_users(&self, search: Option<&str>) -> CacheSubscription {
        self.cache.subscribe(&QueryKey::collection(search))
    }

    pub fn watch_user(&self, id: &UserId) -> CacheSubscription {
        self.cache.subscribe(&QueryKey::item(id.clone()))
    }
}
