// In-memory implementation of TrackerStore.
//
// Trackers only live for the lifetime of the process. DashMap gives us a
// concurrent map without a Mutex, so several command invocations can touch the
// store at once.

use crate::core::tracking::{Tracker, TrackerError, TrackerStore};
use async_trait::async_trait;
use dashmap::DashMap;

/// Composite key: the same Imgur account can be tracked in several guilds.
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
struct GuildAccountKey {
    guild_id: u64,
    imgur_id: u64,
}

pub struct InMemoryTrackerStore {
    data: DashMap<GuildAccountKey, Tracker>,
}

impl InMemoryTrackerStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

impl Default for InMemoryTrackerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackerStore for InMemoryTrackerStore {
    async fn upsert(&self, guild_id: u64, tracker: Tracker) -> Result<Option<Tracker>, TrackerError> {
        let key = GuildAccountKey {
            guild_id,
            imgur_id: tracker.imgur().id,
        };
        Ok(self.data.insert(key, tracker))
    }

    async fn get(&self, guild_id: u64, imgur_id: u64) -> Result<Option<Tracker>, TrackerError> {
        let key = GuildAccountKey { guild_id, imgur_id };
        Ok(self.data.get(&key).map(|entry| entry.value().clone()))
    }

    async fn find_by_imgur_name(
        &self,
        guild_id: u64,
        imgur_name: &str,
    ) -> Result<Option<Tracker>, TrackerError> {
        Ok(self
            .data
            .iter()
            .find(|entry| {
                entry.key().guild_id == guild_id
                    && entry.value().imgur().name.eq_ignore_ascii_case(imgur_name)
            })
            .map(|entry| entry.value().clone()))
    }

    async fn remove(&self, guild_id: u64, imgur_id: u64) -> Result<Option<Tracker>, TrackerError> {
        let key = GuildAccountKey { guild_id, imgur_id };
        Ok(self.data.remove(&key).map(|(_, tracker)| tracker))
    }

    async fn list(&self, guild_id: u64) -> Result<Vec<Tracker>, TrackerError> {
        Ok(self
            .data
            .iter()
            .filter(|entry| entry.key().guild_id == guild_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_by_discord_id(
        &self,
        guild_id: u64,
        discord_id: u64,
    ) -> Result<Vec<Tracker>, TrackerError> {
        Ok(self
            .data
            .iter()
            .filter(|entry| {
                entry.key().guild_id == guild_id && entry.value().discord().id == discord_id
            })
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tracking::{PermissionLevel, PlatformIdentity};

    fn tracker(discord_id: u64, imgur_name: &str, imgur_id: u64) -> Tracker {
        Tracker::new(
            PlatformIdentity::new("member", discord_id),
            PlatformIdentity::new(imgur_name, imgur_id),
            PermissionLevel::User,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn upsert_replaces_same_account_in_same_guild() {
        let store = InMemoryTrackerStore::new();

        assert!(store.upsert(1, tracker(10, "a", 100)).await.unwrap().is_none());
        let previous = store.upsert(1, tracker(11, "a", 100)).await.unwrap();
        assert_eq!(previous.map(|t| t.discord().id), Some(10));

        // Different guild, separate entry.
        assert!(store.upsert(2, tracker(10, "a", 100)).await.unwrap().is_none());

        assert_eq!(store.list(1).await.unwrap().len(), 1);
        assert_eq!(store.list(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookup_and_remove_only_touch_one_guild() {
        let store = InMemoryTrackerStore::new();
        store.upsert(1, tracker(10, "Alpha", 100)).await.unwrap();
        store.upsert(2, tracker(10, "Alpha", 100)).await.unwrap();

        let found = store.find_by_imgur_name(1, "alpha").await.unwrap();
        assert_eq!(found.map(|t| t.imgur().id), Some(100));
        assert!(store.get(1, 100).await.unwrap().is_some());
        assert!(store.get(3, 100).await.unwrap().is_none());

        let removed = store.remove(1, 100).await.unwrap();
        assert_eq!(removed.map(|t| t.imgur().name.clone()), Some("Alpha".to_string()));
        assert!(store.list(1).await.unwrap().is_empty());
        assert_eq!(store.list(2).await.unwrap().len(), 1);

        assert!(store.remove(1, 100).await.unwrap().is_none());
        assert!(store.find_by_imgur_name(1, "alpha").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn finds_all_trackers_for_a_member() {
        let store = InMemoryTrackerStore::new();
        store.upsert(1, tracker(10, "a", 100)).await.unwrap();
        store.upsert(1, tracker(10, "b", 101)).await.unwrap();
        store.upsert(1, tracker(11, "c", 102)).await.unwrap();

        assert_eq!(store.find_by_discord_id(1, 10).await.unwrap().len(), 2);
        assert_eq!(store.find_by_discord_id(1, 11).await.unwrap().len(), 1);
        assert!(store.find_by_discord_id(2, 10).await.unwrap().is_empty());
    }
}
