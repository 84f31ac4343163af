//! Cached channel-name and author-profile lookups

use crate::error::Result;
use crate::metadata::memoize::{CacheStats, Memoizer};
use crate::metadata::types::UserProfile;
use crate::slack::{ChannelId, SlackApi, UserId};
use std::sync::Arc;
use std::time::Duration;

/// Default lifetime of a resolved channel name or profile
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Resolves channel names and user profiles through two independent memoizers.
///
/// Built once at startup and shared by every relay task.
pub struct MetadataResolver {
    channels: Memoizer<ChannelId, Option<String>>,
    users: Memoizer<UserId, UserProfile>,
}

impl MetadataResolver {
    pub fn new(api: Arc<dyn SlackApi>) -> Self {
        Self::with_ttl(api, DEFAULT_TTL)
    }

    pub fn with_ttl(api: Arc<dyn SlackApi>, ttl: Duration) -> Self {
        let channel_api = api.clone();
        let channels = Memoizer::new("channel_name", ttl, move |channel: ChannelId| {
            let api = channel_api.clone();
            async move { Ok(api.get_channel_info(&channel).await?.name) }
        });

        let users = Memoizer::new("user_profile", ttl, move |user: UserId| {
            let api = api.clone();
            async move { api.get_user_profile(&user).await }
        });

        Self { channels, users }
    }

    /// Channel name for `channel`; `None` when the workspace reports none
    pub async fn resolve_channel_name(&self, channel: &ChannelId) -> Result<Option<String>> {
        self.channels.get(channel).await
    }

    pub async fn resolve_user_profile(&self, user: &UserId) -> Result<UserProfile> {
        self.users.get(user).await
    }

    /// (channel stats, user stats)
    pub fn stats(&self) -> (CacheStats, CacheStats) {
        (self.channels.stats(), self.users.stats())
    }

    /// Get current cache sizes
    pub fn cache_sizes(&self) -> (usize, usize) {
        (self.channels.len(), self.users.len())
    }

    /// Drop expired entries from both caches (for periodic cleanup)
    pub fn purge_expired(&self) -> usize {
        self.channels.purge_expired() + self.users.purge_expired()
    }

    pub fn log_stats(&self) {
        self.channels.log_stats();
        self.users.log_stats();
    }
}
