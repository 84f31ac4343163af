use crate::error::Result;
use crate::metadata::{ChannelInfo, UserProfile};
use crate::slack::{ChannelId, OutboundMessage, UserId};
use async_trait::async_trait;

/// Remote workspace calls the relay depends on.
///
/// `SlackClient` implements this against the Web API; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `conversations.info`
    async fn get_channel_info(&self, channel: &ChannelId) -> Result<ChannelInfo>;

    /// `users.info`, reduced to the profile fields used for impersonation
    async fn get_user_profile(&self, user: &UserId) -> Result<UserProfile>;

    /// `chat.postMessage` with sender name and avatar overrides
    async fn post_message(&self, message: &OutboundMessage) -> Result<()>;

    /// `conversations.join`
    async fn join_channel(&self, channel: &ChannelId) -> Result<()>;
}
