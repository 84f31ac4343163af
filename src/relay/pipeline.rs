use crate::config::RelayConfig;
use crate::error::Result;
use crate::logging::Timer;
use crate::metadata::MetadataResolver;
use crate::relay::Blacklist;
use crate::slack::{ChannelId, InboundMessage, OutboundMessage, SlackApi};
use std::sync::Arc;

/// Why a message was not relayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// System message (join, edit, delete, ...)
    Subtype,
    /// Sent by an app or bot, including our own mirror posts
    Bot,
    /// Message without an author
    MissingAuthor,
    Blacklisted,
}

/// Outcome of running one message through the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayDecision {
    Suppress(SuppressReason),
    Forward(OutboundMessage),
}

/// Text posted to the mirror: the source channel as a quoted mention, then the body verbatim
pub fn format_relay_text(channel: &ChannelId, text: &str) -> String {
    format!("`<#{}>` {}", channel, text)
}

/// Filters, enriches and forwards inbound messages to the mirror channel.
///
/// One instance is shared by every per-message task; the resolver caches are
/// the only state they share.
pub struct RelayPipeline {
    api: Arc<dyn SlackApi>,
    resolver: Arc<MetadataResolver>,
    blacklist: Blacklist,
    target: ChannelId,
}

impl RelayPipeline {
    pub fn new(
        api: Arc<dyn SlackApi>,
        resolver: Arc<MetadataResolver>,
        blacklist: Blacklist,
        target: ChannelId,
    ) -> Self {
        Self {
            api,
            resolver,
            blacklist,
            target,
        }
    }

    /// Build the pipeline and its resolver from relay settings
    pub fn from_config(api: Arc<dyn SlackApi>, config: &RelayConfig) -> Self {
        let resolver = Arc::new(MetadataResolver::with_ttl(api.clone(), config.cache_ttl));
        Self::new(
            api,
            resolver,
            Blacklist::new(config.blacklist.iter().cloned()),
            ChannelId::new(config.target_channel.clone()),
        )
    }

    pub fn resolver(&self) -> &Arc<MetadataResolver> {
        &self.resolver
    }

    pub fn target(&self) -> &ChannelId {
        &self.target
    }

    /// Decide what to do with `message` without posting anything
    pub async fn decide(&self, message: &InboundMessage) -> Result<RelayDecision> {
        // Gate before any lookup: system messages and bots (which includes our own posts)
        if message.subtype.is_some() {
            return Ok(RelayDecision::Suppress(SuppressReason::Subtype));
        }
        if message.bot_id.is_some() {
            return Ok(RelayDecision::Suppress(SuppressReason::Bot));
        }
        let Some(user) = &message.user else {
            return Ok(RelayDecision::Suppress(SuppressReason::MissingAuthor));
        };

        let channel_name = self.resolver.resolve_channel_name(&message.channel).await?;
        if self.blacklist.is_blacklisted(channel_name.as_deref()) {
            tracing::debug!(
                channel_id = %message.channel,
                channel = ?channel_name,
                "Channel is blacklisted"
            );
            return Ok(RelayDecision::Suppress(SuppressReason::Blacklisted));
        }

        let profile = self.resolver.resolve_user_profile(user).await?;

        Ok(RelayDecision::Forward(OutboundMessage {
            channel: self.target.clone(),
            text: format_relay_text(&message.channel, &message.text),
            sender_name: profile.display_name,
            avatar_url: profile.avatar_url,
        }))
    }

    /// Run one message through the relay, posting it when allowed
    pub async fn handle(&self, message: InboundMessage) -> Result<RelayDecision> {
        let _timer = Timer::new("relay_message");

        let decision = self.decide(&message).await?;

        if let RelayDecision::Forward(outbound) = &decision {
            self.api.post_message(outbound).await?;
            tracing::info!(
                channel_id = %message.channel,
                user_id = ?message.user.as_ref().map(|u| u.as_str()),
                sender = ?outbound.sender_name,
                target = %self.target,
                "Relayed message"
            );
        }

        Ok(decision)
    }
}
