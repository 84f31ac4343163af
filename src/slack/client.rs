use crate::config::SlackConfig;
use crate::error::{RelayError, Result};
use crate::metadata::{ChannelInfo, UserProfile};
use crate::slack::{ChannelId, OutboundMessage, SlackApi, UserId};
use async_trait::async_trait;
use slack_morphism::prelude::*;
use std::sync::Arc;

/// Preferred avatar edge length in pixels
const AVATAR_SIZE: u32 = 512;

pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
    app_token: SlackApiToken,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| RelayError::SlackApi(e.to_string()))?;

        let client = Arc::new(slack_morphism::SlackClient::new(connector));
        let token = SlackApiToken::new(config.bot_token.into());
        let app_token = SlackApiToken::new(config.app_token.into());

        Ok(Self {
            client,
            token,
            app_token,
        })
    }

    pub fn get_client(&self) -> Arc<SlackHyperClient> {
        self.client.clone()
    }

    pub fn get_app_token(&self) -> &SlackApiToken {
        &self.app_token
    }
}

/// Best avatar URL from a profile: the 512px image, else the original upload
fn avatar_url(profile: &SlackUserProfile) -> Option<String> {
    let icon = profile.icon.as_ref()?;

    icon.images
        .as_ref()
        .and_then(|images| {
            images
                .resolutions
                .iter()
                .find(|(size, _)| *size == AVATAR_SIZE)
                .map(|(_, url)| url.clone())
        })
        .or_else(|| icon.image_original.clone())
}

/// Display name as set by the user; Slack reports an unset one as ""
fn display_name(display_name: Option<&str>) -> Option<String> {
    display_name
        .filter(|name| !name.is_empty())
        .map(String::from)
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn get_channel_info(&self, channel: &ChannelId) -> Result<ChannelInfo> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiConversationsInfoRequest::new(SlackChannelId(channel.to_string()));

        let response = session
            .conversations_info(&request)
            .await
            .map_err(|e| RelayError::SlackApi(e.to_string()))?;

        Ok(ChannelInfo {
            id: channel.clone(),
            name: response.channel.name,
        })
    }

    async fn get_user_profile(&self, user: &UserId) -> Result<UserProfile> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiUsersInfoRequest::new(SlackUserId(user.to_string()));

        let response = session
            .users_info(&request)
            .await
            .map_err(|e| RelayError::SlackApi(e.to_string()))?;

        let profile = response.user.profile.as_ref();

        Ok(UserProfile::new(
            user.clone(),
            profile.and_then(|p| display_name(p.display_name.as_deref())),
            profile.and_then(avatar_url),
        ))
    }

    async fn post_message(&self, message: &OutboundMessage) -> Result<()> {
        let session = self.client.open_session(&self.token);

        let mut request = SlackApiChatPostMessageRequest::new(
            message.channel.as_str().into(),
            SlackMessageContent::new().with_text(message.text.clone()),
        );

        // Post as the original author
        request.username = message.sender_name.clone();
        request.icon_url = message.avatar_url.clone();

        request.unfurl_links = Some(false);
        request.unfurl_media = Some(false);

        session
            .chat_post_message(&request)
            .await
            .map_err(|e| RelayError::SlackApi(e.to_string()))?;

        Ok(())
    }

    async fn join_channel(&self, channel: &ChannelId) -> Result<()> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiConversationsJoinRequest::new(SlackChannelId(channel.to_string()));

        session
            .conversations_join(&request)
            .await
            .map_err(|e| RelayError::SlackApi(e.to_string()))?;

        tracing::info!(channel_id = %channel, "Joined channel");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_app_token() {
        // Initialize crypto provider for rustls
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let config = SlackConfig {
            bot_token: "xoxb-test".to_string(),
            app_token: "xapp-test".to_string(),
        };
        let client = SlackClient::new(config).unwrap();

        assert_eq!(client.get_app_token().token_value.0, "xapp-test");
    }

    #[test]
    fn test_display_name_is_used_verbatim() {
        assert_eq!(display_name(Some("Alice")), Some("Alice".to_string()));
    }

    #[test]
    fn test_unset_display_name_stays_absent() {
        assert_eq!(display_name(Some("")), None);
        assert_eq!(display_name(None), None);
    }
}
