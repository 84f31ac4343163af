use crate::error::{RelayError, Result};
use crate::logging::log_error;
use crate::relay::{RelayDecision, RelayPipeline};
use crate::slack::{ChannelId, InboundMessage, MessageTs, SlackClient, UserId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use slack_morphism::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a delivered event is remembered for deduplication
const DEDUP_WINDOW: Duration = Duration::from_secs(3600);

#[derive(Clone)]
struct BotState {
    pipeline: Arc<RelayPipeline>,
    processed_events: Arc<DashMap<String, Instant>>,
}

pub struct EventHandler {
    slack_client: Arc<SlackClient>,
    pipeline: Arc<RelayPipeline>,
}

/// Reduce a Slack message event to the fields relaying needs.
///
/// Returns `None` for events without a channel.
pub fn inbound_from_event(message: &SlackMessageEvent) -> Option<InboundMessage> {
    let channel = ChannelId::new(message.origin.channel.as_ref()?.to_string());
    let user = message.sender.user.as_ref().map(|u| UserId::new(u.to_string()));
    let text = message
        .content
        .as_ref()
        .and_then(|c| c.text.clone())
        .unwrap_or_default();

    let mut inbound = InboundMessage::new(channel, user, text)
        .with_ts(MessageTs::new(message.origin.ts.to_string()));
    inbound.subtype = message.subtype.as_ref().map(|s| format!("{:?}", s));
    inbound.bot_id = message.sender.bot_id.as_ref().map(|b| b.to_string());

    Some(inbound)
}

impl EventHandler {
    pub fn new(slack_client: Arc<SlackClient>, pipeline: Arc<RelayPipeline>) -> Self {
        Self {
            slack_client,
            pipeline,
        }
    }

    /// Start listening for Slack events using Socket Mode
    pub async fn start(self) -> Result<()> {
        tracing::info!("Initializing event handler components");

        let bot_state = BotState {
            pipeline: self.pipeline.clone(),
            processed_events: Arc::new(DashMap::new()),
        };

        tracing::debug!("Creating listener environment");
        let listener_environment = Arc::new(
            SlackClientEventsListenerEnvironment::new(self.slack_client.get_client())
                .with_error_handler(Self::error_handler)
                .with_user_state(bot_state),
        );

        let callbacks =
            SlackSocketModeListenerCallbacks::new().with_push_events(Self::handle_push_event);

        let socket_mode_listener = SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment,
            callbacks,
        );

        tracing::info!("Connecting to Slack via Socket Mode");
        socket_mode_listener
            .listen_for(self.slack_client.get_app_token())
            .await
            .map_err(|e| RelayError::SlackApi(e.to_string()))?;

        tracing::info!("Connected to Slack Socket Mode, relaying messages");

        socket_mode_listener.serve().await;

        Ok(())
    }

    async fn handle_push_event(
        event: SlackPushEventCallback,
        _client: Arc<SlackHyperClient>,
        user_state: SlackClientEventsUserState,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let SlackEventCallbackBody::Message(message) = event.event else {
            tracing::trace!("Ignoring non-message event");
            return Ok(());
        };

        let state: BotState = {
            let storage = user_state.read().await;
            storage
                .get_user_state::<BotState>()
                .cloned()
                .ok_or_else(|| RelayError::Internal("Bot state not registered".to_string()))?
        };

        let Some(inbound) = inbound_from_event(&message) else {
            tracing::debug!("Ignoring message event without channel");
            return Ok(());
        };

        // Cleanup old events to prevent memory growth
        Self::cleanup_old_events(&state.processed_events);

        if Self::is_duplicate(&state.processed_events, &inbound) {
            return Ok(());
        }

        // Each message relays in its own task so a slow lookup never blocks the listener
        tokio::spawn(async move {
            Self::relay(inbound, &state.pipeline).await;
        });

        Ok(())
    }

    async fn relay(message: InboundMessage, pipeline: &RelayPipeline) {
        let channel_id = message.channel.clone();
        let ts = message.ts.clone();

        match pipeline.handle(message).await {
            Ok(RelayDecision::Forward(_)) => {}
            Ok(RelayDecision::Suppress(reason)) => {
                tracing::debug!(
                    channel_id = %channel_id,
                    ts = ?ts.as_ref().map(MessageTs::as_str),
                    reason = ?reason,
                    "Message not relayed"
                );
            }
            Err(e) => log_error("relay_message", &e),
        }
    }

    /// Record the event, returning true when it was already seen (Socket Mode redelivery)
    fn is_duplicate(events: &DashMap<String, Instant>, message: &InboundMessage) -> bool {
        let Some(ts) = &message.ts else {
            return false;
        };

        let event_key = format!("message:{}:{}", message.channel, ts.as_str());
        match events.entry(event_key) {
            Entry::Occupied(entry) => {
                tracing::debug!(event_key = %entry.key(), "Duplicate event detected, skipping");
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(Instant::now());
                false
            }
        }
    }

    fn error_handler(
        err: Box<dyn std::error::Error + Send + Sync>,
        _client: Arc<SlackHyperClient>,
        _states: SlackClientEventsUserState,
    ) -> HttpStatusCode {
        tracing::error!(
            error = %err,
            error_kind = std::any::type_name_of_val(&*err),
            "Slack event error"
        );
        HttpStatusCode::OK
    }

    /// Cleanup events older than the dedup window
    fn cleanup_old_events(events: &DashMap<String, Instant>) {
        let mut removed = 0;

        events.retain(|_key, instant| {
            let keep = instant.elapsed() < DEDUP_WINDOW;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            tracing::debug!(removed_count = removed, "Cleaned up old events from cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A plain user message as Slack delivers it over Socket Mode
    fn message_event(extra: serde_json::Value) -> SlackMessageEvent {
        let mut payload = json!({
            "channel": "C1",
            "channel_type": "channel",
            "user": "U1",
            "text": "hi",
            "ts": "1700000000.000100"
        });
        if let (Some(base), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_inbound_from_user_message() {
        let inbound = inbound_from_event(&message_event(json!({}))).unwrap();

        assert_eq!(inbound.channel, ChannelId::new("C1"));
        assert_eq!(inbound.user, Some(UserId::new("U1")));
        assert_eq!(inbound.text, "hi");
        assert_eq!(inbound.ts, Some(MessageTs::new("1700000000.000100")));
        assert!(inbound.subtype.is_none());
        assert!(inbound.bot_id.is_none());
    }

    #[test]
    fn test_inbound_keeps_bot_id() {
        let inbound = inbound_from_event(&message_event(json!({ "bot_id": "B1" }))).unwrap();

        assert_eq!(inbound.bot_id.as_deref(), Some("B1"));
        assert!(inbound.subtype.is_none());
    }

    #[test]
    fn test_inbound_keeps_subtype() {
        let mut event = message_event(json!({}));
        event.subtype = Some(SlackMessageEventType::ChannelJoin);

        let inbound = inbound_from_event(&event).unwrap();

        assert_eq!(
            inbound.subtype,
            Some(format!("{:?}", SlackMessageEventType::ChannelJoin))
        );
        assert!(inbound.bot_id.is_none());
    }

    #[test]
    fn test_inbound_without_text_is_empty() {
        let mut event = message_event(json!({}));
        event.content = None;

        assert_eq!(inbound_from_event(&event).unwrap().text, "");
    }

    #[test]
    fn test_inbound_requires_channel() {
        let mut event = message_event(json!({}));
        event.origin.channel = None;

        assert!(inbound_from_event(&event).is_none());
    }

    #[test]
    fn test_concurrent_redeliveries_relay_once() {
        let events = DashMap::new();
        let message = InboundMessage::new(ChannelId::new("C1"), None, "hi")
            .with_ts(MessageTs::new("1700000000.000100"));

        let fresh = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| EventHandler::is_duplicate(&events, &message)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|duplicate| !duplicate)
                .count()
        });

        assert_eq!(fresh, 1);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_duplicate_detection() {
        let events = DashMap::new();
        let message = InboundMessage::new(ChannelId::new("C1"), None, "hi")
            .with_ts(MessageTs::new("1700000000.000100"));

        assert!(!EventHandler::is_duplicate(&events, &message));
        assert!(EventHandler::is_duplicate(&events, &message));

        let other = InboundMessage::new(ChannelId::new("C2"), None, "hi")
            .with_ts(MessageTs::new("1700000000.000100"));
        assert!(!EventHandler::is_duplicate(&events, &other));
    }

    #[test]
    fn test_messages_without_ts_are_never_duplicates() {
        let events = DashMap::new();
        let message = InboundMessage::new(ChannelId::new("C1"), None, "hi");

        assert!(!EventHandler::is_duplicate(&events, &message));
        assert!(!EventHandler::is_duplicate(&events, &message));
        assert!(events.is_empty());
    }

    #[test]
    fn test_cleanup_keeps_recent_events() {
        let events = DashMap::new();
        events.insert("message:C1:1".to_string(), Instant::now());

        EventHandler::cleanup_old_events(&events);
        assert_eq!(events.len(), 1);
    }
}
