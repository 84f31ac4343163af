mod api;
mod client;
mod events;
mod types;

pub use api::SlackApi;
pub use client::SlackClient;
pub use events::{EventHandler, inbound_from_event};
pub use types::{ChannelId, InboundMessage, MessageTs, OutboundMessage, UserId};
