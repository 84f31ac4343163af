//! Message relay: gate, blacklist filter, author enrichment and forwarding

mod blacklist;
mod pipeline;

pub use blacklist::Blacklist;
pub use pipeline::{RelayDecision, RelayPipeline, SuppressReason, format_relay_text};
