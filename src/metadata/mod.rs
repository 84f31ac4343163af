//! Cached workspace metadata
//!
//! This module provides a generic TTL memoizer over async lookups and the two
//! resolvers the relay needs: channel id to name, user id to profile.
//!
//! Key features:
//! - Lazy-loading: Only fetches metadata when a message needs it
//! - TTL-based caching: 10-minute default (configurable)
//! - No negative caching: A failed lookup is retried on the next call

mod memoize;
mod resolver;
mod types;

pub use memoize::{CacheEntry, CacheStats, Memoizer};
pub use resolver::{DEFAULT_TTL, MetadataResolver};
pub use types::{ChannelInfo, UserProfile};
