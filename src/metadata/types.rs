//! Metadata types resolved from the workspace

use crate::slack::{ChannelId, UserId};

/// Channel metadata information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel ID (e.g., C09NU1KFXHT)
    pub id: ChannelId,

    /// Channel name without # (e.g., "general"); DMs and some shared channels have none
    pub name: Option<String>,
}

/// Author profile used to impersonate the original sender in the mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// User ID (e.g., U09JDBT2MCM)
    pub id: UserId,

    /// Display name (what shows in Slack)
    pub display_name: Option<String>,

    /// Avatar image URL
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(
        id: UserId,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            id,
            display_name,
            avatar_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_keeps_absent_fields() {
        let profile = UserProfile::new(UserId::new("U123"), None, None);

        assert_eq!(profile.id, UserId::new("U123"));
        assert!(profile.display_name.is_none());
        assert!(profile.avatar_url.is_none());
    }
}
