//! Normalized profile data, independent of the upstream API's wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub username: String,
    pub description: String,
    pub is_blue_check: bool,
    pub followers: u64,
    pub following: u64,
    pub post_count: u64,
    pub profile_image_url: Option<String>,
    pub banner_image_url: Option<String>,
}

/// One recent post with its engagement counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityItem {
    pub text: String,
    pub likes: u64,
    pub shares: u64,
    pub replies: u64,
    pub views: u64,
}

/// Result of the paginated fetch: `items.len()` never exceeds the cap it was fetched with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchedProfile {
    pub profile: Profile,
    pub items: Vec<ActivityItem>,
}
