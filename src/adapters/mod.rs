//! Profile Sources
//!
//! Each source handles username parsing and API fetching for a specific platform.

use crate::error::Result;
use crate::profile::{FetchedProfile, Profile};
use async_trait::async_trait;

pub mod twitter;

pub use twitter::{
    extract_username, LastTweetsResponse, Tweet, TwitterApiResponse, TwitterClient, TwitterUser,
};

/// Trait for platform-specific profile sources.
///
/// Each source knows how to:
/// 1. Parse input (handle or profile URL) into a platform username
/// 2. Fetch the profile alone (for the edge endpoint)
/// 3. Fetch the profile plus its recent activity, following pagination up to a cap
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Returns the unique identifier for this platform (e.g., "twitter")
    fn platform_id(&self) -> &'static str;

    /// Parse user input (URL, `@handle`, or bare handle) into a username.
    fn parse_input(&self, input: &str) -> Result<String>;

    /// Fetch identity fields only.
    async fn fetch_user(&self, username: &str) -> Result<Profile>;

    /// Fetch identity fields and up to `cap` recent activity items.
    ///
    /// Any error, including a malformed page, fails the whole call; no partial
    /// result is returned.
    async fn fetch_profile(&self, username: &str, cap: usize) -> Result<FetchedProfile>;
}
