//! Twitter profile source (twitterapi.io).
//!
//! Upstream contract used here:
//! - `GET /twitter/user/info?userName=` returns `{status, msg, data: user}`
//! - `GET /twitter/user/last_tweets?userName=&cursor=` returns
//!   `{status, msg, data: {tweets: [...]}, has_next_page, next_cursor}`,
//!   with the pagination fields at the top level.
//!
//! Both bodies are checked against typed schemas; anything that does not match
//! is rejected as a malformed response.

use crate::adapters::ProfileSource;
use crate::error::{Result, TpotmonError};
use crate::http::HttpClient;
use crate::profile::{ActivityItem, FetchedProfile, Profile};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

pub const TWITTER_API_BASE: &str = "https://api.twitterapi.io";
pub const USER_INFO_PATH: &str = "/twitter/user/info";
pub const LAST_TWEETS_PATH: &str = "/twitter/user/last_tweets";

lazy_static::lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{1,15}$").unwrap();
}

const PROFILE_HOSTS: &[&str] = &["x.com", "twitter.com"];

// ============================================================================
// API Response Types
// ============================================================================

/// Generic twitterapi.io envelope
#[derive(Debug, Deserialize)]
pub struct TwitterApiResponse<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// Envelope of `/twitter/user/last_tweets`
#[derive(Debug, Deserialize)]
pub struct LastTweetsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<LastTweetsData>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LastTweetsData {
    #[serde(default)]
    pub tweets: Option<Vec<Tweet>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TwitterUser {
    pub user_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_blue_verified: bool,
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde(default)]
    pub following: Option<u64>,
    #[serde(default)]
    pub statuses_count: Option<u64>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub cover_picture: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub retweet_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
    #[serde(default)]
    pub view_count: Option<u64>,
}

impl TwitterUser {
    pub fn into_profile(self) -> Profile {
        Profile {
            name: self.name,
            username: self.user_name,
            description: self.description.unwrap_or_default(),
            is_blue_check: self.is_blue_verified,
            followers: self.followers.unwrap_or(0),
            following: self.following.unwrap_or(0),
            post_count: self.statuses_count.unwrap_or(0),
            profile_image_url: non_blank(self.profile_picture),
            banner_image_url: non_blank(self.cover_picture),
        }
    }
}

impl Tweet {
    pub fn into_item(self) -> ActivityItem {
        ActivityItem {
            text: self.text.unwrap_or_default(),
            likes: self.like_count.unwrap_or(0),
            shares: self.retweet_count.unwrap_or(0),
            replies: self.reply_count.unwrap_or(0),
            views: self.view_count.unwrap_or(0),
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn is_error_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("error"))
}

// ============================================================================
// Username parsing
// ============================================================================

/// Extract a username from user input.
///
/// Supported formats:
/// - `name`
/// - `@name`
/// - `https://x.com/name` (also `twitter.com`, `www.`/`mobile.` prefixes, no scheme)
pub fn extract_username(input: &str) -> Result<String> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(TpotmonError::InvalidUsername("Empty input".to_string()));
    }

    let lower = trimmed.to_lowercase();
    let is_url = lower.starts_with("http") || PROFILE_HOSTS.iter().any(|h| lower.contains(h));

    let candidate = if is_url {
        let with_scheme = if lower.starts_with("http") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };
        let url = Url::parse(&with_scheme)?;
        let host = url.host_str().unwrap_or("").to_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("mobile."))
            .unwrap_or(&host)
            .to_string();
        if !PROFILE_HOSTS.contains(&host.as_str()) {
            return Err(TpotmonError::InvalidUsername(format!(
                "Not a profile URL: {}",
                input
            )));
        }
        url.path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or("")
            .to_string()
    } else {
        trimmed.to_string()
    };

    let candidate = candidate.trim_start_matches('@');
    if USERNAME_RE.is_match(candidate) {
        return Ok(candidate.to_string());
    }

    Err(TpotmonError::InvalidUsername(format!(
        "Cannot extract username from: {}",
        input
    )))
}

// ============================================================================
// Twitter Client
// ============================================================================

pub struct TwitterClient {
    http: HttpClient,
    api_base: String,
}

impl TwitterClient {
    pub fn new(api_key: &str, api_base: Option<&str>) -> Result<Self> {
        Self::new_with_timeout(api_key, api_base, crate::http::DEFAULT_TIMEOUT_SECS)
    }

    pub fn new_with_timeout(api_key: &str, api_base: Option<&str>, timeout_secs: u64) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(TpotmonError::MissingConfig(
                "TWITTER_API_KEY is empty".to_string(),
            ));
        }
        let http = HttpClient::with_config(Some(api_key), None, Some(timeout_secs))?;
        Ok(Self {
            http,
            api_base: api_base
                .unwrap_or(TWITTER_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str, username: &str, cursor: Option<&str>) -> Result<String> {
        let mut url = Url::parse(&format!("{}{}", self.api_base, path))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("userName", username);
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        Ok(url.to_string())
    }

    pub async fn fetch_user_info(&self, username: &str) -> Result<TwitterUser> {
        let url = self.endpoint(USER_INFO_PATH, username, None)?;
        let envelope: TwitterApiResponse<Value> = self.http.get_json(&url).await?;

        if is_error_status(envelope.status.as_deref()) {
            return Err(TpotmonError::MalformedResponse(format!(
                "user info error: {}",
                envelope.msg.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        let data = envelope.data.filter(|d| !d.is_null()).ok_or_else(|| {
            warn!(endpoint = USER_INFO_PATH, "response has no data envelope");
            TpotmonError::MalformedResponse("user info response has no data".to_string())
        })?;

        serde_json::from_value::<TwitterUser>(data).map_err(|e| {
            warn!(endpoint = USER_INFO_PATH, error = %e, "user info does not match schema");
            TpotmonError::MalformedResponse(format!("user info: {}", e))
        })
    }

    /// Fetch one page of recent tweets.
    pub async fn fetch_last_tweets_page(
        &self,
        username: &str,
        cursor: Option<&str>,
    ) -> Result<LastTweetsResponse> {
        let url = self.endpoint(LAST_TWEETS_PATH, username, cursor)?;
        let text = self.http.get_text(&url).await?;

        let page: LastTweetsResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(endpoint = LAST_TWEETS_PATH, error = %e, "tweet page does not match schema");
            TpotmonError::MalformedResponse(format!("tweet page: {}", e))
        })?;

        if is_error_status(page.status.as_deref()) {
            return Err(TpotmonError::MalformedResponse(format!(
                "tweet page error: {}",
                page.msg.as_deref().unwrap_or("unknown error")
            )));
        }

        Ok(page)
    }

    /// Fetch user info once, then tweet pages until `cap` is reached or
    /// upstream pagination ends.
    pub async fn fetch_complete(&self, username: &str, cap: usize) -> Result<FetchedProfile> {
        info!(username = %username, cap, "fetching profile");
        let user = self.fetch_user_info(username).await?;
        debug!(username = %user.user_name, "got user info");

        let mut items: Vec<ActivityItem> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        while items.len() < cap {
            let page = self.fetch_last_tweets_page(username, cursor.as_deref()).await?;
            pages += 1;

            let tweets = page
                .data
                .and_then(|d| d.tweets)
                .ok_or_else(|| {
                    warn!(endpoint = LAST_TWEETS_PATH, page = pages, "tweet page has no data.tweets");
                    TpotmonError::MalformedResponse(format!(
                        "tweet page {} has no data.tweets",
                        pages
                    ))
                })?;

            let received = tweets.len();
            items.extend(tweets.into_iter().map(Tweet::into_item));
            cursor = non_blank(page.next_cursor);

            debug!(
                page = pages,
                received,
                total = items.len(),
                has_next_page = page.has_next_page,
                has_cursor = cursor.is_some(),
                "received tweet page"
            );

            if !page.has_next_page || cursor.is_none() {
                break;
            }
            if received == 0 {
                // An empty page that still claims more would otherwise loop forever.
                warn!(page = pages, "empty tweet page with has_next_page set; stopping");
                break;
            }
        }

        items.truncate(cap);
        info!(username = %username, tweets = items.len(), pages, "profile fetched");

        Ok(FetchedProfile {
            profile: user.into_profile(),
            items,
        })
    }
}

#[async_trait]
impl ProfileSource for TwitterClient {
    fn platform_id(&self) -> &'static str {
        "twitter"
    }

    fn parse_input(&self, input: &str) -> Result<String> {
        extract_username(input)
    }

    async fn fetch_user(&self, username: &str) -> Result<Profile> {
        Ok(self.fetch_user_info(username).await?.into_profile())
    }

    async fn fetch_profile(&self, username: &str, cap: usize) -> Result<FetchedProfile> {
        self.fetch_complete(username, cap).await
    }
}

// ============================================================================
// Tests
// ============================================================================
