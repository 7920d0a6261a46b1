//! Flavor content generation.
//!
//! The generator is an opaque collaborator: it receives a structured summary
//! of the profile and its recent posts and must answer with a JSON object
//! holding abilities and attacks. Only the final text is inspected, and it is
//! parsed as JSON; anything else is a fatal parse error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::VariantNames;
use tracing::{debug, info};

use crate::card::{Ability, AbilityType, Affinity, Attack, AttackChance, AttackType, Loose, Rarity};
use crate::error::{Result, TpotmonError};
use crate::http::HttpClient;
use crate::profile::FetchedProfile;

/// Upper bound on posts forwarded to the generator.
pub const MAX_SUMMARY_TWEETS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetSummary {
    pub text: String,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub views: u64,
}

/// Prompt payload sent to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub name: String,
    pub username: String,
    pub followers: u64,
    pub following: u64,
    pub is_blue_check: bool,
    pub tweet_count: u64,
    pub recent_tweets: Vec<TweetSummary>,
}

impl ProfileSummary {
    pub fn from_profile(fetched: &FetchedProfile, limit: usize) -> Self {
        let p = &fetched.profile;
        Self {
            name: p.name.clone(),
            username: p.username.clone(),
            followers: p.followers,
            following: p.following,
            is_blue_check: p.is_blue_check,
            tweet_count: p.post_count,
            recent_tweets: fetched
                .items
                .iter()
                .take(limit.min(MAX_SUMMARY_TWEETS))
                .map(|item| TweetSummary {
                    text: item.text.clone(),
                    likes: item.likes,
                    retweets: item.shares,
                    replies: item.replies,
                    views: item.views,
                })
                .collect(),
        }
    }
}

/// Abilities/attacks and optional extras, authored by hand or generated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlavorContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub attacks: Vec<Attack>,
    #[serde(default)]
    pub weakness: Option<Affinity>,
    #[serde(default)]
    pub resists: Option<Affinity>,
    #[serde(default)]
    pub rarity: Option<Loose<Rarity>>,
    #[serde(default)]
    pub hp: Option<Loose<u32>>,
}

#[async_trait]
pub trait FlavorGenerator: Send + Sync {
    async fn generate(&self, summary: &ProfileSummary) -> Result<FlavorContent>;
}

/// Parse the generator's final text. A surrounding markdown code fence is tolerated.
///
/// Enum and number fields that fall outside the card model are kept raw for
/// the validator to report. Text that is not a JSON object, or text fields
/// holding non-strings, is an error.
pub fn parse_flavor_json(text: &str) -> Result<FlavorContent> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('\u{feff}').unwrap_or(trimmed);
    let body = strip_code_fence(trimmed);
    serde_json::from_str(body)
        .map_err(|e| TpotmonError::InvalidJson(format!("generator output: {}", e)))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

pub fn instructions() -> String {
    format!(
        "You are generating a tpotmon card based on a user's Twitter activity. \
DO NOT generate a biography or description of the user. Instead:\n\
- Focus ONLY on generating abilities and attacks based on their tweets.\n\
- Abilities should reference patterns in their tweets (e.g., constantly replying, posting memes, baiting engagement).\n\
- Attacks should reference how they interact with others (e.g., getting ratioed, dunking, oversharing, schizo posting).\n\
- Use humor and sarcasm to reflect the user's posting style.\n\
- Ensure each attack and ability is UNIQUE based on their tweet content.\n\
- Give at most 2 abilities and at most 2 attacks.\n\
- Responses must be a single JSON object of the form \
{{\"title\": string, \"abilities\": [{{\"name\": string, \"type\": one of [{}], \"description\": string}}], \
\"attacks\": [{{\"name\": string, \"type\": one of [{}], \"damage\": number, \"chance\": one of [{}], \"description\": string}}], \
\"weakness\": {{\"amount\": 0-100, \"type\": one of [{}]}}, \"resists\": {{\"amount\": 0-100, \"type\": one of [{}]}}}}.",
        AbilityType::VARIANTS.join(", "),
        AttackType::VARIANTS.join(", "),
        AttackChance::VARIANTS.join(", "),
        AttackType::VARIANTS.join(", "),
        AttackType::VARIANTS.join(", "),
    )
}

// ============================================================================
// OpenAI-compatible chat completions
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiGenerator {
    http: HttpClient,
    api_base: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, api_base: &str, model: &str, timeout_secs: u64) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(TpotmonError::MissingConfig("OPENAI_API_KEY is empty".to_string()));
        }
        // Generation is slower than plain API calls.
        let timeout_secs = timeout_secs.max(120);
        Ok(Self {
            http: HttpClient::with_config(None, Some(api_key), Some(timeout_secs))?,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn request_body(&self, summary: &ProfileSummary) -> Result<Value> {
        Ok(json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": instructions()},
                {"role": "user", "content": serde_json::to_string(summary)?},
            ],
            "response_format": {"type": "json_object"},
        }))
    }
}

#[async_trait]
impl FlavorGenerator for OpenAiGenerator {
    async fn generate(&self, summary: &ProfileSummary) -> Result<FlavorContent> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = self.request_body(summary)?;

        info!(
            model = %self.model,
            username = %summary.username,
            tweets = summary.recent_tweets.len(),
            "requesting flavor content"
        );
        let response: ChatCompletionResponse = self.http.post_json(&url, &body).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TpotmonError::MissingField("choices[0].message.content".to_string()))?;
        debug!(len = text.len(), "generator replied");

        parse_flavor_json(&text)
    }
}
