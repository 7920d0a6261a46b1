//! Card publishing.
//!
//! A finished card is handed to an [`ArtifactPublisher`]. The local publisher
//! writes `<dir>/<username>.json`; the remote one posts the card JSON to a
//! collector endpoint. File names only ever use `[A-Za-z0-9_]`; anything else
//! falls back to `card-data.json`.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::extract_username;
use crate::card::{file_name_for, Card};
use crate::error::{Result, TpotmonError};
use crate::http::HttpClient;

/// Where a published card ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub location: String,
    pub id: Option<String>,
}

#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    async fn publish(&self, card: &Card) -> Result<PublishReceipt>;
}

pub struct FilePublisher {
    dir: PathBuf,
    file_stem: Option<String>,
}

impl FilePublisher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_stem: None,
        }
    }

    /// Name the file after `username` instead of the card's own `username`
    /// field. The input goes through the same extraction as a fetch.
    pub fn named(mut self, username: &str) -> Result<Self> {
        self.file_stem = Some(extract_username(username)?);
        Ok(self)
    }

    pub fn path_for(&self, card: &Card) -> PathBuf {
        match &self.file_stem {
            Some(stem) => self.dir.join(file_name_for(stem)),
            None => self.dir.join(card.file_name()),
        }
    }
}

#[async_trait]
impl ArtifactPublisher for FilePublisher {
    async fn publish(&self, card: &Card) -> Result<PublishReceipt> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(card);
        tokio::fs::write(&path, card.to_pretty_json()?).await?;

        info!(path = %path.display(), "card written");
        Ok(PublishReceipt {
            location: path.display().to_string(),
            id: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CollectorReply {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl Default for CollectorReply {
    fn default() -> Self {
        Self {
            success: true,
            id: None,
            message: None,
        }
    }
}

/// Posts cards to a remote collector.
pub struct RemotePublisher {
    url: String,
    http: HttpClient,
}

impl RemotePublisher {
    pub fn new(url: &str, token: Option<&str>, timeout_secs: u64) -> Result<Self> {
        let url = url.trim();
        url::Url::parse(url)?;
        Ok(Self {
            url: url.to_string(),
            http: HttpClient::with_config(None, token, Some(timeout_secs))?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ArtifactPublisher for RemotePublisher {
    async fn publish(&self, card: &Card) -> Result<PublishReceipt> {
        let body = self.http.post_text(&self.url, card).await.map_err(|e| match e {
            TpotmonError::NetworkError(msg) if msg.starts_with("HTTP ") => {
                TpotmonError::PublishRejected(msg)
            }
            other => other,
        })?;

        // An empty or non-JSON 2xx body counts as accepted.
        let reply: CollectorReply = serde_json::from_str(&body).unwrap_or_default();
        if !reply.success {
            return Err(TpotmonError::PublishRejected(
                reply
                    .message
                    .unwrap_or_else(|| "collector rejected the card".to_string()),
            ));
        }

        info!(url = %self.url, username = %card.username, "card published");
        Ok(PublishReceipt {
            location: self.url.clone(),
            id: reply.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Affinity, Loose, Rarity};
    use chrono::Utc;

    fn card(username: &str) -> Card {
        Card {
            name: "Poster".to_string(),
            username: username.to_string(),
            followers: 1,
            following: 2,
            is_blue_check: false,
            profile_pic: String::new(),
            profile_banner: String::new(),
            title: String::new(),
            weakness: Affinity::default(),
            resists: Affinity::default(),
            created_on: Utc::now(),
            rarity: Loose::Known(Rarity::Rare),
            hp: None,
            abilities: vec![],
            attacks: vec![],
        }
    }

    #[test]
    fn test_collector_reply_defaults_to_success() {
        let reply: CollectorReply = serde_json::from_str("{}").unwrap();
        assert!(reply.success);
        let reply: CollectorReply = serde_json::from_str(r#"{"success": false, "message": "dupe"}"#).unwrap();
        assert!(!reply.success);
        assert!(CollectorReply::default().success);
    }

    #[tokio::test]
    async fn test_file_publisher_creates_dir_and_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path().join("cards"));

        let receipt = publisher.publish(&card("poster")).await.unwrap();
        let path = dir.path().join("cards").join("poster.json");
        assert_eq!(receipt.location, path.display().to_string());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"username\": \"poster\""));
        let back: Card = serde_json::from_str(&content).unwrap();
        assert_eq!(back.rarity, Rarity::Rare);
    }

    #[tokio::test]
    async fn test_file_publisher_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path());
        publisher.publish(&card("poster")).await.unwrap();

        let mut second = card("poster");
        second.title = "Again".to_string();
        publisher.publish(&second).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("poster.json")).unwrap();
        assert!(content.contains("Again"));
    }

    #[tokio::test]
    async fn test_file_publisher_stays_inside_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("cards");
        let publisher = FilePublisher::new(&dir);

        let receipt = publisher.publish(&card("../escaped")).await.unwrap();
        assert_eq!(receipt.location, dir.join("card-data.json").display().to_string());
        assert!(dir.join("card-data.json").exists());
        assert!(!root.path().join("escaped.json").exists());
    }

    #[tokio::test]
    async fn test_named_publisher_uses_validated_username() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path()).named("@poster").unwrap();

        publisher.publish(&card("../escaped")).await.unwrap();
        assert!(dir.path().join("poster.json").exists());
        assert!(!dir.path().join("card-data.json").exists());

        assert!(matches!(
            FilePublisher::new(dir.path()).named("../escaped"),
            Err(TpotmonError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_remote_publisher_rejects_bad_url() {
        assert!(matches!(
            RemotePublisher::new("not a url", None, 5),
            Err(TpotmonError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_publisher_unreachable_is_error() {
        let publisher = RemotePublisher::new("http://127.0.0.1:9/cards", Some("t"), 2).unwrap();
        assert!(publisher.publish(&card("poster")).await.is_err());
    }
}
