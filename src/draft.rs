//! Card authoring draft.
//!
//! A [`CardDraft`] is the editable form state behind a card: `hp` and `rarity`
//! are kept as free text until export. [`DraftStore`] persists the draft as JSON
//! after every change and recovers from a missing or corrupt file with a
//! blank draft.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::card::{file_name_for, Ability, Affinity, Attack, Card, Loose, Rarity, MAX_MOVES};
use crate::error::{Result, TpotmonError};
use crate::server::ProfileResponse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDraft {
    pub name: String,
    pub username: String,
    pub followers: u64,
    pub following: u64,
    pub is_blue_check: bool,
    pub profile_pic: String,
    pub profile_banner: String,
    pub title: String,
    pub weakness: Affinity,
    pub resists: Affinity,
    pub created_on: DateTime<Utc>,
    pub rarity: String,
    pub hp: String,
    pub abilities: Vec<Ability>,
    pub attacks: Vec<Attack>,
}

impl Default for CardDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            username: String::new(),
            followers: 0,
            following: 0,
            is_blue_check: false,
            profile_pic: String::new(),
            profile_banner: String::new(),
            title: String::new(),
            weakness: Affinity::default(),
            resists: Affinity::default(),
            created_on: Utc::now(),
            rarity: Rarity::default().to_string(),
            hp: String::new(),
            abilities: vec![Ability::default()],
            attacks: vec![Attack::default()],
        }
    }
}

impl CardDraft {
    /// Append a blank ability. Does nothing once the draft holds the maximum.
    pub fn add_ability(&mut self) {
        if self.abilities.len() < MAX_MOVES {
            self.abilities.push(Ability::default());
        }
    }

    pub fn add_attack(&mut self) {
        if self.attacks.len() < MAX_MOVES {
            self.attacks.push(Attack::default());
        }
    }

    pub fn remove_last_ability(&mut self) {
        self.abilities.pop();
    }

    pub fn remove_last_attack(&mut self) {
        self.attacks.pop();
    }

    /// Fill identity and image fields from a profile endpoint response.
    /// Images that could not be inlined become empty strings.
    pub fn apply_profile(&mut self, profile: &ProfileResponse) {
        self.name = profile.name.clone();
        self.username = profile.username.clone();
        self.followers = profile.followers;
        self.following = profile.following;
        self.is_blue_check = profile.is_blue_check;
        self.profile_pic = profile.profile_pic.clone().unwrap_or_default();
        self.profile_banner = profile.profile_banner.clone().unwrap_or_default();
    }

    pub fn to_card(&self) -> Result<Card> {
        let hp = match self.hp.trim() {
            "" => None,
            text => Some(text.parse::<u32>().map_err(|_| {
                TpotmonError::ValidationError(format!("hp must be a whole number, got '{}'", text))
            })?),
        };

        let rarity = match self.rarity.trim() {
            "" => {
                return Err(TpotmonError::ValidationError("rarity is required".to_string()));
            }
            text => Rarity::from_str(text)
                .map_err(|_| TpotmonError::ValidationError(format!("unknown rarity '{}'", text)))?,
        };

        Ok(Card {
            name: self.name.clone(),
            username: self.username.clone(),
            followers: self.followers,
            following: self.following,
            is_blue_check: self.is_blue_check,
            profile_pic: self.profile_pic.clone(),
            profile_banner: self.profile_banner.clone(),
            title: self.title.clone(),
            weakness: self.weakness.clone(),
            resists: self.resists.clone(),
            created_on: self.created_on,
            rarity: Loose::Known(rarity),
            hp: hp.map(Loose::Known),
            abilities: self.abilities.clone(),
            attacks: self.attacks.clone(),
        })
    }

    pub fn export_json(&self) -> Result<String> {
        self.to_card()?.to_pretty_json()
    }

    pub fn download_file_name(&self) -> String {
        file_name_for(&self.username)
    }
}

/// A draft bound to the file it is saved in.
pub struct DraftStore {
    path: PathBuf,
    draft: CardDraft,
}

impl DraftStore {
    /// Load the draft at `path`. A missing or unreadable file yields a blank draft.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let draft = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<CardDraft>(&content) {
                Ok(draft) => draft,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "discarding corrupt draft");
                    CardDraft::default()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no saved draft");
                CardDraft::default()
            }
        };
        Self { path, draft }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn draft(&self) -> &CardDraft {
        &self.draft
    }

    /// Apply a change and save.
    pub fn update<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut CardDraft),
    {
        change(&mut self.draft);
        self.save()
    }

    pub fn replace(&mut self, draft: CardDraft) -> Result<()> {
        self.draft = draft;
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.draft)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
