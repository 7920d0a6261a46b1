//! Card record types.
//!
//! A card is the exported JSON artifact: identity copied from the fetched
//! profile, two inlined images, and hand-written or generated flavor content.
//! Field names follow the camelCase wire format of the card files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString, VariantNames};

/// Maximum number of abilities or attacks a valid card may carry.
pub const MAX_MOVES: usize = 2;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
pub enum AttackType {
    #[default]
    None,
    Goon,
    Thirst,
    Gaslight,
    Roast,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
pub enum AbilityType {
    #[serde(rename = "One-Time")]
    #[strum(serialize = "One-Time")]
    OneTime,
    #[default]
    Passive,
    Active,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
pub enum AttackChance {
    #[default]
    Direct,
    #[serde(rename = "Dice Roll")]
    #[strum(serialize = "Dice Roll")]
    DiceRoll,
    #[serde(rename = "Coin Flip")]
    #[strum(serialize = "Coin Flip")]
    CoinFlip,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// A typed value, or whatever JSON arrived in its place.
///
/// Generated content is kept as-is until validation, so an out-of-set enum
/// value or a fractional number lands in `Raw` instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loose<T> {
    Known(T),
    Raw(Value),
}

impl<T> Loose<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Loose::Known(v) => Some(v),
            Loose::Raw(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Loose::Known(_))
    }
}

impl<T: Default> Default for Loose<T> {
    fn default() -> Self {
        Loose::Known(T::default())
    }
}

impl<T> From<T> for Loose<T> {
    fn from(value: T) -> Self {
        Loose::Known(value)
    }
}

impl<T: PartialEq> PartialEq<T> for Loose<T> {
    fn eq(&self, other: &T) -> bool {
        self.known() == Some(other)
    }
}

/// Weakness or resistance against one attack type. `amount` is 0-100.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Affinity {
    #[serde(default)]
    pub amount: Loose<u32>,
    #[serde(rename = "type", default)]
    pub kind: Loose<AttackType>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ability {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Loose<AbilityType>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attack {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Loose<AttackType>,
    #[serde(default)]
    pub damage: Loose<u32>,
    #[serde(default)]
    pub chance: Loose<AttackChance>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub name: String,
    pub username: String,
    pub followers: u64,
    pub following: u64,
    pub is_blue_check: bool,
    /// `data:` URI, or empty when the image could not be inlined.
    pub profile_pic: String,
    /// `data:` URI, or empty when the image could not be inlined.
    pub profile_banner: String,
    pub title: String,
    pub weakness: Affinity,
    pub resists: Affinity,
    pub created_on: DateTime<Utc>,
    pub rarity: Loose<Rarity>,
    // Always serialized; `null` is meaningful.
    pub hp: Option<Loose<u32>>,
    pub abilities: Vec<Ability>,
    pub attacks: Vec<Attack>,
}

impl Card {
    /// File name the card is exported under.
    pub fn file_name(&self) -> String {
        file_name_for(&self.username)
    }

    pub fn to_pretty_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub const FALLBACK_FILE_NAME: &str = "card-data.json";

/// Whether `stem` can be used as a card file stem: ASCII letters, digits and
/// `_` only, so it can never name a path outside the cards directory.
pub fn is_safe_file_stem(stem: &str) -> bool {
    !stem.is_empty() && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn file_name_for(username: &str) -> String {
    let username = username.trim();
    if is_safe_file_stem(username) {
        format!("{}.json", username)
    } else {
        FALLBACK_FILE_NAME.to_string()
    }
}
