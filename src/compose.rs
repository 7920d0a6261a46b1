//! Card composition.
//!
//! Merges a fetched profile, its inlined images and flavor content into a
//! [`Card`]. Composition never validates; that is the validator's job.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::adapters::ProfileSource;
use crate::card::{Affinity, Card};
use crate::error::Result;
use crate::generator::{FlavorContent, FlavorGenerator, ProfileSummary, MAX_SUMMARY_TWEETS};
use crate::inline::ImageInliner;
use crate::profile::Profile;

/// The two inlined image fields. `None` means the fetch failed or no URL existed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlinedImages {
    pub profile_pic: Option<String>,
    pub profile_banner: Option<String>,
}

impl InlinedImages {
    /// Inline avatar then banner, one after the other.
    pub async fn fetch(inliner: &ImageInliner, profile: &Profile) -> Self {
        let profile_pic = inliner.inline_opt(profile.profile_image_url.as_deref()).await;
        let profile_banner = inliner.inline_opt(profile.banner_image_url.as_deref()).await;
        Self {
            profile_pic,
            profile_banner,
        }
    }
}

/// Build a card. Identity fields always come from the profile, even when the
/// flavor content carries its own.
pub fn compose_card(
    profile: &Profile,
    images: InlinedImages,
    flavor: FlavorContent,
    created_on: DateTime<Utc>,
) -> Card {
    Card {
        name: profile.name.clone(),
        username: profile.username.clone(),
        followers: profile.followers,
        following: profile.following,
        is_blue_check: profile.is_blue_check,
        profile_pic: images.profile_pic.unwrap_or_default(),
        profile_banner: images.profile_banner.unwrap_or_default(),
        title: flavor.title.unwrap_or_default(),
        weakness: flavor.weakness.unwrap_or_else(Affinity::default),
        resists: flavor.resists.unwrap_or_else(Affinity::default),
        created_on,
        rarity: flavor.rarity.unwrap_or_default(),
        hp: flavor.hp,
        abilities: flavor.abilities,
        attacks: flavor.attacks,
    }
}

/// Automated pipeline: fetch, inline, generate, compose.
pub struct CardComposer {
    source: Box<dyn ProfileSource>,
    inliner: ImageInliner,
    generator: Box<dyn FlavorGenerator>,
    max_tweets: usize,
}

impl CardComposer {
    pub fn new(
        source: Box<dyn ProfileSource>,
        inliner: ImageInliner,
        generator: Box<dyn FlavorGenerator>,
        max_tweets: usize,
    ) -> Self {
        Self {
            source,
            inliner,
            generator,
            max_tweets,
        }
    }

    /// Run the whole pipeline for one username. Any fetch or generation error
    /// is returned as-is; image failures only leave the image fields empty.
    pub async fn compose(&self, input: &str) -> Result<Card> {
        let username = self.source.parse_input(input)?;
        info!(platform = self.source.platform_id(), username = %username, "composing card");

        let fetched = self.source.fetch_profile(&username, self.max_tweets).await?;

        info!(username = %username, "inlining profile images");
        let images = InlinedImages::fetch(&self.inliner, &fetched.profile).await;

        let summary = ProfileSummary::from_profile(&fetched, MAX_SUMMARY_TWEETS);
        info!(username = %username, "generating flavor content");
        let flavor = self.generator.generate(&summary).await?;

        Ok(compose_card(&fetched.profile, images, flavor, Utc::now()))
    }

    /// Manual path: fetched profile plus author-supplied flavor, no generation call.
    pub async fn compose_manual(&self, input: &str, flavor: FlavorContent) -> Result<Card> {
        let username = self.source.parse_input(input)?;
        let profile = self.source.fetch_user(&username).await?;
        let images = InlinedImages::fetch(&self.inliner, &profile).await;
        Ok(compose_card(&profile, images, flavor, Utc::now()))
    }
}
