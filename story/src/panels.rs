//! One-shot generator subcommands.

use anyhow::{bail, Context};
use base64::Engine;
use std::path::Path;
use story_core::{CharacterDesigner, IdeaGenerator, Studio, WorldBuilder};

pub async fn idea<S: Studio + ?Sized>(
    studio: &S,
    genre: &str,
    theme: &str,
    style: &str,
) -> anyhow::Result<()> {
    let mut panel = IdeaGenerator::new();
    let idea = panel.generate(studio, genre, theme, style).await?;

    println!("=== {} ===", idea.title);
    println!("Genre: {}", idea.genre);
    println!("Platform: {}", idea.platform);
    println!();
    println!("Core loop: {}", idea.core_loop);
    println!("Unique selling point: {}", idea.unique_selling_point);
    println!();
    println!("{}", idea.story_synopsis);
    Ok(())
}

pub async fn character<S: Studio + ?Sized>(
    studio: &S,
    archetype: &str,
    traits: &str,
    portrait_path: Option<&Path>,
) -> anyhow::Result<()> {
    let mut designer = CharacterDesigner::new();
    let character = designer.generate(studio, archetype, traits).await?.clone();
    let profile = &character.profile;

    println!("=== {} ===", profile.name);
    println!("Role: {}", profile.role);
    println!();
    println!("{}", profile.backstory);
    println!();
    println!("[STATS]");
    for (label, value) in [
        ("Strength", profile.stats.strength),
        ("Agility", profile.stats.agility),
        ("Intelligence", profile.stats.intelligence),
        ("Charisma", profile.stats.charisma),
    ] {
        println!("  {label:<13}{value:>4.1} {}", bar(value));
    }

    if let Some(error) = designer.image_status().error() {
        println!("[PORTRAIT] failed: {error}");
        return Ok(());
    }

    let portrait = &character.portrait;
    if portrait.is_empty() {
        println!("[PORTRAIT] the model returned no image");
        return Ok(());
    }
    match portrait_path {
        Some(path) => {
            let bytes = decode_data_uri(portrait)?;
            tokio::fs::write(path, bytes)
                .await
                .with_context(|| format!("writing portrait to {}", path.display()))?;
            println!("[PORTRAIT] saved to {}", path.display());
        }
        None => println!("[PORTRAIT] ready (use --portrait FILE to save it)"),
    }
    Ok(())
}

pub async fn world<S: Studio + ?Sized>(studio: &S, setting: &str, tone: &str) -> anyhow::Result<()> {
    let mut builder = WorldBuilder::new();
    let lore = builder.generate(studio, setting, tone).await?;

    println!("=== {} ===", lore.region_name);
    println!("Climate: {}", lore.climate);
    println!();
    println!("{}", lore.history);
    println!();
    println!("Factions:");
    for faction in &lore.factions {
        println!("  - {faction}");
    }
    println!("Key locations:");
    for location in &lore.key_locations {
        println!("  - {location}");
    }
    Ok(())
}

fn bar(value: f32) -> String {
    "#".repeat(value.round() as usize)
}

/// Bytes of a base64 `data:` URI.
fn decode_data_uri(uri: &str) -> anyhow::Result<Vec<u8>> {
    let Some((header, payload)) = uri.split_once(',') else {
        bail!("portrait is not a data URI");
    };
    if !header.ends_with(";base64") {
        bail!("portrait data URI is not base64 encoded");
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .context("decoding portrait")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use story_core::{CharacterProfile, MockStudio, Stats};

    fn profile() -> CharacterProfile {
        CharacterProfile {
            name: "Kael".to_string(),
            role: "Elven Mage".to_string(),
            backstory: "Raised by owls in the northern woods.".to_string(),
            stats: Stats {
                strength: 3.0,
                agility: 6.0,
                intelligence: 9.0,
                charisma: 5.0,
            },
        }
    }

    fn portrait_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("story-{}-{name}.png", std::process::id()))
    }

    #[tokio::test]
    async fn test_character_writes_decoded_portrait() {
        let studio = MockStudio::new()
            .with_profiles([profile()])
            .with_images(["data:image/png;base64,aGVsbG8="]);
        let path = portrait_path("saved");

        character(&studio, "Elven Mage", "grumpy", Some(&path))
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello");
        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_character_portrait_failure_is_not_fatal() {
        let studio = MockStudio::new().with_profiles([profile()]);
        let path = portrait_path("failed");

        character(&studio, "Elven Mage", "", Some(&path))
            .await
            .unwrap();

        assert!(!path.exists());
        assert_eq!(studio.calls().illustration_styles.len(), 1);
    }

    #[tokio::test]
    async fn test_character_without_image_data_writes_nothing() {
        let studio = MockStudio::new()
            .with_profiles([profile()])
            .with_images([""]);
        let path = portrait_path("empty");

        character(&studio, "Elven Mage", "", Some(&path))
            .await
            .unwrap();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_character_requires_archetype() {
        let studio = MockStudio::new().with_profiles([profile()]);

        let err = character(&studio, "  ", "", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter an archetype");
        assert_eq!(studio.calls().profile_requests, 0);
    }

    #[tokio::test]
    async fn test_idea_and_world_print_results() {
        let studio = MockStudio::new()
            .with_ideas([story_core::GameIdea {
                title: "Tide Keepers".to_string(),
                genre: "Puzzle".to_string(),
                platform: "Switch".to_string(),
                core_loop: "Redirect currents".to_string(),
                unique_selling_point: "Water physics".to_string(),
                story_synopsis: "A lighthouse keeper...".to_string(),
            }])
            .with_lore([story_core::WorldLore {
                region_name: "Ashfall".to_string(),
                climate: "Volcanic".to_string(),
                factions: vec!["Ember Guild".to_string()],
                history: "The mountain woke.".to_string(),
                key_locations: vec!["Cinder Gate".to_string()],
            }]);

        idea(&studio, "Puzzle", "ocean", "").await.unwrap();
        world(&studio, "Volcano", "grim").await.unwrap();
        assert!(world(&studio, "", "grim").await.is_err());
        assert_eq!(studio.calls().lore_requests, 1);
    }

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_rejects_plain_url() {
        assert!(decode_data_uri("https://example.com/cat.png").is_err());
        assert!(decode_data_uri("data:image/svg+xml,<svg/>").is_err());
    }

    #[test]
    fn test_stat_bar_length() {
        assert_eq!(bar(0.0), "");
        assert_eq!(bar(7.4), "#######");
        assert_eq!(bar(10.0).len(), 10);
    }
}
