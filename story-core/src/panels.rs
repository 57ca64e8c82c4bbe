//! Stateless generator panels: idea generator, character designer, world builder.
//!
//! Each panel is a small request object that owns its load status and last
//! result. Missing required input is refused before any request is made.

use crate::status::LoadState;
use crate::studio::{CharacterProfile, GameIdea, Studio, StudioError, WorldLore};

/// Style hint for generated character portraits.
pub const PORTRAIT_STYLE: &str = "high quality digital art portrait";

/// How much backstory goes into the portrait prompt.
const PORTRAIT_BACKSTORY_CHARS: usize = 100;

/// Errors a panel reports back to its form.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("Please enter {0}")]
    MissingInput(&'static str),

    #[error(transparent)]
    Studio(#[from] StudioError),
}

/// Refuse blank required input before any request, reporting it through the
/// panel's status.
fn required(status: &mut LoadState, value: &str, what: &'static str) -> Result<(), PanelError> {
    if value.trim().is_empty() {
        let err = PanelError::MissingInput(what);
        *status = LoadState::Error(err.to_string());
        Err(err)
    } else {
        Ok(())
    }
}

/// Generates game concepts from a genre, theme and style.
#[derive(Debug, Default)]
pub struct IdeaGenerator {
    status: LoadState,
    idea: Option<GameIdea>,
}

impl IdeaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &LoadState {
        &self.status
    }

    pub fn idea(&self) -> Option<&GameIdea> {
        self.idea.as_ref()
    }

    /// Genre is required; theme and style may be blank.
    pub async fn generate<S: Studio + ?Sized>(
        &mut self,
        studio: &S,
        genre: &str,
        theme: &str,
        style: &str,
    ) -> Result<&GameIdea, PanelError> {
        required(&mut self.status, genre, "a genre")?;

        self.status = LoadState::Loading;
        match studio.request_game_idea(genre, theme, style).await {
            Ok(idea) => {
                self.status = LoadState::Success;
                Ok(self.idea.insert(idea))
            }
            Err(e) => {
                tracing::warn!(error = %e, "game idea failed");
                self.status = LoadState::Error(e.to_string());
                Err(e.into())
            }
        }
    }
}

/// Generates region lore from a setting and tone.
#[derive(Debug, Default)]
pub struct WorldBuilder {
    status: LoadState,
    lore: Option<WorldLore>,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &LoadState {
        &self.status
    }

    pub fn lore(&self) -> Option<&WorldLore> {
        self.lore.as_ref()
    }

    /// Setting is required; tone may be blank.
    pub async fn generate<S: Studio + ?Sized>(
        &mut self,
        studio: &S,
        setting: &str,
        tone: &str,
    ) -> Result<&WorldLore, PanelError> {
        required(&mut self.status, setting, "a setting")?;

        self.status = LoadState::Loading;
        match studio.request_world_lore(setting, tone).await {
            Ok(lore) => {
                self.status = LoadState::Success;
                Ok(self.lore.insert(lore))
            }
            Err(e) => {
                tracing::warn!(error = %e, "world lore failed");
                self.status = LoadState::Error(e.to_string());
                Err(e.into())
            }
        }
    }
}

/// A character profile with its optional portrait.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignedCharacter {
    pub profile: CharacterProfile,
    /// `data:` URI; empty until the portrait arrives or if the model sent none.
    pub portrait: String,
}

/// Generates a character profile, then a portrait for it.
///
/// The profile and the portrait have separate statuses: a failed portrait
/// keeps the profile.
#[derive(Debug, Default)]
pub struct CharacterDesigner {
    status: LoadState,
    image_status: LoadState,
    character: Option<DesignedCharacter>,
}

impl CharacterDesigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &LoadState {
        &self.status
    }

    pub fn image_status(&self) -> &LoadState {
        &self.image_status
    }

    pub fn character(&self) -> Option<&DesignedCharacter> {
        self.character.as_ref()
    }

    pub async fn generate<S: Studio + ?Sized>(
        &mut self,
        studio: &S,
        archetype: &str,
        traits: &str,
    ) -> Result<&DesignedCharacter, PanelError> {
        required(&mut self.status, archetype, "an archetype")?;

        self.status = LoadState::Loading;
        self.image_status = LoadState::Idle;
        self.character = None;

        let profile = match studio.request_character_profile(archetype, traits).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "character profile failed");
                self.status = LoadState::Error(e.to_string());
                return Err(e.into());
            }
        };
        self.status = LoadState::Success;

        self.image_status = LoadState::Loading;
        let description = portrait_description(&profile);
        let portrait = match studio
            .request_illustration(&description, PORTRAIT_STYLE, &profile.role)
            .await
        {
            Ok(portrait) => {
                self.image_status = LoadState::Success;
                portrait
            }
            Err(e) => {
                tracing::warn!(error = %e, "character portrait failed");
                self.image_status = LoadState::Error(e.to_string());
                String::new()
            }
        };

        Ok(self.character.insert(DesignedCharacter { profile, portrait }))
    }
}

/// `<name>, <role>, <first 100 characters of backstory>`.
pub fn portrait_description(profile: &CharacterProfile) -> String {
    let backstory: String = profile
        .backstory
        .chars()
        .take(PORTRAIT_BACKSTORY_CHARS)
        .collect();
    format!("{}, {}, {}", profile.name, profile.role, backstory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::Stats;
    use crate::testing::MockStudio;

    fn profile() -> CharacterProfile {
        CharacterProfile {
            name: "Kael".to_string(),
            role: "Elven Mage".to_string(),
            backstory: "x".repeat(150),
            stats: Stats {
                strength: 3.0,
                agility: 6.0,
                intelligence: 9.0,
                charisma: 5.0,
            },
        }
    }

    fn idea() -> GameIdea {
        GameIdea {
            title: "Tide Keepers".to_string(),
            genre: "Puzzle".to_string(),
            platform: "Switch".to_string(),
            core_loop: "Redirect currents".to_string(),
            unique_selling_point: "Water physics".to_string(),
            story_synopsis: "A lighthouse keeper...".to_string(),
        }
    }

    #[test]
    fn test_portrait_description_truncates_backstory() {
        let description = portrait_description(&profile());
        assert!(description.starts_with("Kael, Elven Mage, "));
        assert_eq!(description.len(), "Kael, Elven Mage, ".len() + 100);
    }

    #[tokio::test]
    async fn test_idea_requires_genre() {
        let studio = MockStudio::new().with_ideas([idea()]);
        let mut panel = IdeaGenerator::new();

        let err = panel.generate(&studio, " ", "space", "pixel").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a genre");
        assert!(panel.status().is_error());
        assert_eq!(studio.calls().idea_requests, 0);

        let generated = panel.generate(&studio, "Puzzle", "", "").await.unwrap();
        assert_eq!(generated.title, "Tide Keepers");
        assert_eq!(panel.status(), &LoadState::Success);
    }

    #[tokio::test]
    async fn test_world_builder_failure_keeps_status_scoped() {
        let studio = MockStudio::new();
        let mut world = WorldBuilder::new();
        let ideas = IdeaGenerator::new();

        assert!(world.generate(&studio, "Desert", "grim").await.is_err());
        assert!(world.status().is_error());
        assert!(world.lore().is_none());
        assert_eq!(ideas.status(), &LoadState::Idle);
    }

    #[tokio::test]
    async fn test_world_builder_blank_setting_makes_no_request() {
        let studio = MockStudio::new();
        let mut world = WorldBuilder::new();

        assert!(matches!(
            world.generate(&studio, "", "grim").await,
            Err(PanelError::MissingInput("a setting"))
        ));
        assert_eq!(world.status().error(), Some("Please enter a setting"));
        assert_eq!(studio.calls().lore_requests, 0);
    }

    #[tokio::test]
    async fn test_character_designer_blank_archetype_reports_error() {
        let studio = MockStudio::new().with_profiles([profile()]);
        let mut designer = CharacterDesigner::new();

        let err = designer.generate(&studio, "\t", "brave").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter an archetype");
        assert_eq!(designer.status().error(), Some("Please enter an archetype"));
        assert_eq!(designer.image_status(), &LoadState::Idle);
        assert_eq!(studio.calls().profile_requests, 0);
    }

    #[tokio::test]
    async fn test_character_designer_adds_portrait() {
        let studio = MockStudio::new()
            .with_profiles([profile()])
            .with_images(["data:image/png;base64,FACE"]);
        let mut designer = CharacterDesigner::new();

        let designed = designer.generate(&studio, "Elven Mage", "grumpy").await.unwrap();
        assert_eq!(designed.portrait, "data:image/png;base64,FACE");
        assert_eq!(designer.image_status(), &LoadState::Success);

        let calls = studio.calls();
        assert_eq!(calls.illustration_styles, vec![PORTRAIT_STYLE]);
        assert_eq!(calls.illustration_heroes, vec!["Elven Mage"]);
    }

    #[tokio::test]
    async fn test_character_designer_portrait_failure_keeps_profile() {
        let studio = MockStudio::new().with_profiles([profile()]);
        let mut designer = CharacterDesigner::new();

        let designed = designer.generate(&studio, "Elven Mage", "").await.unwrap();
        assert_eq!(designed.profile.name, "Kael");
        assert!(designed.portrait.is_empty());
        assert_eq!(designer.status(), &LoadState::Success);
        assert!(designer.image_status().is_error());
    }
}
