//! Gemini-backed studio.

use super::prompts;
use super::types::{Challenge, ChallengeResult, CharacterProfile, GameIdea, WorldLore};
use super::{parse_structured, Studio, StudioError};
use crate::schema::ResponseSchema;
use async_trait::async_trait;
use ::gemini::{Gemini, Request, Response};
use serde::de::DeserializeOwned;

/// Model routing and generation settings.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Fast model for challenges and sentence validation.
    pub text_model: String,

    /// Stronger model for the generator panels.
    pub reasoning_model: String,

    /// Image-capable model for covers, illustrations and portraits.
    pub image_model: String,

    /// Temperature for structured generation.
    pub temperature: Option<f32>,

    /// Override for the API root.
    pub base_url: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            text_model: "gemini-3-flash-preview".to_string(),
            reasoning_model: "gemini-3-pro-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            temperature: None,
            base_url: None,
        }
    }
}

impl StudioConfig {
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_reasoning_model(mut self, model: impl Into<String>) -> Self {
        self.reasoning_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// The production [`Studio`].
#[derive(Clone)]
pub struct GeminiStudio {
    client: Gemini,
    config: StudioConfig,
}

impl GeminiStudio {
    /// Create a studio with an API key and default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Gemini::new(api_key),
            config: StudioConfig::default(),
        }
    }

    /// Create a studio from `GEMINI_API_KEY` (or `API_KEY`).
    pub fn from_env() -> Result<Self, StudioError> {
        Ok(Self {
            client: Gemini::from_env()?,
            config: StudioConfig::default(),
        })
    }

    /// Configure models and generation settings.
    pub fn with_config(mut self, config: StudioConfig) -> Self {
        if let Some(base_url) = &config.base_url {
            self.client = self.client.with_base_url(base_url.clone());
        }
        self.config = config;
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    async fn structured<T>(&self, model: &str, system: Option<&str>, prompt: String) -> Result<T, StudioError>
    where
        T: ResponseSchema + DeserializeOwned,
    {
        let mut request = Request::prompt(prompt)
            .with_model(model)
            .with_response_schema(T::response_schema());
        if let Some(system) = system {
            request = request.with_system(system);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        let response = self.client.generate(request).await.inspect_err(|e| {
            tracing::warn!(model, error = %e, "structured request failed");
        })?;

        parse_structured(&response.text()).inspect_err(|e| {
            tracing::warn!(model, error = %e, "unusable structured response");
        })
    }

    async fn image(&self, prompt: String) -> Result<String, StudioError> {
        let model = &self.config.image_model;
        let response = self
            .client
            .generate(Request::prompt(prompt).with_model(model))
            .await
            .inspect_err(|e| tracing::warn!(model = %model, error = %e, "image request failed"))?;

        Ok(image_uri(&response))
    }
}

/// The first image as a `data:` URI, or an empty string when the model sent none.
fn image_uri(response: &Response) -> String {
    match response.first_image() {
        Some(image) => image.to_data_uri(),
        None => {
            tracing::warn!(
                model = %response.model,
                finish_reason = ?response.finish_reason,
                "response carried no image data"
            );
            String::new()
        }
    }
}

#[async_trait]
impl Studio for GeminiStudio {
    async fn request_challenge(
        &self,
        level: usize,
        character: &str,
        title: &str,
    ) -> Result<Challenge, StudioError> {
        tracing::debug!(level, character, "requesting challenge");
        self.structured(
            &self.config.text_model,
            Some(prompts::TEACHER_SYSTEM_PROMPT),
            prompts::challenge_prompt(level, character, title),
        )
        .await
    }

    async fn validate_sentence(
        &self,
        challenge: &Challenge,
        sentence: &str,
    ) -> Result<ChallengeResult, StudioError> {
        tracing::debug!(topic = %challenge.topic, "validating sentence");
        self.structured(
            &self.config.text_model,
            None,
            prompts::validation_prompt(challenge, sentence),
        )
        .await
    }

    async fn request_illustration(
        &self,
        sentence: &str,
        style: &str,
        character: &str,
    ) -> Result<String, StudioError> {
        self.image(prompts::illustration_prompt(sentence, style, character))
            .await
    }

    async fn request_cover_illustration(
        &self,
        title: &str,
        character: &str,
    ) -> Result<String, StudioError> {
        self.image(prompts::cover_prompt(title, character)).await
    }

    async fn request_character_profile(
        &self,
        archetype: &str,
        traits: &str,
    ) -> Result<CharacterProfile, StudioError> {
        let mut profile: CharacterProfile = self
            .structured(
                &self.config.reasoning_model,
                None,
                prompts::character_profile_prompt(archetype, traits),
            )
            .await?;
        profile.stats = profile.stats.clamped();
        Ok(profile)
    }

    async fn request_game_idea(
        &self,
        genre: &str,
        theme: &str,
        style: &str,
    ) -> Result<GameIdea, StudioError> {
        self.structured(
            &self.config.reasoning_model,
            None,
            prompts::game_idea_prompt(genre, theme, style),
        )
        .await
    }

    async fn request_world_lore(&self, setting: &str, tone: &str) -> Result<WorldLore, StudioError> {
        self.structured(
            &self.config.reasoning_model,
            None,
            prompts::world_lore_prompt(setting, tone),
        )
        .await
    }
}
