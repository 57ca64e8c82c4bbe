//! Testing utilities for the studio.
//!
//! This module provides tools for integration testing:
//! - `MockStudio` for deterministic testing without API calls
//! - `TestHarness` for scripted play-throughs of the writing game
//! - Assertion helpers for verifying game state

use crate::animal::Animal;
use crate::game::{GameError, PhaseKind, SentenceOutcome, WritingGame};
use crate::studio::{
    Challenge, ChallengeResult, CharacterProfile, GameIdea, StoryStep, Studio, StudioError,
    WorldLore,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A studio that returns scripted answers.
///
/// Each operation pops from its own queue. An exhausted queue answers with
/// [`StudioError::EmptyResponse`], which is how tests script a failed
/// request. Images are shared by covers and illustrations.
#[derive(Default)]
pub struct MockStudio {
    state: Mutex<MockState>,
    default_challenges: bool,
}

#[derive(Default)]
struct MockState {
    challenges: VecDeque<Challenge>,
    validations: VecDeque<ChallengeResult>,
    images: VecDeque<String>,
    profiles: VecDeque<CharacterProfile>,
    ideas: VecDeque<GameIdea>,
    lore: VecDeque<WorldLore>,
    calls: MockCalls,
}

/// Everything the mock has been asked so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockCalls {
    pub challenge_levels: Vec<usize>,
    pub validations: usize,
    pub sentences: Vec<String>,
    pub cover_requests: usize,
    pub illustration_styles: Vec<String>,
    pub illustration_heroes: Vec<String>,
    pub profile_requests: usize,
    pub idea_requests: usize,
    pub lore_requests: usize,
}

impl MockStudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_challenges(self, challenges: impl IntoIterator<Item = Challenge>) -> Self {
        self.lock().challenges.extend(challenges);
        self
    }

    /// Answer challenge requests from the story step template when the
    /// queue is empty.
    pub fn with_default_challenges(mut self) -> Self {
        self.default_challenges = true;
        self
    }

    pub fn with_validations(self, results: impl IntoIterator<Item = ChallengeResult>) -> Self {
        self.lock().validations.extend(results);
        self
    }

    pub fn with_images<I, S>(self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().images.extend(images.into_iter().map(Into::into));
        self
    }

    pub fn with_profiles(self, profiles: impl IntoIterator<Item = CharacterProfile>) -> Self {
        self.lock().profiles.extend(profiles);
        self
    }

    pub fn with_ideas(self, ideas: impl IntoIterator<Item = GameIdea>) -> Self {
        self.lock().ideas.extend(ideas);
        self
    }

    pub fn with_lore(self, lore: impl IntoIterator<Item = WorldLore>) -> Self {
        self.lock().lore.extend(lore);
        self
    }

    /// Queue one more validation result.
    pub fn queue_validation(&self, result: ChallengeResult) {
        self.lock().validations.push_back(result);
    }

    /// Queue more images.
    pub fn queue_images<I, S>(&self, images: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().images.extend(images.into_iter().map(Into::into));
    }

    /// Snapshot of the calls made so far.
    pub fn calls(&self) -> MockCalls {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A challenge built straight from the story step template.
pub fn template_challenge(level: usize) -> Challenge {
    let step = StoryStep::for_level(level);
    Challenge {
        topic: step.kind.to_string(),
        step_description: step.goal.to_string(),
        difficulty: "A1".to_string(),
    }
}

#[async_trait]
impl Studio for MockStudio {
    async fn request_challenge(
        &self,
        level: usize,
        _character: &str,
        _title: &str,
    ) -> Result<Challenge, StudioError> {
        let mut state = self.lock();
        state.calls.challenge_levels.push(level);
        match state.challenges.pop_front() {
            Some(challenge) => Ok(challenge),
            None if self.default_challenges => Ok(template_challenge(level)),
            None => Err(StudioError::EmptyResponse),
        }
    }

    async fn validate_sentence(
        &self,
        _challenge: &Challenge,
        sentence: &str,
    ) -> Result<ChallengeResult, StudioError> {
        let mut state = self.lock();
        state.calls.validations += 1;
        state.calls.sentences.push(sentence.to_string());
        state.validations.pop_front().ok_or(StudioError::EmptyResponse)
    }

    async fn request_illustration(
        &self,
        _sentence: &str,
        style: &str,
        character: &str,
    ) -> Result<String, StudioError> {
        let mut state = self.lock();
        state.calls.illustration_styles.push(style.to_string());
        state.calls.illustration_heroes.push(character.to_string());
        state.images.pop_front().ok_or(StudioError::EmptyResponse)
    }

    async fn request_cover_illustration(
        &self,
        _title: &str,
        _character: &str,
    ) -> Result<String, StudioError> {
        let mut state = self.lock();
        state.calls.cover_requests += 1;
        state.images.pop_front().ok_or(StudioError::EmptyResponse)
    }

    async fn request_character_profile(
        &self,
        _archetype: &str,
        _traits: &str,
    ) -> Result<CharacterProfile, StudioError> {
        let mut state = self.lock();
        state.calls.profile_requests += 1;
        state.profiles.pop_front().ok_or(StudioError::EmptyResponse)
    }

    async fn request_game_idea(
        &self,
        _genre: &str,
        _theme: &str,
        _style: &str,
    ) -> Result<GameIdea, StudioError> {
        let mut state = self.lock();
        state.calls.idea_requests += 1;
        state.ideas.pop_front().ok_or(StudioError::EmptyResponse)
    }

    async fn request_world_lore(&self, _setting: &str, _tone: &str) -> Result<WorldLore, StudioError> {
        let mut state = self.lock();
        state.calls.lore_requests += 1;
        state.lore.pop_front().ok_or(StudioError::EmptyResponse)
    }
}

/// Test harness for scripted play-throughs.
pub struct TestHarness {
    /// The mock studio.
    pub studio: MockStudio,
    /// The game under test.
    pub game: WritingGame,
}

impl TestHarness {
    /// A fresh game with template challenges and no queued answers.
    pub fn new() -> Self {
        Self {
            studio: MockStudio::new().with_default_challenges(),
            game: WritingGame::new(),
        }
    }

    /// Play from `ENTER_NAME` to `WRITING` level 1 with the first cover picked.
    pub async fn start_book(
        &mut self,
        name: &str,
        character: Animal,
        title: &str,
    ) -> Result<(), GameError> {
        self.game.submit_name(name)?;
        self.game.start()?;
        self.game.choose_character(character)?;
        self.game.submit_title(title)?;
        self.studio.queue_images(["cover-1", "cover-2"]);
        self.game.load_covers(&self.studio).await?;
        self.game.choose_cover(0)?;
        self.game.load_challenge(&self.studio).await
    }

    /// Submit a sentence the studio will reject.
    pub async fn write_wrong(
        &mut self,
        sentence: &str,
        feedback: &str,
    ) -> Result<SentenceOutcome, GameError> {
        self.studio
            .queue_validation(ChallengeResult::incorrect(feedback));
        let outcome = self.game.submit_sentence(&self.studio, sentence).await;
        self.game.clear_fall();
        outcome
    }

    /// Write one page: accepted sentence, two illustrations, pick `choice`,
    /// then load the next challenge if the book isn't finished.
    pub async fn write_page(&mut self, sentence: &str, choice: usize) -> Result<(), GameError> {
        let level = self.game.current_level();
        self.studio
            .queue_validation(ChallengeResult::correct("Great job! Your story is moving!"));
        self.studio.queue_images([
            format!("page-{level}-image-1"),
            format!("page-{level}-image-2"),
        ]);
        self.game.submit_sentence(&self.studio, sentence).await?;
        self.game.choose_illustration(choice)?;
        if self.game.phase_kind() == PhaseKind::Writing {
            self.game.load_challenge(&self.studio).await?;
        }
        Ok(())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the game is in the given phase.
#[track_caller]
pub fn assert_phase(harness: &TestHarness, expected: PhaseKind) {
    let actual = harness.game.phase_kind();
    assert_eq!(actual, expected, "Expected phase {expected}, got {actual}");
}

/// Assert the `pages == level - 1` bookkeeping at the expected level.
#[track_caller]
pub fn assert_level(harness: &TestHarness, level: usize) {
    let actual = harness.game.current_level();
    assert_eq!(actual, level, "Expected level {level}, got {actual}");
    if matches!(
        harness.game.phase_kind(),
        PhaseKind::Writing | PhaseKind::SelectImage
    ) {
        assert_eq!(
            harness.game.pages().len(),
            level - 1,
            "Expected {} pages at level {level}",
            level - 1
        );
    }
}
