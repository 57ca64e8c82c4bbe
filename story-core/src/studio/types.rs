//! Structured payloads exchanged with the model.

use crate::Schema;
use serde::{Deserialize, Serialize};

/// A per-level writing prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Short topic of this story step
    pub topic: String,
    /// Instruction for the child, asking for a past-tense sentence
    pub step_description: String,
    pub difficulty: String,
}

/// Outcome of validating one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResult {
    pub is_correct: bool,
    /// Feedback in simple English
    pub feedback: String,
}

impl ChallengeResult {
    pub fn correct(feedback: impl Into<String>) -> Self {
        Self {
            is_correct: true,
            feedback: feedback.into(),
        }
    }

    pub fn incorrect(feedback: impl Into<String>) -> Self {
        Self {
            is_correct: false,
            feedback: feedback.into(),
        }
    }
}

/// A generated game or story character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub name: String,
    pub role: String,
    pub backstory: String,
    pub stats: Stats,
}

/// Character attributes, each on a 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub strength: f32,
    pub agility: f32,
    pub intelligence: f32,
    pub charisma: f32,
}

impl Stats {
    pub const MAX: f32 = 10.0;

    /// Clamp every attribute into `[0, MAX]`; NaN becomes 0.
    pub fn clamped(self) -> Self {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, Self::MAX) };
        Self {
            strength: clamp(self.strength),
            agility: clamp(self.agility),
            intelligence: clamp(self.intelligence),
            charisma: clamp(self.charisma),
        }
    }
}

/// A pitched game concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct GameIdea {
    pub title: String,
    pub genre: String,
    pub platform: String,
    pub core_loop: String,
    pub unique_selling_point: String,
    pub story_synopsis: String,
}

/// Lore for one region of a fictional world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct WorldLore {
    pub region_name: String,
    pub climate: String,
    pub factions: Vec<String>,
    pub history: String,
    pub key_locations: Vec<String>,
}
