//! Prompts for the studio models.

use super::types::Challenge;

/// System instruction for the writing game's teacher persona.
pub const TEACHER_SYSTEM_PROMPT: &str = r#"You are a helpful English teacher for young children (A1-A2 level).
Your task is to help them write a story using SIMPLE PAST TENSE.
The story must be about a specific animal.

STORY STEPS:
1. Habitat: Where did it live? (e.g., "The lion lived in the forest.")
2. Life: What did it do? (e.g., "He played with friends.")
3. Problem: What happened? (e.g., "One day, he lost his ball.")
4. Help: What did he do? (e.g., "He looked for his ball.")
5. Solution: How was it fixed? (e.g., "He found the ball under a tree.")
6. Ending: How did it end? (e.g., "He was very happy.")

CRITICAL RULES:
- Use only A1-A2 level English.
- ALWAYS ask for a FULL SENTENCE.
- ALWAYS ask for PAST TENSE (lived, was, went, played).
- DO NOT accept single words (e.g., "Forest" is WRONG).
- Provide feedback in simple English."#;

/// One narrative beat of the six-page story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryStep {
    pub kind: &'static str,
    pub goal: &'static str,
}

/// The fixed story arc, one step per level.
pub const STORY_STEPS: [StoryStep; 6] = [
    StoryStep {
        kind: "Habitat",
        goal: "Where did the animal live? Write a full sentence using 'lived' or 'was'.",
    },
    StoryStep {
        kind: "Daily Life",
        goal: "What did the animal do every day? Write a sentence in the past tense.",
    },
    StoryStep {
        kind: "The Problem",
        goal: "Oh no! A problem happened! Write a sentence about the problem in the past.",
    },
    StoryStep {
        kind: "Action",
        goal: "What did the animal do to solve the problem? Write a sentence about the plan.",
    },
    StoryStep {
        kind: "The Solution",
        goal: "Did it work? Write a sentence about how the animal fixed the problem.",
    },
    StoryStep {
        kind: "The Ending",
        goal: "The story is over! Write a final sentence about the animal being happy.",
    },
];

impl StoryStep {
    /// The step for a 1-based level, cycling every six levels.
    ///
    /// Level 0 is treated as level 1.
    pub fn for_level(level: usize) -> StoryStep {
        STORY_STEPS[level.saturating_sub(1) % STORY_STEPS.len()]
    }
}

pub fn challenge_prompt(level: usize, character: &str, title: &str) -> String {
    let step = StoryStep::for_level(level);
    format!(
        r#"Create a challenge for a kid writing a story about a {character} titled "{title}".
PHASE: {kind}
GOAL: {goal}

Return JSON with topic, stepDescription, and difficulty.
IMPORTANT: The stepDescription MUST tell them to use the past tense clearly."#,
        kind = step.kind,
        goal = step.goal,
    )
}

pub fn validation_prompt(challenge: &Challenge, sentence: &str) -> String {
    format!(
        r#"Task: "{topic}". User Input: "{sentence}".

VALIDATION RULES:
1. If input is 1 or 2 words (like "Forest" or "Blue lion"): isCorrect = FALSE. Feedback: "Please write a full sentence!"
2. If input is NOT in the past tense (no 'was', 'lived', 'found', '-ed'): isCorrect = FALSE. Feedback: "Use past tense (lived, was, etc.)!"
3. Otherwise: isCorrect = TRUE. Feedback: "Great job! Your story is moving!"

Return JSON {{ "isCorrect": boolean, "feedback": "string" }}"#,
        topic = challenge.topic,
    )
}

pub fn illustration_prompt(sentence: &str, style: &str, character: &str) -> String {
    format!(
        r#"Cute cartoon children's book illustration: "{sentence}". Hero: {character}. Style: {style}. Simple shapes, vibrant colors, magical, no text."#
    )
}

pub fn cover_prompt(title: &str, character: &str) -> String {
    format!(
        r#"Stunning children's book cover: "{title}". Hero: {character}. Colorful, magical, professional digital art, no letters or text."#
    )
}

pub fn game_idea_prompt(genre: &str, theme: &str, style: &str) -> String {
    format!("JSON game idea with genre: {genre}, theme: {theme}, style: {style}.")
}

pub fn character_profile_prompt(archetype: &str, traits: &str) -> String {
    format!("JSON character profile for archetype: {archetype} and traits: {traits}.")
}

pub fn world_lore_prompt(setting: &str, tone: &str) -> String {
    format!("JSON world lore for setting: {setting} and tone: {tone}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_for_each_level() {
        for level in 1..=6 {
            assert_eq!(StoryStep::for_level(level), STORY_STEPS[(level - 1) % 6]);
        }
        assert_eq!(StoryStep::for_level(1).kind, "Habitat");
        assert_eq!(StoryStep::for_level(6).kind, "The Ending");
    }

    #[test]
    fn test_step_cycles_and_level_zero() {
        assert_eq!(StoryStep::for_level(7).kind, "Habitat");
        assert_eq!(StoryStep::for_level(9).kind, "The Problem");
        assert_eq!(StoryStep::for_level(0).kind, "Habitat");
    }

    #[test]
    fn test_challenge_prompt_mentions_step() {
        let prompt = challenge_prompt(2, "Lion", "The Lion King");
        assert!(prompt.contains("about a Lion titled \"The Lion King\""));
        assert!(prompt.contains("PHASE: Daily Life"));
    }

    #[test]
    fn test_validation_prompt_embeds_input() {
        let challenge = Challenge {
            topic: "Home".to_string(),
            step_description: "Where did it live?".to_string(),
            difficulty: "easy".to_string(),
        };
        let prompt = validation_prompt(&challenge, "Forest");
        assert!(prompt.contains(r#"Task: "Home". User Input: "Forest"."#));
        assert!(prompt.contains(r#"{ "isCorrect": boolean"#));
    }
}
