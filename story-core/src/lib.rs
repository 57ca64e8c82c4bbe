//! Story Studio engine.
//!
//! This crate provides:
//! - The "Story Climber" children's writing game as a typed state machine
//! - A generative-AI gateway (`Studio`) backed by Gemini
//! - Self-contained HTML export of the finished picture book
//! - Idea, character and world generator panels
//!
//! # Quick Start
//!
//! ```ignore
//! use story_core::{Animal, GeminiStudio, WritingGame};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let studio = GeminiStudio::from_env()?;
//!     let mut game = WritingGame::new();
//!
//!     game.submit_name("Mia")?;
//!     game.start()?;
//!     game.choose_character(Animal::Lion)?;
//!     game.submit_title("The Lion King")?;
//!     game.load_covers(&studio).await?;
//!     game.choose_cover(0)?;
//!     game.load_challenge(&studio).await?;
//!
//!     game.submit_sentence(&studio, "The lion lived in a big forest.").await?;
//!     Ok(())
//! }
//! ```

// Lets `#[derive(Schema)]` name `::story_core` from inside this crate too.
extern crate self as story_core;

pub mod animal;
pub mod book;
pub mod game;
pub mod panels;
pub mod schema;
pub mod status;
pub mod studio;
pub mod testing;

pub use story_macros::Schema;

// Primary public API
pub use animal::Animal;
pub use book::{export_book, Book, ExportedBook, Page};
pub use game::{BookPageView, Feedback, FeedbackKind, GameError, Phase, PhaseKind, SentenceOutcome, WritingGame};
pub use panels::{CharacterDesigner, DesignedCharacter, IdeaGenerator, PanelError, WorldBuilder};
pub use schema::ResponseSchema;
pub use status::LoadState;
pub use studio::{
    Challenge, ChallengeResult, CharacterProfile, GameIdea, GeminiStudio, Stats, StoryStep, Studio,
    StudioConfig, StudioError, WorldLore,
};
pub use testing::{MockStudio, TestHarness};
