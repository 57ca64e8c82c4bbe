//! Story Studio command line.
//!
//! Plays the "Story Climber" writing game in the terminal and runs the
//! one-shot generator panels.
//!
//! ```bash
//! cargo run -p story -- play --out books/
//! cargo run -p story -- character --archetype "Elven Mage" --portrait kael.png
//! ```

mod panels;
mod play;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use story_core::{GeminiStudio, StudioConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "story")]
#[command(about = "Children's story writing game and creative generators powered by Gemini")]
struct Args {
    /// Model for challenges and sentence checks
    #[arg(long, global = true)]
    text_model: Option<String>,

    /// Model for the generator panels
    #[arg(long, global = true)]
    reasoning_model: Option<String>,

    /// Model for covers, illustrations and portraits
    #[arg(long, global = true)]
    image_model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a six-page picture book, one sentence at a time
    Play {
        /// Directory the finished book is exported to
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Generate a video game concept
    Idea {
        #[arg(long)]
        genre: String,

        #[arg(long, default_value = "")]
        theme: String,

        #[arg(long, default_value = "")]
        style: String,
    },

    /// Generate a character profile and portrait
    Character {
        #[arg(long)]
        archetype: String,

        #[arg(long, default_value = "")]
        traits: String,

        /// Write the decoded portrait image to this file
        #[arg(long)]
        portrait: Option<PathBuf>,
    },

    /// Generate lore for a game region
    World {
        #[arg(long)]
        setting: String,

        #[arg(long, default_value = "")]
        tone: String,
    },
}

impl Args {
    fn studio_config(&self) -> StudioConfig {
        let mut config = StudioConfig::default();
        if let Some(model) = &self.text_model {
            config = config.with_text_model(model);
        }
        if let Some(model) = &self.reasoning_model {
            config = config.with_reasoning_model(model);
        }
        if let Some(model) = &self.image_model {
            config = config.with_image_model(model);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let studio = match GeminiStudio::from_env() {
        Ok(studio) => studio.with_config(args.studio_config()),
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Please set it in .env file or with: export GEMINI_API_KEY=your_key_here");
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Play { out } => play::run(&studio, &out).await,
        Command::Idea {
            genre,
            theme,
            style,
        } => panels::idea(&studio, &genre, &theme, &style).await,
        Command::Character {
            archetype,
            traits,
            portrait,
        } => {
            panels::character(&studio, &archetype, &traits, portrait.as_deref())
                .await
                .context("character generation failed")
        }
        Command::World { setting, tone } => panels::world(&studio, &setting, &tone).await,
    }
}
