//! Line-driven "Story Climber" game.
//!
//! A simple line-oriented protocol:
//! - Plain lines answer the current phase (name, title, sentence)
//! - Numbers pick characters, covers and illustrations
//! - Lines starting with `#` are commands (next, prev, export, reset, status, help, quit)

use anyhow::Context;
use std::path::Path;
use story_core::game::{FALL_DURATION, MAX_LEVELS};
use story_core::{
    Animal, BookPageView, FeedbackKind, GameError, PhaseKind, SentenceOutcome, Studio, WritingGame,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
  #next        - Turn to the next page of the finished book
  #prev        - Turn to the previous page
  #export      - Save the finished book as HTML
  #reset       - Start over with a new story
  #status      - Show where you are
  #help        - Show this help
  #quit        - Exit the game";

/// Run the game on stdin/stdout until `#quit` or end of input.
pub async fn run<S: Studio + ?Sized>(studio: &S, out: &Path) -> anyhow::Result<()> {
    let mut game = WritingGame::new();

    println!("=== Story Climber ===");
    println!();
    println!("Commands:");
    println!("{HELP}");
    println!();
    prompt(&game);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading input")? {
        let line = line.trim();
        if line.is_empty() && game.phase_kind() != PhaseKind::Welcome {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            match command.trim().to_lowercase().as_str() {
                "quit" | "exit" => {
                    println!("Goodbye!");
                    break;
                }
                "next" => report(game.next_page().map(|_| show_page(&game))),
                "prev" => report(game.previous_page().map(|_| show_page(&game))),
                "export" => export(&game, out).await,
                "reset" => {
                    game.reset();
                    println!("[RESET] Let's write a new story!");
                    prompt(&game);
                }
                "status" => status(&game),
                "help" => {
                    println!("[HELP]");
                    println!("{HELP}");
                    println!("  (anything else answers the current question)");
                }
                _ => println!("[ERROR] Unknown command. Type #help for help."),
            }
            continue;
        }

        if let Err(e) = answer(studio, &mut game, line).await {
            println!("[ERROR] {e}");
        }
        prompt(&game);
    }

    Ok(())
}

/// Apply a plain input line to the current phase, loading whatever the next
/// phase needs.
async fn answer<S: Studio + ?Sized>(
    studio: &S,
    game: &mut WritingGame,
    line: &str,
) -> Result<(), GameError> {
    match game.phase_kind() {
        PhaseKind::EnterName => {
            game.submit_name(line)?;
            println!("{}", game.greeting());
        }
        PhaseKind::Welcome => game.start()?,
        PhaseKind::SelectCharacter => match parse_animal(line) {
            Some(animal) => game.choose_character(animal)?,
            None => println!("[ERROR] Pick a number from 1 to {}", Animal::ALL.len()),
        },
        PhaseKind::SelectTitle => {
            game.submit_title(line)?;
            println!("[PAINTING] Drawing two covers...");
            game.load_covers(studio).await?;
        }
        PhaseKind::SelectCover => {
            if game.covers().is_none() {
                println!("[PAINTING] Trying the covers again...");
                return game.load_covers(studio).await;
            }
            game.choose_cover(parse_choice(line)?)?;
            game.load_challenge(studio).await?;
        }
        PhaseKind::Writing => {
            if game.challenge().is_none() {
                return game.load_challenge(studio).await;
            }
            write_sentence(studio, game, line).await?;
        }
        PhaseKind::SelectImage => {
            game.choose_illustration(parse_choice(line)?)?;
            if game.phase_kind() == PhaseKind::Writing {
                println!("[CLIMB] Up you go! Level {} of {MAX_LEVELS}", game.current_level());
                game.load_challenge(studio).await?;
            } else {
                println!("[TOP] You reached the top! Your book is finished.");
            }
        }
        PhaseKind::BookView => {
            println!("Use #next and #prev to read, #export to save, #reset for a new story.");
        }
    }
    Ok(())
}

async fn write_sentence<S: Studio + ?Sized>(
    studio: &S,
    game: &mut WritingGame,
    sentence: &str,
) -> Result<(), GameError> {
    println!("[CHECKING]");
    match game.submit_sentence(studio, sentence).await? {
        SentenceOutcome::Accepted => {
            if let Some(feedback) = game.feedback() {
                println!("[GREAT] {}", feedback.text);
            }
        }
        SentenceOutcome::Rejected { feedback } => {
            println!("[OOPS] {feedback}");
            println!("[FALLING] ...");
            tokio::time::sleep(FALL_DURATION).await;
            game.clear_fall();
        }
    }
    Ok(())
}

/// Print what the current phase is waiting for.
fn prompt(game: &WritingGame) {
    if let Some(error) = game.status().error() {
        println!("[STATUS] {error}");
    }

    match game.phase_kind() {
        PhaseKind::EnterName => println!("What is your name?"),
        PhaseKind::Welcome => {
            println!("Welcome to Story Climber! Write a sentence to climb each level.");
            println!("Press enter to start.");
        }
        PhaseKind::SelectCharacter => {
            println!("Who is your hero?");
            for (i, animal) in Animal::ALL.iter().enumerate() {
                println!("  {}. {} {}", i + 1, animal.icon(), animal.name());
            }
        }
        PhaseKind::SelectTitle => println!("What is the title of your story?"),
        PhaseKind::SelectCover => match game.covers() {
            Some(covers) => {
                println!("Pick a cover:");
                for (i, cover) in covers.iter().enumerate() {
                    println!("  {}. {}", i + 1, summarize_image(cover));
                }
            }
            None => println!("No covers yet. Type anything to try again."),
        },
        PhaseKind::Writing => match game.challenge() {
            Some(challenge) => {
                println!();
                println!(
                    "[LEVEL {}/{MAX_LEVELS}] {}",
                    game.current_level(),
                    challenge.topic
                );
                println!("{}", challenge.step_description);
                if let Some(feedback) = game.feedback() {
                    if feedback.kind == FeedbackKind::Error {
                        println!("(Hint: {})", feedback.text);
                    }
                }
                println!("Write one sentence in the past tense:");
            }
            None => println!("No challenge yet. Type anything to try again."),
        },
        PhaseKind::SelectImage => {
            if let Some(options) = game.illustration_options() {
                println!("Pick a picture for your page:");
                for (i, image) in options.iter().enumerate() {
                    println!("  {}. {}", i + 1, summarize_image(image));
                }
            }
        }
        PhaseKind::BookView => show_page(game),
    }
}

fn show_page(game: &WritingGame) {
    let Some(view) = game.view_page() else {
        return;
    };
    match view {
        BookPageView::Cover {
            title,
            author,
            cover,
        } => {
            println!("[COVER] {title}");
            println!("By {author}");
            println!("{}", summarize_image(cover));
        }
        BookPageView::Story { number, page } => {
            println!("[PAGE {number}] {}", page.text);
            println!("{}", summarize_image(&page.image_url));
        }
        BookPageView::TheEnd => println!("[THE END] #export saves your book."),
    }
}

fn status(game: &WritingGame) {
    println!("[STATUS]");
    println!("  Phase: {}", game.phase_kind());
    if !game.student_name().is_empty() {
        println!("  Author: {}", game.student_name());
    }
    if let Some(character) = game.character() {
        println!("  Hero: {} {}", character.icon(), character);
    }
    if let Some(title) = game.title() {
        println!("  Title: {title}");
    }
    println!("  Level: {}/{MAX_LEVELS}", game.current_level());
    println!("  Pages: {}", game.pages().len());
    println!("  Request: {}", game.status());
}

async fn export(game: &WritingGame, out: &Path) {
    let exported = match game.export_book() {
        Ok(exported) => exported,
        Err(e) => {
            println!("[ERROR] {e}");
            return;
        }
    };
    let path = out.join(&exported.file_name);
    match tokio::fs::write(&path, exported.as_bytes()).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), pages = game.pages().len(), "book exported");
            println!("[SAVED] Book saved to {}", path.display());
        }
        Err(e) => println!("[ERROR] Export failed: {e}"),
    }
}

fn report<T>(result: Result<T, GameError>) {
    if let Err(e) = result {
        println!("[ERROR] {e}");
    }
}

/// `1`-based menu number or animal name.
fn parse_animal(input: &str) -> Option<Animal> {
    match input.parse::<usize>() {
        Ok(n) => n.checked_sub(1).and_then(|i| Animal::ALL.get(i).copied()),
        Err(_) => input.parse().ok(),
    }
}

/// `1`-based menu number to option index.
fn parse_choice(input: &str) -> Result<usize, GameError> {
    match input.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        Ok(n) => Err(GameError::NoSuchOption(n)),
        Err(_) => Err(GameError::EmptyInput("choice")),
    }
}

/// Images are data URIs far too long to print.
fn summarize_image(uri: &str) -> String {
    if uri.is_empty() {
        return "(no picture)".to_string();
    }
    match uri.split_once(',') {
        Some((header, payload)) if uri.starts_with("data:") => {
            format!("[{}, {} KB]", header, payload.len() * 3 / 4 / 1024)
        }
        _ => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_core::testing::TestHarness;

    #[test]
    fn test_parse_animal_by_number_or_name() {
        assert_eq!(parse_animal("1"), Some(Animal::Dolphin));
        assert_eq!(parse_animal("6"), Some(Animal::Shark));
        assert_eq!(parse_animal("lion"), Some(Animal::Lion));
        assert_eq!(parse_animal("0"), None);
        assert_eq!(parse_animal("7"), None);
        assert_eq!(parse_animal("unicorn"), None);
    }

    #[test]
    fn test_parse_choice_is_one_based() {
        assert_eq!(parse_choice("1").unwrap(), 0);
        assert_eq!(parse_choice("2").unwrap(), 1);
        assert!(matches!(parse_choice("0"), Err(GameError::NoSuchOption(0))));
        assert!(parse_choice("first").is_err());
    }

    #[test]
    fn test_summarize_image() {
        assert_eq!(summarize_image(""), "(no picture)");
        assert_eq!(summarize_image("cover-1"), "cover-1");
        assert_eq!(
            summarize_image("data:image/png;base64,AAAA"),
            "[data:image/png;base64, 0 KB]"
        );
    }

    #[tokio::test]
    async fn test_answers_drive_first_page() {
        let mut harness = TestHarness::new();
        let studio = &harness.studio;
        let game = &mut harness.game;

        answer(studio, game, "Mia").await.unwrap();
        answer(studio, game, "").await.unwrap();
        answer(studio, game, "3").await.unwrap();
        assert_eq!(game.character(), Some(Animal::Lion));

        studio.queue_images(["cover-1", "cover-2"]);
        answer(studio, game, "The Lion King").await.unwrap();
        assert_eq!(game.phase_kind(), PhaseKind::SelectCover);

        answer(studio, game, "2").await.unwrap();
        assert_eq!(game.cover(), Some("cover-2"));
        assert_eq!(game.challenge().unwrap().topic, "Habitat");

        studio.queue_validation(story_core::ChallengeResult::correct("Great!"));
        studio.queue_images(["img-1", "img-2"]);
        answer(studio, game, "The lion lived in a big forest.").await.unwrap();
        assert_eq!(game.phase_kind(), PhaseKind::SelectImage);

        answer(studio, game, "1").await.unwrap();
        assert_eq!(game.pages()[0].image_url, "img-1");
        assert_eq!(game.current_level(), 2);
        assert_eq!(game.challenge().unwrap().topic, "Daily Life");
    }
}
