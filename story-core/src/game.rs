//! The "Story Climber" writing game.
//!
//! A learner enters their name, picks an animal hero, names the story and
//! picks one of two generated covers. Then, one level per narrative beat,
//! they write a past-tense sentence, have it judged by the studio, and pick
//! one of two illustrations for it. After the sixth page the finished book
//! can be browsed and exported.
//!
//! Each [`Phase`] variant carries exactly the data that phase needs, so a
//! cover can't exist before a title, and the current level is derived from
//! the number of pages already written.

use crate::animal::Animal;
use crate::book::{export_book, Book, ExportedBook, Page};
use crate::status::LoadState;
use crate::studio::{Challenge, Studio, StudioError};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Number of levels (and story pages) in a book.
pub const MAX_LEVELS: usize = 6;

/// How long the climber "falls" after a rejected sentence.
pub const FALL_DURATION: Duration = Duration::from_millis(800);

/// Art styles of the two illustration options offered per page.
pub const ILLUSTRATION_STYLES: [&str; 2] = ["colorful cartoon", "bright watercolor"];

const ACCEPTED_FEEDBACK: &str = "Super! Now pick a picture.";

/// Errors from game transitions.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("cannot {action} during {phase}")]
    InvalidAction {
        action: &'static str,
        phase: PhaseKind,
    },

    #[error("no challenge is loaded for this level")]
    NoChallenge,

    #[error("wait for the climber to get back up")]
    StillFalling,

    #[error("there is no option {0}")]
    NoSuchOption(usize),

    #[error("studio request failed: {0}")]
    Studio(#[from] StudioError),
}

/// Flat name of each phase, for display and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    EnterName,
    Welcome,
    SelectCharacter,
    SelectTitle,
    SelectCover,
    Writing,
    SelectImage,
    BookView,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::EnterName => "ENTER_NAME",
            PhaseKind::Welcome => "WELCOME",
            PhaseKind::SelectCharacter => "SELECT_CHAR",
            PhaseKind::SelectTitle => "SELECT_TITLE",
            PhaseKind::SelectCover => "SELECT_COVER",
            PhaseKind::Writing => "WRITING",
            PhaseKind::SelectImage => "SELECT_IMAGE",
            PhaseKind::BookView => "BOOK_VIEW",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// Inline message shown under the sentence box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
    pub kind: FeedbackKind,
}

impl Feedback {
    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FeedbackKind::Success,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FeedbackKind::Error,
        }
    }
}

/// A book being written: everything chosen so far plus finished pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub character: Animal,
    pub title: String,
    pub cover: String,
    pub pages: Vec<Page>,
}

impl Draft {
    /// The 1-based level currently being written.
    pub fn level(&self) -> usize {
        self.pages.len() + 1
    }
}

/// State of the `WRITING` phase for one level.
#[derive(Debug, Clone)]
pub struct Writing {
    pub draft: Draft,
    pub challenge: Option<Challenge>,
    pub feedback: Option<Feedback>,
    fell_at: Option<Instant>,
}

impl Writing {
    fn new(draft: Draft) -> Self {
        Self {
            draft,
            challenge: None,
            feedback: None,
            fell_at: None,
        }
    }

    /// Whether the fall animation is still running at `now`.
    pub fn is_falling_at(&self, now: Instant) -> bool {
        self.fell_at
            .is_some_and(|fell_at| now.saturating_duration_since(fell_at) < FALL_DURATION)
    }
}

/// Where the game is, with the data that phase owns.
#[derive(Debug, Clone)]
pub enum Phase {
    EnterName,
    Welcome,
    SelectCharacter,
    SelectTitle {
        character: Animal,
    },
    SelectCover {
        character: Animal,
        title: String,
        covers: Option<[String; 2]>,
    },
    Writing(Writing),
    SelectImage {
        draft: Draft,
        sentence: String,
        options: [String; 2],
        feedback: Feedback,
    },
    BookView {
        book: Book,
        view_page: usize,
    },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::EnterName => PhaseKind::EnterName,
            Phase::Welcome => PhaseKind::Welcome,
            Phase::SelectCharacter => PhaseKind::SelectCharacter,
            Phase::SelectTitle { .. } => PhaseKind::SelectTitle,
            Phase::SelectCover { .. } => PhaseKind::SelectCover,
            Phase::Writing(_) => PhaseKind::Writing,
            Phase::SelectImage { .. } => PhaseKind::SelectImage,
            Phase::BookView { .. } => PhaseKind::BookView,
        }
    }
}

/// What the book viewer is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookPageView<'a> {
    Cover {
        title: &'a str,
        author: &'a str,
        cover: &'a str,
    },
    Story {
        number: usize,
        page: &'a Page,
    },
    TheEnd,
}

/// Result of submitting a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceOutcome {
    /// Judged correct; two illustrations are ready in `SELECT_IMAGE`.
    Accepted,
    /// Judged incorrect; still in `WRITING` with this feedback.
    Rejected { feedback: String },
}

/// One play-through of the writing game.
#[derive(Debug, Clone)]
pub struct WritingGame {
    student_name: String,
    phase: Phase,
    status: LoadState,
}

impl Default for WritingGame {
    fn default() -> Self {
        Self::new()
    }
}

impl WritingGame {
    pub fn new() -> Self {
        Self {
            student_name: String::new(),
            phase: Phase::EnterName,
            status: LoadState::Idle,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Status of the last studio request made by the game.
    pub fn status(&self) -> &LoadState {
        &self.status
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    /// The welcome line, e.g. `Hi, Mia!`.
    pub fn greeting(&self) -> String {
        format!("Hi, {}!", self.student_name)
    }

    /// The current level, always in `[1, MAX_LEVELS]`.
    pub fn current_level(&self) -> usize {
        match &self.phase {
            Phase::Writing(writing) => writing.draft.level(),
            Phase::SelectImage { draft, .. } => draft.level(),
            Phase::BookView { .. } => MAX_LEVELS,
            _ => 1,
        }
    }

    pub fn pages(&self) -> &[Page] {
        match &self.phase {
            Phase::Writing(writing) => &writing.draft.pages,
            Phase::SelectImage { draft, .. } => &draft.pages,
            Phase::BookView { book, .. } => &book.pages,
            _ => &[],
        }
    }

    pub fn character(&self) -> Option<Animal> {
        match &self.phase {
            Phase::SelectTitle { character } | Phase::SelectCover { character, .. } => {
                Some(*character)
            }
            Phase::Writing(writing) => Some(writing.draft.character),
            Phase::SelectImage { draft, .. } => Some(draft.character),
            Phase::BookView { book, .. } => Some(book.character),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.phase {
            Phase::SelectCover { title, .. } => Some(title),
            Phase::Writing(writing) => Some(&writing.draft.title),
            Phase::SelectImage { draft, .. } => Some(&draft.title),
            Phase::BookView { book, .. } => Some(&book.title),
            _ => None,
        }
    }

    pub fn cover(&self) -> Option<&str> {
        match &self.phase {
            Phase::Writing(writing) => Some(&writing.draft.cover),
            Phase::SelectImage { draft, .. } => Some(&draft.cover),
            Phase::BookView { book, .. } => Some(&book.cover),
            _ => None,
        }
    }

    /// The two generated covers, once loaded.
    pub fn covers(&self) -> Option<&[String; 2]> {
        match &self.phase {
            Phase::SelectCover { covers, .. } => covers.as_ref(),
            _ => None,
        }
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        match &self.phase {
            Phase::Writing(writing) => writing.challenge.as_ref(),
            _ => None,
        }
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        match &self.phase {
            Phase::Writing(writing) => writing.feedback.as_ref(),
            Phase::SelectImage { feedback, .. } => Some(feedback),
            _ => None,
        }
    }

    /// The two illustration options for the accepted sentence.
    pub fn illustration_options(&self) -> Option<&[String; 2]> {
        match &self.phase {
            Phase::SelectImage { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn is_falling(&self) -> bool {
        self.is_falling_at(Instant::now())
    }

    pub fn is_falling_at(&self, now: Instant) -> bool {
        match &self.phase {
            Phase::Writing(writing) => writing.is_falling_at(now),
            _ => false,
        }
    }

    /// Index of the book viewer: 0 is the cover, `pages + 1` is "THE END".
    pub fn view_page_index(&self) -> Option<usize> {
        match &self.phase {
            Phase::BookView { view_page, .. } => Some(*view_page),
            _ => None,
        }
    }

    pub fn view_page(&self) -> Option<BookPageView<'_>> {
        let Phase::BookView { book, view_page } = &self.phase else {
            return None;
        };
        Some(match *view_page {
            0 => BookPageView::Cover {
                title: &book.title,
                author: &book.author,
                cover: &book.cover,
            },
            n if n <= book.pages.len() => BookPageView::Story {
                number: n,
                page: &book.pages[n - 1],
            },
            _ => BookPageView::TheEnd,
        })
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// `ENTER_NAME` → `WELCOME`.
    pub fn submit_name(&mut self, name: &str) -> Result<(), GameError> {
        self.expect(PhaseKind::EnterName, "enter a name")?;
        self.student_name = non_empty(name, "name")?;
        self.transition(Phase::Welcome);
        Ok(())
    }

    /// `WELCOME` → `SELECT_CHAR`.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.expect(PhaseKind::Welcome, "start")?;
        self.transition(Phase::SelectCharacter);
        Ok(())
    }

    /// `SELECT_CHAR` → `SELECT_TITLE`.
    pub fn choose_character(&mut self, character: Animal) -> Result<(), GameError> {
        self.expect(PhaseKind::SelectCharacter, "choose a character")?;
        self.transition(Phase::SelectTitle { character });
        Ok(())
    }

    /// `SELECT_TITLE` → `SELECT_COVER`.
    pub fn submit_title(&mut self, title: &str) -> Result<(), GameError> {
        let Phase::SelectTitle { character } = self.phase else {
            return Err(self.invalid("name the story"));
        };
        let title = non_empty(title, "title")?;
        self.transition(Phase::SelectCover {
            character,
            title,
            covers: None,
        });
        Ok(())
    }

    /// Generate the two cover options unless they are already cached.
    pub async fn load_covers<S: Studio + ?Sized>(&mut self, studio: &S) -> Result<(), GameError> {
        let Phase::SelectCover {
            character,
            title,
            covers,
        } = &self.phase
        else {
            return Err(self.invalid("load covers"));
        };
        if covers.is_some() {
            return Ok(());
        }

        let character = character.name();
        let title = title.clone();

        let loading = Loading::start(&mut self.status);
        let result = futures::try_join!(
            studio.request_cover_illustration(&title, character),
            studio.request_cover_illustration(&title, character),
        );
        loading.finish();

        match result {
            Ok((first, second)) => {
                if let Phase::SelectCover { covers, .. } = &mut self.phase {
                    *covers = Some([first, second]);
                }
                self.status = LoadState::Idle;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// `SELECT_COVER` → `WRITING` at level 1.
    pub fn choose_cover(&mut self, index: usize) -> Result<(), GameError> {
        match &self.phase {
            Phase::SelectCover {
                covers: Some(_), ..
            } if index < 2 => {}
            Phase::SelectCover { .. } => return Err(GameError::NoSuchOption(index)),
            _ => return Err(self.invalid("choose a cover")),
        }

        let Phase::SelectCover {
            character,
            title,
            covers: Some(covers),
        } = self.take_phase()
        else {
            unreachable!("phase checked above");
        };

        let [first, second] = covers;
        let cover = if index == 0 { first } else { second };

        self.transition(Phase::Writing(Writing::new(Draft {
            character,
            title,
            cover,
            pages: Vec::new(),
        })));
        Ok(())
    }

    /// Fetch the challenge for the current level unless one is cached.
    pub async fn load_challenge<S: Studio + ?Sized>(&mut self, studio: &S) -> Result<(), GameError> {
        let Phase::Writing(writing) = &self.phase else {
            return Err(self.invalid("load a challenge"));
        };
        if writing.challenge.is_some() {
            return Ok(());
        }

        let level = writing.draft.level();
        let character = writing.draft.character.name();
        let title = writing.draft.title.clone();

        let loading = Loading::start(&mut self.status);
        let result = studio.request_challenge(level, character, &title).await;
        loading.finish();

        match result {
            Ok(challenge) => {
                tracing::info!(level, topic = %challenge.topic, "challenge loaded");
                if let Phase::Writing(writing) = &mut self.phase {
                    writing.challenge = Some(challenge);
                    writing.feedback = None;
                    writing.fell_at = None;
                }
                self.status = LoadState::Idle;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Submit a sentence for the current challenge.
    ///
    /// A rejected sentence leaves pages and level untouched and starts the
    /// fall animation; there is no limit on retries. An accepted one fetches
    /// two illustrations and moves to `SELECT_IMAGE`.
    pub async fn submit_sentence<S: Studio + ?Sized>(
        &mut self,
        studio: &S,
        sentence: &str,
    ) -> Result<SentenceOutcome, GameError> {
        let Phase::Writing(writing) = &self.phase else {
            return Err(self.invalid("submit a sentence"));
        };
        let Some(challenge) = writing.challenge.clone() else {
            return Err(GameError::NoChallenge);
        };
        if writing.is_falling_at(Instant::now()) {
            return Err(GameError::StillFalling);
        }
        let sentence = non_empty(sentence, "sentence")?;
        let character = writing.draft.character.name();

        let loading = Loading::start(&mut self.status);
        let validated = studio.validate_sentence(&challenge, &sentence).await;
        loading.finish();
        let result = match validated {
            Ok(result) => result,
            Err(e) => return Err(self.fail(e)),
        };

        if !result.is_correct {
            tracing::info!(level = self.current_level(), "sentence rejected");
            if let Phase::Writing(writing) = &mut self.phase {
                writing.feedback = Some(Feedback::error(result.feedback.clone()));
                writing.fell_at = Some(Instant::now());
            }
            self.status = LoadState::Idle;
            return Ok(SentenceOutcome::Rejected {
                feedback: result.feedback,
            });
        }

        if let Phase::Writing(writing) = &mut self.phase {
            writing.feedback = Some(Feedback::success(ACCEPTED_FEEDBACK));
        }

        let [first_style, second_style] = ILLUSTRATION_STYLES;
        let loading = Loading::start(&mut self.status);
        let illustrations = futures::try_join!(
            studio.request_illustration(&sentence, first_style, character),
            studio.request_illustration(&sentence, second_style, character),
        );
        loading.finish();
        let (first, second) = match illustrations {
            Ok(pair) => pair,
            Err(e) => return Err(self.fail(e)),
        };

        let Phase::Writing(writing) = self.take_phase() else {
            unreachable!("phase checked above");
        };
        self.transition(Phase::SelectImage {
            draft: writing.draft,
            sentence,
            options: [first, second],
            feedback: Feedback::success(ACCEPTED_FEEDBACK),
        });
        self.status = LoadState::Idle;
        Ok(SentenceOutcome::Accepted)
    }

    /// Stop the fall animation early (the presentation calls this once it
    /// has played).
    pub fn clear_fall(&mut self) {
        if let Phase::Writing(writing) = &mut self.phase {
            writing.fell_at = None;
        }
    }

    /// `SELECT_IMAGE` → `WRITING` (next level) or `BOOK_VIEW` after the last page.
    pub fn choose_illustration(&mut self, index: usize) -> Result<(), GameError> {
        self.expect(PhaseKind::SelectImage, "choose an illustration")?;
        if index >= 2 {
            return Err(GameError::NoSuchOption(index));
        }

        let Phase::SelectImage {
            mut draft,
            sentence,
            options,
            ..
        } = self.take_phase()
        else {
            unreachable!("phase checked above");
        };

        let [first, second] = options;
        let image_url = if index == 0 { first } else { second };
        draft.pages.push(Page {
            text: sentence,
            image_url,
        });

        if draft.pages.len() < MAX_LEVELS {
            self.transition(Phase::Writing(Writing::new(draft)));
        } else {
            let book = Book {
                title: draft.title,
                author: self.student_name.clone(),
                character: draft.character,
                cover: draft.cover,
                pages: draft.pages,
            };
            self.transition(Phase::BookView { book, view_page: 0 });
        }
        Ok(())
    }

    /// Turn the book viewer forward; stops at "THE END".
    pub fn next_page(&mut self) -> Result<usize, GameError> {
        self.turn_page(1)
    }

    /// Turn the book viewer back; stops at the cover.
    pub fn previous_page(&mut self) -> Result<usize, GameError> {
        self.turn_page(-1)
    }

    fn turn_page(&mut self, delta: isize) -> Result<usize, GameError> {
        let phase = self.phase_kind();
        let Phase::BookView { book, view_page } = &mut self.phase else {
            return Err(GameError::InvalidAction {
                action: "turn the page",
                phase,
            });
        };
        let last = book.pages.len() + 1;
        *view_page = view_page.saturating_add_signed(delta).min(last);
        Ok(*view_page)
    }

    /// Render the finished book as HTML.
    pub fn export_book(&self) -> Result<ExportedBook, GameError> {
        match &self.phase {
            Phase::BookView { book, .. } => Ok(export_book(book)),
            _ => Err(self.invalid("export the book")),
        }
    }

    /// Back to `ENTER_NAME` with every session field cleared.
    pub fn reset(&mut self) {
        self.student_name.clear();
        self.status = LoadState::Idle;
        self.transition(Phase::EnterName);
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn expect(&self, kind: PhaseKind, action: &'static str) -> Result<(), GameError> {
        if self.phase_kind() == kind {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> GameError {
        GameError::InvalidAction {
            action,
            phase: self.phase_kind(),
        }
    }

    fn fail(&mut self, error: StudioError) -> GameError {
        tracing::warn!(phase = %self.phase_kind(), error = %error, "studio request failed");
        self.status = LoadState::Error(error.to_string());
        GameError::Studio(error)
    }

    fn take_phase(&mut self) -> Phase {
        std::mem::replace(&mut self.phase, Phase::EnterName)
    }

    fn transition(&mut self, next: Phase) {
        tracing::info!(from = %self.phase_kind(), to = %next.kind(), "phase transition");
        self.phase = next;
    }
}

/// Marks a status `Loading` for the duration of a request and puts the
/// previous value back if the request future is dropped before it finishes.
struct Loading<'a> {
    status: &'a mut LoadState,
    previous: Option<LoadState>,
}

impl<'a> Loading<'a> {
    fn start(status: &'a mut LoadState) -> Self {
        let previous = std::mem::replace(status, LoadState::Loading);
        Self {
            status,
            previous: Some(previous),
        }
    }

    /// The request completed; the caller sets the outcome.
    fn finish(mut self) {
        self.previous = None;
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.status = previous;
        }
    }
}

fn non_empty(input: &str, what: &'static str) -> Result<String, GameError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(GameError::EmptyInput(what))
    } else {
        Ok(trimmed.to_string())
    }
}
