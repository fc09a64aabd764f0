//! Trackable actions and usage counters.
//!
//! Every gamified user action maps to a fixed base point value and a named
//! usage counter. Counters feed the achievement evaluator.

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Points for generating a summary.
pub const SUMMARY_POINTS: u64 = 10;

/// Points for generating a flashcard deck.
pub const FLASHCARDS_POINTS: u64 = 10;

/// Points for creating a mind map.
pub const MINDMAP_POINTS: u64 = 15;

/// Points for generating a podcast.
pub const PODCAST_POINTS: u64 = 20;

/// Points for a correct quiz answer.
pub const QUIZ_CORRECT_POINTS: u64 = 2;

/// Points for completing a quiz.
pub const QUIZ_COMPLETED_POINTS: u64 = 25;

/// A trackable user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// The user generated a summary from a note.
    SummaryGenerated,

    /// The user generated a flashcard deck.
    FlashcardsGenerated,

    /// The user created a mind map.
    MindmapCreated,

    /// The user generated a podcast.
    PodcastGenerated,

    /// The user answered a quiz question correctly.
    QuizCorrectAnswer,

    /// The user completed a quiz.
    QuizCompleted,
}

impl ActionKind {
    /// Base points awarded for this action, before streak bonuses.
    #[must_use]
    pub const fn base_points(self) -> u64 {
        match self {
            Self::SummaryGenerated => SUMMARY_POINTS,
            Self::FlashcardsGenerated => FLASHCARDS_POINTS,
            Self::MindmapCreated => MINDMAP_POINTS,
            Self::PodcastGenerated => PODCAST_POINTS,
            Self::QuizCorrectAnswer => QUIZ_CORRECT_POINTS,
            Self::QuizCompleted => QUIZ_COMPLETED_POINTS,
        }
    }

    /// The usage counter this action increments.
    #[must_use]
    pub const fn counter(self) -> CounterKind {
        match self {
            Self::SummaryGenerated => CounterKind::Summaries,
            Self::FlashcardsGenerated => CounterKind::FlashcardDecks,
            Self::MindmapCreated => CounterKind::Mindmaps,
            Self::PodcastGenerated => CounterKind::Podcasts,
            Self::QuizCorrectAnswer => CounterKind::QuizCorrectAnswers,
            Self::QuizCompleted => CounterKind::QuizzesCompleted,
        }
    }
}

/// A named usage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    /// Summaries generated.
    Summaries,

    /// Flashcard decks generated.
    FlashcardDecks,

    /// Mind maps created.
    Mindmaps,

    /// Podcasts generated.
    Podcasts,

    /// Correct quiz answers.
    QuizCorrectAnswers,

    /// Quizzes completed.
    QuizzesCompleted,
}

/// Per-profile usage counters, one per trackable action.
///
/// All counters are non-negative and only ever increase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Summaries generated.
    pub summaries: u64,

    /// Flashcard decks generated.
    pub flashcard_decks: u64,

    /// Mind maps created.
    pub mindmaps: u64,

    /// Podcasts generated.
    pub podcasts: u64,

    /// Correct quiz answers.
    pub quiz_correct_answers: u64,

    /// Quizzes completed.
    pub quizzes_completed: u64,
}

impl Counters {
    /// Read a counter by kind.
    #[must_use]
    pub const fn get(&self, counter: CounterKind) -> u64 {
        match counter {
            CounterKind::Summaries => self.summaries,
            CounterKind::FlashcardDecks => self.flashcard_decks,
            CounterKind::Mindmaps => self.mindmaps,
            CounterKind::Podcasts => self.podcasts,
            CounterKind::QuizCorrectAnswers => self.quiz_correct_answers,
            CounterKind::QuizzesCompleted => self.quizzes_completed,
        }
    }

    /// Increment a counter by one.
    pub fn bump(&mut self, counter: CounterKind) {
        match counter {
            CounterKind::Summaries => self.summaries += 1,
            CounterKind::FlashcardDecks => self.flashcard_decks += 1,
            CounterKind::Mindmaps => self.mindmaps += 1,
            CounterKind::Podcasts => self.podcasts += 1,
            CounterKind::QuizCorrectAnswers => self.quiz_correct_answers += 1,
            CounterKind::QuizzesCompleted => self.quizzes_completed += 1,
        }
    }
}
