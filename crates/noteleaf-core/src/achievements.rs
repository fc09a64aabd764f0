//! Achievement catalog and evaluator.
//!
//! Achievement definitions are a static, compile-time table. Evaluation is a
//! pure function over a profile's counters and its already-unlocked ids, so
//! unlock decisions are deterministic and trivially testable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::{CounterKind, Counters};

/// A static achievement definition.
///
/// An achievement is permanently granted the first time its counter crosses
/// the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    /// Stable badge id.
    pub id: &'static str,

    /// The counter this achievement watches.
    pub counter: CounterKind,

    /// Counter value at which the achievement unlocks.
    pub threshold: u64,

    /// Display name.
    pub name: &'static str,

    /// Short description shown in the badge gallery.
    pub description: &'static str,
}

/// The static achievement catalog.
pub const CATALOG: [AchievementDef; 7] = [
    AchievementDef {
        id: "first-summary",
        counter: CounterKind::Summaries,
        threshold: 1,
        name: "First Steps",
        description: "Generate your first summary.",
    },
    AchievementDef {
        id: "note-ninja",
        counter: CounterKind::Summaries,
        threshold: 50,
        name: "Note Ninja",
        description: "Generate 50 summaries.",
    },
    AchievementDef {
        id: "card-sharp",
        counter: CounterKind::FlashcardDecks,
        threshold: 25,
        name: "Card Sharp",
        description: "Generate 25 flashcard decks.",
    },
    AchievementDef {
        id: "mind-mapper",
        counter: CounterKind::Mindmaps,
        threshold: 10,
        name: "Mind Mapper",
        description: "Create 10 mind maps.",
    },
    AchievementDef {
        id: "on-the-air",
        counter: CounterKind::Podcasts,
        threshold: 5,
        name: "On the Air",
        description: "Generate 5 podcasts.",
    },
    AchievementDef {
        id: "quiz-whiz",
        counter: CounterKind::QuizCorrectAnswers,
        threshold: 100,
        name: "Quiz Whiz",
        description: "Answer 100 quiz questions correctly.",
    },
    AchievementDef {
        id: "finisher",
        counter: CounterKind::QuizzesCompleted,
        threshold: 20,
        name: "Finisher",
        description: "Complete 20 quizzes.",
    },
];

/// The full catalog, in definition order.
#[must_use]
pub fn catalog() -> &'static [AchievementDef] {
    &CATALOG
}

/// Look up a definition by badge id.
#[must_use]
pub fn find(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// An unlocked achievement on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlock {
    /// The badge id.
    pub id: String,

    /// When the badge was unlocked.
    pub unlocked_at: DateTime<Utc>,
}

/// Evaluate which achievements newly unlock for the given counters.
///
/// Returns every catalog entry whose counter has reached its threshold and
/// whose id is not already in `unlocked_ids`. An id already present is never
/// returned again, no matter how often the threshold is re-crossed.
#[must_use]
pub fn evaluate(counters: &Counters, unlocked_ids: &[String]) -> Vec<&'static AchievementDef> {
    CATALOG
        .iter()
        .filter(|def| counters.get(def.counter) >= def.threshold)
        .filter(|def| !unlocked_ids.iter().any(|id| id == def.id))
        .collect()
}
