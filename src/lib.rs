//! Hiragana, Katakana and Kanji reading quizzes.
//!
//! The library holds the quiz engine: a read-only [`Dataset`] of question
//! sets, pure answer checks in [`checker`], and the per-page
//! `(State, Event) -> State` machine in [`session`]. The terminal front end
//! lives in the binary.

pub mod checker;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod session;

pub use checker::{AnswerState, Item, Mode, Section};
pub use config::Config;
pub use dataset::{Dataset, Question, QuestionSet, ReadingOption, ReadingPassage, ScriptCharacter};
pub use error::{Error, Result};
pub use session::{Event, Page, Quiz, QuizState, Verdict};
