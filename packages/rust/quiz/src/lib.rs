//! Quiz definitions, structural validation, and scoring.
//!
//! A quiz file is parsed into loosely-typed raw records, then validated
//! into a [`Quiz`] whose questions carry a type-appropriate answer shape.
//! Scoring a submitted [`AnswerSet`] is a pure function of the quiz and
//! the answers.

mod model;
mod score;
mod validate;

pub use model::{AnswerSet, Question, QuestionKind, Quiz, Response};
pub use score::{QuestionResult, QuizOutcome, score};
pub use validate::{DEFAULT_PASSING_SCORE, QuizFormatError, parse_quiz};
