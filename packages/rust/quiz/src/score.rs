//! Quiz scoring.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{AnswerSet, Question, QuestionKind, Quiz, Response};

/// Per-question result, in question order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    /// Zero-based question index.
    pub index: usize,
    pub correct: bool,
    pub explanation: String,
}

/// Outcome of scoring one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub correct: usize,
    pub total: usize,
    /// `round(correct / total * 100)`.
    pub percent: u32,
    pub passed: bool,
    pub results: Vec<QuestionResult>,
}

/// Score `answers` against `quiz`.
///
/// Unanswered questions count as incorrect. Multi-select answers match
/// when the chosen set equals the correct set, regardless of order.
pub fn score(quiz: &Quiz, answers: &AnswerSet) -> QuizOutcome {
    let results: Vec<QuestionResult> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| QuestionResult {
            index,
            correct: answers
                .get(index)
                .is_some_and(|response| is_correct(question, response)),
            explanation: question.explanation.clone(),
        })
        .collect();

    let total = results.len();
    let correct = results.iter().filter(|r| r.correct).count();
    let percent = if total == 0 {
        0
    } else {
        (correct as f64 / total as f64 * 100.0).round() as u32
    };
    let passed = f64::from(percent) >= quiz.passing_score;

    tracing::debug!(
        title = %quiz.title,
        correct,
        total,
        percent,
        passed,
        "quiz scored"
    );

    QuizOutcome {
        correct,
        total,
        percent,
        passed,
        results,
    }
}

fn is_correct(question: &Question, response: &Response) -> bool {
    match (&question.kind, response) {
        (QuestionKind::TrueFalse { answer }, Response::Flag(given)) => answer == given,
        (QuestionKind::TrueFalse { answer }, Response::Choice(given)) => {
            match given.trim().to_lowercase().as_str() {
                "true" => *answer,
                "false" => !*answer,
                _ => false,
            }
        }
        (QuestionKind::SingleChoice { answer, .. }, Response::Choice(given)) => answer == given,
        (QuestionKind::MultiSelect { answers, .. }, Response::Choices(given)) => {
            as_set(answers) == as_set(given)
        }
        (QuestionKind::MultiSelect { answers, .. }, Response::Choice(given)) => {
            answers.len() == 1 && &answers[0] == given
        }
        _ => false,
    }
}

fn as_set(items: &[String]) -> BTreeSet<&str> {
    items.iter().map(String::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(passing_score: f64) -> Quiz {
        Quiz {
            title: "VRAM basics".into(),
            passing_score,
            questions: vec![
                Question {
                    prompt: "Which is faster for inference?".into(),
                    explanation: "GPU memory bandwidth wins.".into(),
                    kind: QuestionKind::SingleChoice {
                        options: vec!["A".into(), "B".into(), "C".into()],
                        answer: "B".into(),
                    },
                },
                Question {
                    prompt: "VRAM lives on the GPU.".into(),
                    explanation: "It is dedicated GPU memory.".into(),
                    kind: QuestionKind::TrueFalse { answer: true },
                },
                Question {
                    prompt: "Pick the quantization formats.".into(),
                    explanation: "Q4 and Q8 are quantized.".into(),
                    kind: QuestionKind::MultiSelect {
                        options: vec!["Q4".into(), "FP32".into(), "Q8".into()],
                        answers: vec!["Q4".into(), "Q8".into()],
                    },
                },
            ],
        }
    }

    fn all_correct() -> AnswerSet {
        [
            (0, Response::Choice("B".into())),
            (1, Response::Flag(true)),
            (2, Response::Choices(vec!["Q8".into(), "Q4".into()])),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn two_of_three_rounds_to_67_and_fails_at_70() {
        let mut answers = all_correct();
        answers.insert(1, Response::Flag(false));

        let outcome = score(&quiz(70.0), &answers);
        assert_eq!(outcome.correct, 2);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.percent, 67);
        assert!(!outcome.passed);
        assert!(!outcome.results[1].correct);
        assert_eq!(outcome.results[1].explanation, "It is dedicated GPU memory.");
    }

    #[test]
    fn all_correct_passes() {
        let outcome = score(&quiz(70.0), &all_correct());
        assert_eq!(outcome.percent, 100);
        assert!(outcome.passed);
        assert!(outcome.results.iter().all(|r| r.correct));
    }

    #[test]
    fn passing_threshold_is_inclusive() {
        let mut answers = all_correct();
        answers.remove(2);
        let outcome = score(&quiz(67.0), &answers);
        assert_eq!(outcome.percent, 67);
        assert!(outcome.passed);
    }

    #[test]
    fn multi_select_needs_exact_set() {
        let mut answers = all_correct();
        answers.insert(2, Response::Choices(vec!["Q4".into()]));
        assert!(!score(&quiz(70.0), &answers).results[2].correct);

        answers.insert(
            2,
            Response::Choices(vec!["Q4".into(), "Q8".into(), "FP32".into()]),
        );
        assert!(!score(&quiz(70.0), &answers).results[2].correct);
    }

    #[test]
    fn unanswered_counts_as_incorrect() {
        let outcome = score(&quiz(0.0), &AnswerSet::new());
        assert_eq!(outcome.correct, 0);
        assert_eq!(outcome.percent, 0);
        assert!(outcome.passed);
    }

    #[test]
    fn true_false_accepts_text() {
        let mut answers = all_correct();
        answers.insert(1, Response::Choice("True".into()));
        assert!(score(&quiz(70.0), &answers).results[1].correct);
    }

    #[test]
    fn mismatched_response_shape_is_incorrect() {
        let mut answers = all_correct();
        answers.insert(0, Response::Flag(true));
        assert!(!score(&quiz(70.0), &answers).results[0].correct);
    }

    #[test]
    fn scoring_is_deterministic() {
        let q = quiz(70.0);
        let answers = all_correct();
        assert_eq!(score(&q, &answers), score(&q, &answers));
    }
}
