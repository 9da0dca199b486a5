//! "Quiz" screen: answer questions one at a time, then see the score.

use crossterm::event::{KeyCode, KeyModifiers};
use lessonhub_content::QuizMount;
use lessonhub_core::Command;
use lessonhub_quiz::{AnswerSet, QuestionKind, Quiz, QuizOutcome, Response, score};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::Action;
use crate::widgets::{hint, row, step};

/// An attempt in progress or just submitted.
struct Attempt {
    mount: QuizMount,
    quiz: Quiz,
    current: usize,
    cursor: usize,
    answers: AnswerSet,
    outcome: Option<QuizOutcome>,
}

enum QuizState {
    Idle,
    Failed { mount: QuizMount, message: String },
    Active(Box<Attempt>),
}

pub(crate) struct QuizScreen {
    state: QuizState,
}

impl QuizScreen {
    pub(crate) fn new() -> Self {
        Self {
            state: QuizState::Idle,
        }
    }

    pub(crate) fn start(&mut self, mount: QuizMount, quiz: Quiz) {
        self.state = QuizState::Active(Box::new(Attempt {
            mount,
            quiz,
            current: 0,
            cursor: 0,
            answers: AnswerSet::new(),
            outcome: None,
        }));
    }

    pub(crate) fn fail(&mut self, mount: QuizMount, message: String) {
        self.state = QuizState::Failed { mount, message };
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // Body
                Constraint::Length(1), // Hint
            ])
            .split(area);

        match &self.state {
            QuizState::Idle => {
                let empty = Paragraph::new("No quiz loaded.\n\nOpen a tutorial and press 't'.")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title(" Quiz "));
                f.render_widget(empty, chunks[0]);
            }
            QuizState::Failed { mount, message } => {
                let err = Paragraph::new(format!("{}\n\n{message}\n\nPress 'r' to retry.", mount.file))
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default().borders(Borders::ALL).title(" Quiz "));
                f.render_widget(err, chunks[0]);
            }
            QuizState::Active(attempt) => match &attempt.outcome {
                Some(outcome) => {
                    draw_results(f, chunks[0], attempt, outcome);
                    f.render_widget(hint("r retry"), chunks[1]);
                }
                None => {
                    draw_question(f, chunks[0], attempt);
                    f.render_widget(
                        hint("↑/↓ option · Space choose · ←/→ question · s submit"),
                        chunks[1],
                    );
                }
            },
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        match &mut self.state {
            QuizState::Idle => Action::None,
            QuizState::Failed { mount, .. } => match code {
                KeyCode::Char('r') => Action::StartQuiz(mount.clone()),
                _ => Action::None,
            },
            QuizState::Active(attempt) if attempt.outcome.is_some() => {
                if code == KeyCode::Char('r') {
                    attempt.answers = AnswerSet::new();
                    attempt.outcome = None;
                    attempt.current = 0;
                    attempt.cursor = 0;
                }
                Action::None
            }
            QuizState::Active(attempt) => attempt.handle_key(code),
        }
    }
}

impl Attempt {
    fn option_count(&self) -> usize {
        self.quiz.questions[self.current].kind.options().len()
    }

    fn handle_key(&mut self, code: KeyCode) -> Action {
        let total = self.quiz.questions.len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor = step(self.cursor, -1, self.option_count()),
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = step(self.cursor, 1, self.option_count())
            }
            KeyCode::Left | KeyCode::Char('p') => {
                self.current = step(self.current, -1, total);
                self.cursor = 0;
            }
            KeyCode::Right | KeyCode::Char('n') => {
                self.current = step(self.current, 1, total);
                self.cursor = 0;
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.choose(),
            KeyCode::Char('s') => {
                let outcome = score(&self.quiz, &self.answers);
                self.outcome = Some(outcome.clone());
                return Action::Dispatch(Command::RecordQuiz {
                    slug: self.mount.slug.clone(),
                    outcome,
                });
            }
            _ => {}
        }
        Action::None
    }

    fn choose(&mut self) {
        let question = &self.quiz.questions[self.current];
        match &question.kind {
            QuestionKind::MultiSelect { options, .. } => {
                if let Some(option) = options.get(self.cursor) {
                    self.answers.toggle_choice(self.current, option);
                }
            }
            _ => {
                if let Some(response) = question.response_for_option(self.cursor) {
                    self.answers.insert(self.current, response);
                }
            }
        }
    }

    fn is_chosen(&self, question: usize, option: usize) -> bool {
        let Some(response) = self.answers.get(question) else {
            return false;
        };
        let options = self.quiz.questions[question].kind.options();
        match response {
            Response::Flag(b) => (option == 0) == *b,
            Response::Choice(c) => options.get(option) == Some(c),
            Response::Choices(cs) => options.get(option).is_some_and(|o| cs.contains(o)),
        }
    }
}

fn draw_question(f: &mut Frame, area: Rect, attempt: &Attempt) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let question = &attempt.quiz.questions[attempt.current];
    let header = Paragraph::new(format!(
        "Question {}/{} ({})\n{}",
        attempt.current + 1,
        attempt.quiz.questions.len(),
        question.kind.label(),
        question.prompt
    ))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", attempt.quiz.title)),
    );
    f.render_widget(header, chunks[0]);

    let multi = matches!(question.kind, QuestionKind::MultiSelect { .. });
    let items: Vec<ListItem> = question
        .kind
        .options()
        .into_iter()
        .enumerate()
        .map(|(i, option)| {
            let mark = match (multi, attempt.is_chosen(attempt.current, i)) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(•)",
                (false, false) => "( )",
            };
            row(format!("{mark} {option}"), i == attempt.cursor)
        })
        .collect();
    let answered = attempt.answers.len();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Answered {answered}/{} ", attempt.quiz.questions.len())),
    );
    f.render_widget(list, chunks[1]);
}

fn draw_results(f: &mut Frame, area: Rect, attempt: &Attempt, outcome: &QuizOutcome) {
    let verdict = if outcome.passed {
        Span::styled("Passed", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("Not passed", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    };
    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!(
                "Score: {}/{} ({}%) · ",
                outcome.correct, outcome.total, outcome.percent
            )),
            verdict,
            Span::raw(format!(" · passing score {}%", attempt.quiz.passing_score)),
        ]),
        Line::from(""),
    ];
    for (result, question) in outcome.results.iter().zip(&attempt.quiz.questions) {
        let mark = if result.correct { "✓" } else { "✗" };
        lines.push(Line::from(format!("{mark} {}. {}", result.index + 1, question.prompt)));
        if !result.explanation.is_empty() {
            lines.push(
                Line::from(format!("    {}", result.explanation))
                    .style(Style::default().fg(Color::DarkGray)),
            );
        }
    }

    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", attempt.quiz.title)),
    );
    f.render_widget(body, area);
}
