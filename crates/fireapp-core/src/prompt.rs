//! Interactive question collaborator
//!
//! Components that need a decision from the user take a `&dyn Prompter`.
//! The terminal implementation lives in `tui`; [`ScriptedPrompter`] answers
//! from a queue.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick one of the listed choices
    Select(Vec<String>),
    /// Free text
    Input,
    /// Yes or no
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choice(usize),
    Text(String),
    Confirm(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub message: String,
    pub kind: QuestionKind,
    pub default: Option<Answer>,
}

impl Question {
    pub fn select(message: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            message: message.into(),
            kind: QuestionKind::Select(choices),
            default: Some(Answer::Choice(0)),
        }
    }

    pub fn input(message: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: QuestionKind::Input,
            default: Some(Answer::Text(default.into())),
        }
    }

    pub fn confirm(message: impl Into<String>, default: bool) -> Self {
        Self {
            message: message.into(),
            kind: QuestionKind::Confirm,
            default: Some(Answer::Confirm(default)),
        }
    }
}

pub trait Prompter: Send + Sync {
    fn ask(&self, question: &Question) -> Result<Answer>;

    /// Ask a select question and return the chosen index
    fn select(&self, message: &str, choices: Vec<String>) -> Result<usize> {
        let count = choices.len();
        match self.ask(&Question::select(message, choices))? {
            Answer::Choice(index) if index < count => Ok(index),
            _ => Err(Error::UnexpectedAnswer(message.to_string())),
        }
    }

    fn input(&self, message: &str, default: &str) -> Result<String> {
        match self.ask(&Question::input(message, default))? {
            Answer::Text(text) => Ok(text),
            _ => Err(Error::UnexpectedAnswer(message.to_string())),
        }
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        match self.ask(&Question::confirm(message, default))? {
            Answer::Confirm(value) => Ok(value),
            _ => Err(Error::UnexpectedAnswer(message.to_string())),
        }
    }
}

/// Answers questions from a fixed script.
///
/// Once the script runs out every question gets its default answer. Every
/// question asked is recorded.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<Question>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Accept the default for every question
    pub fn defaults() -> Self {
        Self::default()
    }

    pub fn asked(&self) -> Vec<Question> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &Question) -> Result<Answer> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.clone());
        }
        let next = self.answers.lock().ok().and_then(|mut a| a.pop_front());
        next.or_else(|| question.default.clone())
            .ok_or_else(|| Error::UnexpectedAnswer(question.message.clone()))
    }
}
