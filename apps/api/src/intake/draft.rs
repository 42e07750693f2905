//! Typed wizard state.
//!
//! The wizard walks theme → answers → style/genre/vocal → contact. Each step
//! is a method that validates its input, and `into_submission` only succeeds
//! once every required step is done. The submit endpoint drives raw payloads
//! through the same draft.

use thiserror::Error;
use tracing::debug;

use crate::catalog::{Genre, Style, Theme, UnknownOption, VocalPreference};
use crate::errors::AppError;
use crate::intake::validation::{format_phone_number, is_valid_contact};
use crate::models::song::{Answer, NewSongRequest};

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("choose a theme first")]
    NoTheme,

    #[error("'{0}' is not a question for the chosen theme")]
    UnknownQuestion(String),

    #[error("answer to '{0}' is empty")]
    EmptyAnswer(String),

    #[error("choose a style and genre first")]
    NoStyle,

    #[error("contact '{0}' must look like 010-1234-5678")]
    InvalidContact(String),

    #[error("contact is missing")]
    NoContact,

    #[error(transparent)]
    Option(#[from] UnknownOption),
}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongDraft {
    theme: Option<Theme>,
    answers: Vec<Answer>,
    style: Option<(Style, Genre)>,
    vocal_preference: VocalPreference,
    preferred_artist: Option<String>,
    contact: Option<String>,
}

impl SongDraft {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Picks the theme. Switching to a different theme discards the answers
    /// given so far, since they belong to the old question set.
    pub fn select_theme(&mut self, theme: Theme) {
        if self.theme != Some(theme) {
            self.answers.clear();
        }
        self.theme = Some(theme);
    }

    /// Answers one of the chosen theme's questions. Re-answering replaces the
    /// earlier answer; answers stay in question order.
    #[allow(dead_code)] // interactive wizard step; payload intake uses `import_answers`
    pub fn answer(&mut self, question: &str, answer: &str) -> Result<(), DraftError> {
        let theme = self.theme.ok_or(DraftError::NoTheme)?;
        let questions = theme.questions();
        let position = questions
            .iter()
            .position(|q| *q == question)
            .ok_or_else(|| DraftError::UnknownQuestion(question.to_string()))?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(DraftError::EmptyAnswer(question.to_string()));
        }

        self.answers.retain(|a| a.question != question);
        self.answers.push(Answer {
            question: question.to_string(),
            answer: answer.to_string(),
        });
        self.answers.sort_by_key(|a| {
            questions
                .iter()
                .position(|q| *q == a.question)
                .unwrap_or(position)
        });
        Ok(())
    }

    /// Replaces the answers wholesale, keeping the given order. Unlike
    /// [`SongDraft::answer`] the questions are not checked against the theme;
    /// submissions from older clients carry their own question keys.
    pub fn import_answers<I>(&mut self, answers: I) -> Result<(), DraftError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if self.theme.is_none() {
            return Err(DraftError::NoTheme);
        }
        self.answers = answers
            .into_iter()
            .map(|(question, answer)| Answer { question, answer })
            .collect();
        Ok(())
    }

    /// The first theme question still unanswered.
    #[allow(dead_code)] // interactive wizard step
    pub fn next_question(&self) -> Option<&'static str> {
        self.missing_questions().into_iter().next()
    }

    pub fn missing_questions(&self) -> Vec<&'static str> {
        let Some(theme) = self.theme else {
            return Vec::new();
        };
        theme
            .questions()
            .iter()
            .copied()
            .filter(|q| !self.answers.iter().any(|a| a.question == *q))
            .collect()
    }

    /// Musical choices. `vocal` defaults to female; a blank artist is dropped.
    pub fn choose_style(
        &mut self,
        style: Style,
        genre: Genre,
        vocal: Option<VocalPreference>,
        preferred_artist: Option<&str>,
    ) -> Result<(), DraftError> {
        if self.theme.is_none() {
            return Err(DraftError::NoTheme);
        }
        self.style = Some((style, genre));
        self.vocal_preference = vocal.unwrap_or_default();
        self.preferred_artist = preferred_artist
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        Ok(())
    }

    /// Sets an already formatted contact, rejected unless it matches exactly.
    pub fn enter_contact(&mut self, contact: &str) -> Result<(), DraftError> {
        if self.style.is_none() {
            return Err(DraftError::NoStyle);
        }
        if !is_valid_contact(contact) {
            return Err(DraftError::InvalidContact(contact.to_string()));
        }
        self.contact = Some(contact.to_string());
        Ok(())
    }

    /// Formats raw typed digits first, as the wizard's phone input does.
    #[allow(dead_code)] // interactive wizard step; payload intake is strict
    pub fn enter_typed_contact(&mut self, typed: &str) -> Result<(), DraftError> {
        self.enter_contact(&format_phone_number(typed))
    }

    pub fn into_submission(self) -> Result<NewSongRequest, DraftError> {
        let missing = self.missing_questions();
        let theme = self.theme.ok_or(DraftError::NoTheme)?;
        let (style, genre) = self.style.ok_or(DraftError::NoStyle)?;
        let contact = self.contact.ok_or(DraftError::NoContact)?;

        if !missing.is_empty() {
            debug!(
                "Submitting {theme} request with {} unanswered question(s)",
                missing.len()
            );
        }

        Ok(NewSongRequest {
            contact,
            theme,
            answers: self.answers,
            style,
            genre,
            vocal_preference: self.vocal_preference,
            preferred_artist: self.preferred_artist,
        })
    }
}
