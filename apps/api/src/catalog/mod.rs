//! Fixed option sets offered by the song wizard.
//!
//! Every enum serializes to the exact label the wizard shows, so the stored
//! `song_requests` columns and the API payloads carry the same strings.

pub mod styles;
pub mod themes;

use serde::Serialize;
use thiserror::Error;

pub use styles::{Genre, Style, VocalPreference};
pub use themes::Theme;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Looks up `raw` among `options` by exact label match.
pub(crate) fn parse_label<T: Copy>(
    kind: &'static str,
    options: &[T],
    label_of: fn(&T) -> &'static str,
    raw: &str,
) -> Result<T, UnknownOption> {
    let raw = raw.trim();
    options
        .iter()
        .find(|option| label_of(option) == raw)
        .copied()
        .ok_or_else(|| UnknownOption {
            kind,
            value: raw.to_string(),
        })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub questions: &'static [&'static str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleEntry {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocalEntry {
    pub value: &'static str,
    pub label: &'static str,
}

/// Everything the wizard needs to render its steps.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub themes: Vec<ThemeEntry>,
    pub styles: Vec<StyleEntry>,
    pub genres: Vec<&'static str>,
    pub vocal_preferences: Vec<VocalEntry>,
}

pub fn catalog() -> Catalog {
    Catalog {
        themes: Theme::ALL
            .iter()
            .map(|theme| ThemeEntry {
                name: theme.label(),
                description: theme.description(),
                questions: theme.questions(),
            })
            .collect(),
        styles: Style::ALL
            .iter()
            .map(|style| StyleEntry {
                name: style.label(),
                description: style.description(),
            })
            .collect(),
        genres: Genre::ALL.iter().map(Genre::label).collect(),
        vocal_preferences: VocalPreference::ALL
            .iter()
            .map(|vocal| VocalEntry {
                value: vocal.as_str(),
                label: vocal.label(),
            })
            .collect(),
    }
}
