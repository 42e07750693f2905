//! Validation and normalisation of the model's three-field JSON answer.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::GenerationError;
use crate::llm_client::strip_json_fences;
use crate::models::song::{GenerationMethod, NewArtifact};

/// In-text line break marker stored in `lyrics` instead of a raw newline.
pub const LINE_BREAK_MARKER: &str = "\\n";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSong {
    #[serde(alias = "title")]
    song_title: String,
    lyrics: String,
    #[serde(alias = "tags")]
    style_tags: String,
}

fn section_marker() -> &'static Regex {
    static SECTION_MARKER: OnceLock<Regex> = OnceLock::new();
    SECTION_MARKER.get_or_init(|| Regex::new(r"\[[^\[\]\r\n]+\]").expect("section marker pattern is valid"))
}

/// Parses raw model text into an artifact, or explains why it is unusable.
pub fn parse_song_response(raw: &str) -> Result<NewArtifact, GenerationError> {
    let body = strip_json_fences(raw);
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let song: RawSong = serde_json::from_str(body)?;

    let title = normalize_title(&song.song_title);
    if title.is_empty() {
        return Err(GenerationError::EmptyField("songTitle"));
    }

    let lyrics = encode_line_breaks(song.lyrics.trim());
    if lyrics.is_empty() {
        return Err(GenerationError::EmptyField("lyrics"));
    }
    if !has_section_marker(&lyrics) {
        return Err(GenerationError::MissingSections);
    }

    let style_tags = normalize_style_tags(&song.style_tags);
    if style_tags.is_empty() {
        return Err(GenerationError::EmptyField("styleTags"));
    }

    Ok(NewArtifact {
        title,
        lyrics,
        style_tags,
        generation_method: GenerationMethod::Ai,
    })
}

/// Single line, no wrapping quotes.
fn normalize_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim()
        .to_string()
}

/// Replaces raw newlines with [`LINE_BREAK_MARKER`].
pub fn encode_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', LINE_BREAK_MARKER)
}

pub fn has_section_marker(lyrics: &str) -> bool {
    section_marker().is_match(lyrics)
}

/// Lower-cased, de-duplicated, `, `-joined tags with `korean` first.
pub fn normalize_style_tags(raw: &str) -> String {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(&[',', '\n'][..]) {
        let tag = tag.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if tag.is_empty() || tag == "korean" || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }
    if tags.is_empty() {
        return String::new();
    }
    tags.insert(0, "korean".to_string());
    tags.join(", ")
}
