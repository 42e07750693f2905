//! Deterministic placeholder artifact used whenever model generation degrades.

use crate::catalog::{Genre, Theme};
use crate::models::song::{GenerationMethod, NewArtifact};

pub const FALLBACK_LYRICS: &str = "[Verse 1]\\n추억이 담긴 노래가 곧 완성됩니다.";

pub fn fallback_artifact(theme: Theme, genre: Genre) -> NewArtifact {
    NewArtifact {
        title: format!("{}의 이야기", theme.label()),
        lyrics: FALLBACK_LYRICS.to_string(),
        style_tags: format!("korean, {}, emotional", genre.label().to_lowercase()),
        generation_method: GenerationMethod::Fallback,
    }
}
