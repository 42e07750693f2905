use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{parse_label, UnknownOption};

/// Mood of the song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    #[serde(rename = "포근하고 따뜻한")]
    Warm,
    #[serde(rename = "잔잔하고 평온한")]
    Calm,
    #[serde(rename = "애절하고 뭉클한")]
    Sorrowful,
    #[serde(rename = "신나고 활기찬")]
    Upbeat,
    #[serde(rename = "웅장하고 감동적인")]
    Epic,
    #[serde(rename = "담담하고 깊이 있는")]
    Reflective,
}

impl Style {
    pub const ALL: [Style; 6] = [
        Style::Warm,
        Style::Calm,
        Style::Sorrowful,
        Style::Upbeat,
        Style::Epic,
        Style::Reflective,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Style::Warm => "포근하고 따뜻한",
            Style::Calm => "잔잔하고 평온한",
            Style::Sorrowful => "애절하고 뭉클한",
            Style::Upbeat => "신나고 활기찬",
            Style::Epic => "웅장하고 감동적인",
            Style::Reflective => "담담하고 깊이 있는",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Style::Warm => "햇살처럼 감싸 안아주는 다정한 노래",
            Style::Calm => "조용히 마음을 가라앉혀 주는 노래",
            Style::Sorrowful => "가슴 깊은 곳을 울리는 노래",
            Style::Upbeat => "어깨가 절로 들썩이는 흥겨운 노래",
            Style::Epic => "벅차오르는 감동을 담은 노래",
            Style::Reflective => "담백하게 지난날을 돌아보는 노래",
        }
    }

    /// English mood adjectives offered to the model as style-tag vocabulary.
    pub fn mood_tags(&self) -> &'static str {
        match self {
            Style::Warm => "warm, tender, cozy",
            Style::Calm => "calm, peaceful, gentle",
            Style::Sorrowful => "sorrowful, heartfelt, emotional",
            Style::Upbeat => "upbeat, joyful, energetic",
            Style::Epic => "epic, uplifting, grand",
            Style::Reflective => "reflective, nostalgic, understated",
        }
    }

    pub fn tempo(&self) -> &'static str {
        match self {
            Style::Warm => "mid-tempo",
            Style::Calm | Style::Sorrowful => "slow tempo",
            Style::Upbeat => "fast tempo",
            Style::Epic => "building mid-tempo",
            Style::Reflective => "moderate tempo",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Style {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("style", &Style::ALL, Style::label, s)
    }
}

/// Musical genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    #[serde(rename = "발라드")]
    Ballad,
    #[serde(rename = "트로트")]
    Trot,
    #[serde(rename = "포크")]
    Folk,
    #[serde(rename = "클래식/가곡")]
    ArtSong,
    #[serde(rename = "팝")]
    Pop,
    #[serde(rename = "록")]
    Rock,
    #[serde(rename = "재즈")]
    Jazz,
}

impl Genre {
    pub const ALL: [Genre; 7] = [
        Genre::Ballad,
        Genre::Trot,
        Genre::Folk,
        Genre::ArtSong,
        Genre::Pop,
        Genre::Rock,
        Genre::Jazz,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Genre::Ballad => "발라드",
            Genre::Trot => "트로트",
            Genre::Folk => "포크",
            Genre::ArtSong => "클래식/가곡",
            Genre::Pop => "팝",
            Genre::Rock => "록",
            Genre::Jazz => "재즈",
        }
    }

    pub fn english_tag(&self) -> &'static str {
        match self {
            Genre::Ballad => "korean ballad",
            Genre::Trot => "trot",
            Genre::Folk => "folk",
            Genre::ArtSong => "classical art song",
            Genre::Pop => "pop",
            Genre::Rock => "rock",
            Genre::Jazz => "jazz",
        }
    }

    pub fn instrumentation(&self) -> &'static str {
        match self {
            Genre::Ballad => "piano, strings",
            Genre::Trot => "accordion, brass, electric organ",
            Genre::Folk => "acoustic guitar, harmonica",
            Genre::ArtSong => "grand piano, chamber orchestra",
            Genre::Pop => "synth, drums, bass",
            Genre::Rock => "electric guitar, drums, bass",
            Genre::Jazz => "piano trio, saxophone",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("genre", &Genre::ALL, Genre::label, s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocalPreference {
    Male,
    #[default]
    Female,
}

impl VocalPreference {
    pub const ALL: [VocalPreference; 2] = [VocalPreference::Male, VocalPreference::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            VocalPreference::Male => "male",
            VocalPreference::Female => "female",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VocalPreference::Male => "남성 보컬",
            VocalPreference::Female => "여성 보컬",
        }
    }

    pub fn vocal_tags(&self) -> &'static str {
        match self {
            VocalPreference::Male => "warm male vocal, husky baritone",
            VocalPreference::Female => "soft female vocal, clear tone",
        }
    }
}

impl fmt::Display for VocalPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VocalPreference {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "남성" | "남성 보컬" => Ok(VocalPreference::Male),
            "female" | "여성" | "여성 보컬" => Ok(VocalPreference::Female),
            other => Err(UnknownOption {
                kind: "vocal preference",
                value: other.to_string(),
            }),
        }
    }
}
