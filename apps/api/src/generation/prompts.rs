//! Prompt construction for lyric generation.
//!
//! The prompt is a single instruction block filled from the stored request.
//! User-supplied text is substituted last, in a single pass, so it can never be
//! re-expanded as a template placeholder.

use serde_json::{json, Value};

use crate::catalog::Genre;
use crate::llm_client::prompts::{ARTIST_GUIDANCE_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::models::song::SongRequest;

pub const MAX_OUTPUT_TOKENS: u32 = 4096;
pub const TEMPERATURE: f32 = 0.9;

/// Sections every lyric must contain, in order, each as a `[Name]` label.
pub const SECTION_ORDER: [&str; 11] = [
    "Intro",
    "Verse 1",
    "Pre-Chorus",
    "Chorus",
    "Interlude",
    "Verse 2",
    "Pre-Chorus",
    "Chorus",
    "Bridge",
    "Chorus",
    "Outro",
];

/// Used when a genre has no rule set of its own.
pub const GENERIC_METER_RULE: &str =
    "각 행의 음절 수를 짝수로 맞추고, 같은 섹션 안에서는 행마다 음절 수를 비슷하게 유지해 노래로 부르기 쉽게 하세요.";

const GENRE_RULES: &[(Genre, &[&str])] = &[
    (
        Genre::Ballad,
        &[
            "Verse는 담담하게 이야기를 풀고, Chorus에서 감정을 크게 터뜨리세요.",
            "긴 모음으로 끝나는 행을 많이 써서 호흡이 긴 멜로디에 어울리게 하세요.",
            "직접적인 감정어보다 장면과 사물로 마음을 보여주세요.",
        ],
    ),
    (
        Genre::Trot,
        &[
            "3·4조 또는 4·4조의 정형 율격을 지키세요.",
            "Chorus에는 한 번 들으면 따라 부를 수 있는 후렴구를 반복하세요.",
            "'~이여', '~구려' 같은 꺾이는 어미로 흥과 한을 함께 담으세요.",
        ],
    ),
    (
        Genre::Folk,
        &[
            "통기타 반주에 어울리는 소박하고 일상적인 말을 쓰세요.",
            "이야기를 시간 순서대로 들려주듯 서술하세요.",
            "과장된 수사보다 담백한 고백체를 쓰세요.",
        ],
    ),
    (
        Genre::ArtSong,
        &[
            "시적인 문어체와 자연의 심상(달, 강, 들꽃)을 활용하세요.",
            "연마다 같은 행 수를 유지하고 행의 길이를 고르게 맞추세요.",
            "반복은 절제하고 한 편의 시처럼 완결된 구성을 만드세요.",
        ],
    ),
    (
        Genre::Rock,
        &[
            "짧고 힘 있는 단어로 행을 끊어 강한 비트에 실리게 하세요.",
            "Chorus는 외치듯 부를 수 있는 선언형 문장으로 쓰세요.",
            "Bridge에서 감정의 전환이나 각성을 보여주세요.",
        ],
    ),
];

/// Returns the genre-specific rule set, if the genre has one.
pub fn genre_rules(genre: Genre) -> Option<&'static [&'static str]> {
    GENRE_RULES
        .iter()
        .find(|(g, _)| *g == genre)
        .map(|(_, rules)| *rules)
}

/// Song prompt template. Replace every `{placeholder}` before sending.
pub const SONG_PROMPT_TEMPLATE: &str = r#"# Task: 사용자의 삶이 녹아 있는 고품질 가사와 음악 생성용 스타일 태그 생성

# Role: 5070 세대 공감 전문 서정 시인 및 작사가
당신은 대한민국 5070 세대의 삶과 애환, 사랑과 그리움을 깊이 있게 이해하는 전문 작사가입니다. 사용자가 제공한 짧은 단어와 문장을 바탕으로, 한 편의 수필 같은 서정적인 가사를 작성합니다.

# [Input 데이터]
- 주제: {theme}
- 희망 장르: {genre}
- 희망 분위기: {style}
- 보컬: {vocal}
{artist_line}
- 사용자 답변 내역:
{transcript}

# Guidelines:
1. **Target Audience**: 5070 세대가 공감할 수 있는 단어와 구어체(-했지요, -구려, -네요)를 사용하세요.
2. **Literary Expansion**: 사용자의 짧은 답변을 그대로 쓰지 마세요. 당시의 계절감, 온도, 공기의 냄새, 시각적 이미지를 동원하여 문학적으로 확장하세요. 희망 장르와 희망 분위기에 어울리는 가사를 작성하세요.
3. **Storytelling (기승전결)**: 아래 가사 구조를 순서대로 엄격히 지키고, 실제 가사에도 각 섹션 이름을 []안에 표기합니다. 사용자의 경험이 하나의 완성된 이야기로 흐르도록 배치하세요.
{section_structure}
4. **장르 규칙 ({genre})**:
{genre_rules}
5. **Rhyme & Meter**: 같은 섹션 안에서는 행 끝 음절의 운(각운)을 맞추고, Chorus는 기억하기 쉬운 반복 구절로 만드세요. 한 행은 8~14음절 안에서 노래하기 좋은 길이로 쓰세요.
6. **줄바꿈 표기**: 가사의 줄바꿈은 \n 으로 표기하고, 섹션과 섹션 사이에는 빈 줄을 하나 두세요.

# Musical Style Tag Rules:
- 음악 생성 도구(Suno AI)용 영문 태그를 쉼표로 구분해 작성합니다.
- korean 과 장르 태그를 반드시 포함하세요.
- 장르, 분위기, 보컬 스타일 형용사, 악기 구성, 템포 표현을 모두 담으세요.
- 참고 어휘: 장르 "{genre_tag}", 분위기 "{mood_tags}", 보컬 "{vocal_tags}", 악기 "{instrumentation}", 템포 "{tempo}"

# Output Format:
아래 세 개의 문자열 필드만 가진 JSON 객체 하나를 반환하세요.
{
  "songTitle": "노래 제목",
  "lyrics": "[Intro]\n...\n\n[Verse 1]\n...",
  "styleTags": "korean, korean ballad, warm, soft female vocal, piano, slow tempo"
}
{json_only_instruction}"#;

/// Gemini response schema: exactly three required string fields.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "songTitle": { "type": "STRING" },
            "lyrics": { "type": "STRING" },
            "styleTags": { "type": "STRING" }
        },
        "required": ["songTitle", "lyrics", "styleTags"],
        "propertyOrdering": ["songTitle", "lyrics", "styleTags"]
    })
}

/// Renders the question → answer transcript verbatim, one pair per block.
pub fn render_transcript(request: &SongRequest) -> String {
    if request.answers.is_empty() {
        return "(답변 없음)".to_string();
    }
    request
        .answers
        .iter()
        .map(|a| format!("질문: {}\n답변: {}", a.question, a.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_section_structure() -> String {
    SECTION_ORDER
        .iter()
        .enumerate()
        .map(|(i, name)| format!("   {}. [{}]", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_genre_rules(genre: Genre) -> String {
    match genre_rules(genre) {
        Some(rules) => rules
            .iter()
            .map(|rule| format!("   - {rule}"))
            .collect::<Vec<_>>()
            .join("\n"),
        None => format!("   - {GENERIC_METER_RULE}"),
    }
}

fn render_artist_line(preferred_artist: Option<&str>) -> String {
    match preferred_artist.map(str::trim).filter(|a| !a.is_empty()) {
        Some(artist) => format!(
            "- 참고 아티스트(스타일 참고용): {artist}\n  ({ARTIST_GUIDANCE_INSTRUCTION})"
        ),
        None => "- 참고 아티스트: 없음".to_string(),
    }
}

/// Builds the full generation prompt for a stored request.
pub fn build_song_prompt(request: &SongRequest) -> String {
    let filled = SONG_PROMPT_TEMPLATE
        .replace("{section_structure}", &render_section_structure())
        .replace("{genre_rules}", &render_genre_rules(request.genre))
        .replace("{genre_tag}", request.genre.english_tag())
        .replace("{mood_tags}", request.style.mood_tags())
        .replace("{vocal_tags}", request.vocal_preference.vocal_tags())
        .replace("{instrumentation}", request.genre.instrumentation())
        .replace("{tempo}", request.style.tempo())
        .replace("{json_only_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{theme}", request.theme.label())
        .replace("{genre}", request.genre.label())
        .replace("{style}", request.style.label())
        .replace("{vocal}", request.vocal_preference.label());

    // User-supplied text goes in last, in a single pass.
    let artist_line = render_artist_line(request.preferred_artist.as_deref());
    let transcript = render_transcript(request);
    substitute_once(
        &filled,
        &[
            ("{artist_line}", artist_line.as_str()),
            ("{transcript}", transcript.as_str()),
        ],
    )
}

/// Replaces each placeholder occurrence with its value, scanning left to
/// right. Inserted values are never scanned again.
fn substitute_once(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = pairs
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
            .min_by_key(|(at, _, _)| *at);
        match next {
            Some((at, key, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
