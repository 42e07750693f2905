// Shared prompt fragments used across generation prompts.

/// Closing instruction that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "반드시 정해진 JSON 형식으로만 답변하세요. \
    JSON 객체 바깥에 어떤 설명도 덧붙이지 마세요. \
    마크다운 코드 블록(```)을 사용하지 마세요.";

/// Guardrail for the optional reference-artist field.
pub const ARTIST_GUIDANCE_INSTRUCTION: &str = "참고 아티스트는 음색과 분위기를 잡기 위한 \
    참고 자료일 뿐입니다. 해당 아티스트의 이름, 실제 가사, 목소리를 흉내 낸다는 표현을 \
    가사나 스타일 태그에 넣지 마세요.";
