use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{parse_label, UnknownOption};

/// Story topic chosen on the first wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "부모님")]
    Parents,
    #[serde(rename = "자녀")]
    Children,
    #[serde(rename = "나의 청춘")]
    MyYouth,
    #[serde(rename = "내 곁에 있는 당신")]
    YouBesideMe,
    #[serde(rename = "지친 마음을 위로하는")]
    Comfort,
    #[serde(rename = "오늘의 여유")]
    QuietDay,
    #[serde(rename = "보고 싶은 사람")]
    MissedPerson,
    #[serde(rename = "다시 뛰는 심장")]
    NewChallenge,
    #[serde(rename = "요즘 내 기분")]
    CurrentMood,
}

impl Theme {
    pub const ALL: [Theme; 9] = [
        Theme::Parents,
        Theme::Children,
        Theme::MyYouth,
        Theme::YouBesideMe,
        Theme::Comfort,
        Theme::QuietDay,
        Theme::MissedPerson,
        Theme::NewChallenge,
        Theme::CurrentMood,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Parents => "부모님",
            Theme::Children => "자녀",
            Theme::MyYouth => "나의 청춘",
            Theme::YouBesideMe => "내 곁에 있는 당신",
            Theme::Comfort => "지친 마음을 위로하는",
            Theme::QuietDay => "오늘의 여유",
            Theme::MissedPerson => "보고 싶은 사람",
            Theme::NewChallenge => "다시 뛰는 심장",
            Theme::CurrentMood => "요즘 내 기분",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Theme::Parents => "부모님께 전하는 마음",
            Theme::Children => "아이에게 들려주는 이야기",
            Theme::MyYouth => "빛나던 그 시절의 나",
            Theme::YouBesideMe => "함께한 소중한 인연",
            Theme::Comfort => "나를 위한 휴식",
            Theme::QuietDay => "평온한 일상의 순간",
            Theme::MissedPerson => "그리움을 담아",
            Theme::NewChallenge => "새로운 도전과 열정",
            Theme::CurrentMood => "지금 이 순간의 감정",
        }
    }

    /// Interview questions, in the order the wizard asks them.
    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Theme::Parents => &[
                "부모님과 함께했던 가장 따뜻한 기억은 무엇인가요?",
                "부모님께 들었던 말 중 가장 오래 남아 있는 말은 무엇인가요?",
                "부모님을 떠올리면 생각나는 장소나 음식이 있나요?",
                "지금 부모님께 꼭 전하고 싶은 한마디는 무엇인가요?",
            ],
            Theme::Children => &[
                "아이가 처음 태어났을 때 어떤 마음이 들었나요?",
                "아이와 함께한 가장 행복한 순간은 언제인가요?",
                "아이가 어떤 사람으로 자라길 바라나요?",
                "아이에게 꼭 해주고 싶은 말은 무엇인가요?",
            ],
            Theme::MyYouth => &[
                "가장 빛났다고 생각하는 시절은 언제인가요?",
                "그 시절 즐겨 듣던 노래나 자주 가던 곳이 있나요?",
                "청춘의 나에게 가장 소중했던 사람은 누구인가요?",
                "그때의 나에게 지금 해주고 싶은 말은 무엇인가요?",
            ],
            Theme::YouBesideMe => &[
                "그 사람을 처음 만난 날을 기억하시나요?",
                "함께 지내며 가장 고마웠던 순간은 언제인가요?",
                "둘만 아는 추억이나 습관이 있나요?",
                "앞으로 그 사람과 함께하고 싶은 일은 무엇인가요?",
            ],
            Theme::Comfort => &[
                "요즘 마음을 가장 무겁게 하는 일은 무엇인가요?",
                "힘들 때 위로가 되었던 말이나 장면이 있나요?",
                "지친 나에게 가장 필요한 것은 무엇인가요?",
            ],
            Theme::QuietDay => &[
                "오늘 하루 중 가장 편안했던 순간은 언제였나요?",
                "여유로울 때 주로 무엇을 하며 시간을 보내나요?",
                "요즘 작은 행복을 느끼는 순간은 언제인가요?",
            ],
            Theme::MissedPerson => &[
                "보고 싶은 그 사람은 누구인가요?",
                "그 사람과 함께했던 기억 중 가장 선명한 장면은 무엇인가요?",
                "그 사람을 떠올리게 하는 계절이나 냄새가 있나요?",
                "다시 만난다면 어떤 말을 건네고 싶나요?",
            ],
            Theme::NewChallenge => &[
                "요즘 새롭게 도전하고 있는 일은 무엇인가요?",
                "그 도전을 시작하게 된 계기는 무엇인가요?",
                "다시 가슴이 뛰게 만든 순간을 들려주세요.",
            ],
            Theme::CurrentMood => &[
                "요즘 나의 기분을 한 단어로 표현한다면 무엇인가요?",
                "그런 기분이 들게 된 이유는 무엇인가요?",
                "지금 이 순간 나에게 들려주고 싶은 말은 무엇인가요?",
            ],
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Theme {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("theme", &Theme::ALL, Theme::label, s)
    }
}
