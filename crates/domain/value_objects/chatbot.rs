use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::conversations::{ConversationEntity, ConversationMessageEntity},
    value_objects::enums::{message_roles::MessageRole, user_tiers::UserTier},
};

/// Messages of history forwarded to the model with each request.
pub const HISTORY_WINDOW: usize = 10;
pub const MAX_MESSAGES_PER_CONVERSATION: i64 = 50;
pub const MAX_CONVERSATIONS_PER_USER: i64 = 20;
const TITLE_MAX_CHARS: usize = 40;

pub const CRISIS_KEYWORDS: [&str; 6] = [
    "tự tử",
    "tự sát",
    "muốn chết",
    "không muốn sống",
    "tự làm hại",
    "kết thúc cuộc đời",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionTopic {
    Crisis,
    Cafes,
    Music,
    Exercise,
    Movies,
    Books,
    Sleep,
    Food,
    General,
}

#[derive(Debug)]
pub struct SuggestionBundle {
    pub topic: SuggestionTopic,
    pub keywords: &'static [&'static str],
    pub intro: &'static str,
    pub suggestions: &'static [&'static str],
}

/// Checked in order; the first bundle with a matching keyword wins.
static BUNDLES: [SuggestionBundle; 8] = [
    SuggestionBundle {
        topic: SuggestionTopic::Crisis,
        keywords: &CRISIS_KEYWORDS,
        intro: "Mình rất lo cho bạn. Bạn không phải đối mặt với điều này một mình:",
        suggestions: &[
            "Gọi ngay Tổng đài quốc gia bảo vệ trẻ em 111 hoặc cấp cứu 115",
            "Liên hệ Đường dây nóng Ngày Mai 096 306 1414 để được lắng nghe",
            "Ở cạnh một người bạn tin tưởng và kể cho họ nghe cảm xúc của bạn",
            "Đặt lịch với chuyên gia tâm lý trên EmoCare càng sớm càng tốt",
        ],
    },
    SuggestionBundle {
        topic: SuggestionTopic::Cafes,
        keywords: &["cà phê", "cafe", "quán"],
        intro: "Một góc cà phê yên tĩnh có thể giúp bạn thư giãn:",
        suggestions: &[
            "Chọn một quán nhỏ có nhạc nhẹ và ngồi cạnh cửa sổ",
            "Thử một ly trà thảo mộc nếu bạn đang khó ngủ",
            "Mang theo cuốn sổ và viết ra ba điều bạn biết ơn hôm nay",
        ],
    },
    SuggestionBundle {
        topic: SuggestionTopic::Music,
        keywords: &["nhạc", "bài hát", "âm nhạc"],
        intro: "Âm nhạc là liều thuốc tinh thần tuyệt vời:",
        suggestions: &[
            "Nghe một playlist lo-fi hoặc nhạc không lời trong 15 phút",
            "Hát theo bài hát bạn yêu thích khi còn nhỏ",
            "Thử nghe âm thanh thiên nhiên như tiếng mưa hoặc sóng biển",
        ],
    },
    SuggestionBundle {
        topic: SuggestionTopic::Exercise,
        keywords: &["tập thể dục", "chạy bộ", "yoga", "thể thao"],
        intro: "Vận động nhẹ giúp cơ thể tiết endorphin:",
        suggestions: &[
            "Đi bộ nhanh 20 phút quanh khu nhà",
            "Tập 10 phút yoga với các động tác giãn cơ cơ bản",
            "Thử bài tập hít thở 4-7-8 sau khi vận động",
        ],
    },
    SuggestionBundle {
        topic: SuggestionTopic::Movies,
        keywords: &["phim"],
        intro: "Một bộ phim nhẹ nhàng có thể cải thiện tâm trạng:",
        suggestions: &[
            "Xem một bộ phim hoạt hình ấm áp",
            "Chọn phim hài mà bạn đã từng cười thật to",
            "Rủ một người bạn cùng xem và trò chuyện sau đó",
        ],
    },
    SuggestionBundle {
        topic: SuggestionTopic::Books,
        keywords: &["sách", "đọc"],
        intro: "Đọc sách giúp tâm trí chậm lại:",
        suggestions: &[
            "Đọc vài trang sách về chánh niệm trước khi ngủ",
            "Thử một cuốn tiểu thuyết ngắn để tạm rời xa căng thẳng",
            "Ghi lại một câu trích dẫn khiến bạn thấy được an ủi",
        ],
    },
    SuggestionBundle {
        topic: SuggestionTopic::Sleep,
        keywords: &["mất ngủ", "giấc ngủ", "ngủ"],
        intro: "Một giấc ngủ ngon bắt đầu từ thói quen nhỏ:",
        suggestions: &[
            "Tắt màn hình điện thoại 30 phút trước khi ngủ",
            "Giữ phòng ngủ tối, mát và yên tĩnh",
            "Thử thiền quét cơ thể 10 phút khi nằm xuống",
        ],
    },
    SuggestionBundle {
        topic: SuggestionTopic::Food,
        keywords: &["món ăn", "đồ ăn", "nấu"],
        intro: "Ăn uống lành mạnh cũng nuôi dưỡng cảm xúc:",
        suggestions: &[
            "Tự nấu một món đơn giản mà bạn yêu thích",
            "Bổ sung trái cây và uống đủ nước trong ngày",
            "Ăn chậm và chú ý đến hương vị của từng miếng",
        ],
    },
];

static DEFAULT_BUNDLE: SuggestionBundle = SuggestionBundle {
    topic: SuggestionTopic::General,
    keywords: &[],
    intro: "Cảm ơn bạn đã chia sẻ. Một vài gợi ý nhỏ cho bạn:",
    suggestions: &[
        "Hít thở sâu 5 lần, chậm rãi và đều đặn",
        "Ghi lại cảm xúc của bạn trong nhật ký EmoCare",
        "Ra ngoài hít thở không khí trong lành khoảng 10 phút",
        "Nâng cấp Gold để trò chuyện sâu hơn với trợ lý AI",
    ],
};

fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

pub fn detect_crisis(message: &str) -> bool {
    let normalized = normalize(message);
    CRISIS_KEYWORDS
        .iter()
        .any(|keyword| normalized.contains(keyword))
}

pub fn route_suggestions(message: &str) -> &'static SuggestionBundle {
    let normalized = normalize(message);
    BUNDLES
        .iter()
        .find(|bundle| {
            bundle
                .keywords
                .iter()
                .any(|keyword| normalized.contains(keyword))
        })
        .unwrap_or(&DEFAULT_BUNDLE)
}

pub fn render_suggestions(bundle: &SuggestionBundle) -> String {
    let mut lines = vec![bundle.intro.to_string()];
    lines.extend(bundle.suggestions.iter().map(|item| format!("• {}", item)));
    lines.join("\n")
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SystemPrompt {
    Crisis,
    Anxiety,
    Sadness,
    Sleep,
    GoldDefault,
    FreeDefault,
}

const ANXIETY_KEYWORDS: [&str; 5] = ["lo âu", "căng thẳng", "áp lực", "stress", "hoảng"];
const SADNESS_KEYWORDS: [&str; 4] = ["buồn", "cô đơn", "trầm cảm", "khóc"];
const SLEEP_KEYWORDS: [&str; 2] = ["mất ngủ", "ngủ không"];

const BASE_INSTRUCTION: &str = "Bạn là EmoCare, trợ lý hỗ trợ sức khỏe tinh thần nói tiếng Việt. \
Hãy lắng nghe, đồng cảm, trả lời ngắn gọn và không đưa ra chẩn đoán y khoa.";

impl SystemPrompt {
    pub fn text(&self) -> String {
        let focus = match self {
            SystemPrompt::Crisis => {
                "Người dùng có dấu hiệu khủng hoảng. Ưu tiên an toàn: thể hiện sự quan tâm, \
khuyến khích họ liên hệ ngay đường dây nóng 115 hoặc 096 306 1414 và người thân, \
không phán xét và không để họ một mình với cảm xúc này."
            }
            SystemPrompt::Anxiety => {
                "Người dùng đang lo âu hoặc căng thẳng. Hướng dẫn kỹ thuật hít thở, \
chia nhỏ vấn đề và gợi ý các bước hành động cụ thể."
            }
            SystemPrompt::Sadness => {
                "Người dùng đang buồn hoặc cô đơn. Công nhận cảm xúc của họ, \
khuyến khích kết nối với người thân và hoạt động nhẹ nhàng."
            }
            SystemPrompt::Sleep => {
                "Người dùng gặp vấn đề về giấc ngủ. Đưa ra lời khuyên vệ sinh giấc ngủ \
và bài tập thư giãn trước khi ngủ."
            }
            SystemPrompt::GoldDefault => {
                "Người dùng là thành viên Gold. Trò chuyện sâu, đặt câu hỏi mở \
và cá nhân hóa lời khuyên theo lịch sử trò chuyện."
            }
            SystemPrompt::FreeDefault => "Trả lời ngắn gọn với các gợi ý thực tế.",
        };
        format!("{} {}", BASE_INSTRUCTION, focus)
    }
}

/// Crisis language overrides everything; otherwise the topic decides, then the tier default.
pub fn select_system_prompt(message: &str, tier: UserTier) -> SystemPrompt {
    if detect_crisis(message) {
        return SystemPrompt::Crisis;
    }

    let normalized = normalize(message);
    let matches = |keywords: &[&str]| keywords.iter().any(|k| normalized.contains(k));
    if matches(&ANXIETY_KEYWORDS) {
        SystemPrompt::Anxiety
    } else if matches(&SADNESS_KEYWORDS) {
        SystemPrompt::Sadness
    } else if matches(&SLEEP_KEYWORDS) {
        SystemPrompt::Sleep
    } else {
        match tier {
            UserTier::Gold => SystemPrompt::GoldDefault,
            UserTier::Free => SystemPrompt::FreeDefault,
        }
    }
}

pub fn trim_history<T>(history: &[T], window: usize) -> &[T] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

pub fn conversation_title(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    title.push('…');
    title
}

/// One turn of history as sent to the generative model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub history: Vec<ChatTurn>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Suggestions,
    Ai,
    /// The AI gateway failed and canned suggestions were returned instead.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendChatbotMessageModel {
    pub conversation_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatbotReplyModel {
    pub conversation_id: Uuid,
    pub reply: String,
    pub source: ReplySource,
    pub topic: Option<SuggestionTopic>,
    pub crisis: bool,
    /// Messages left today for free users; `None` means unlimited.
    pub remaining_today: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationModel {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConversationEntity> for ConversationModel {
    fn from(entity: ConversationEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessageModel {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ConversationMessageEntity> for ConversationMessageModel {
    fn from(entity: ConversationMessageEntity) -> Self {
        Self {
            id: entity.id,
            role: MessageRole::from_str(&entity.role),
            content: entity.content,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatbotUsageModel {
    pub tier: UserTier,
    pub used_today: i32,
    pub daily_limit: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coffee_message_gets_the_cafe_bundle() {
        let bundle = route_suggestions("Mình muốn đi uống cà phê cho đỡ buồn");
        assert_eq!(bundle.topic, SuggestionTopic::Cafes);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(route_suggestions("NGHE NHẠC gì bây giờ?").topic, SuggestionTopic::Music);
        assert_eq!(route_suggestions("Phim hay không?").topic, SuggestionTopic::Movies);
    }

    #[test]
    fn unknown_message_falls_back_to_default_bundle() {
        let bundle = route_suggestions("xin chào");
        assert_eq!(bundle.topic, SuggestionTopic::General);
        assert!(render_suggestions(bundle).starts_with(DEFAULT_BUNDLE.intro));
    }

    #[test]
    fn crisis_bundle_wins_over_topics() {
        let bundle = route_suggestions("uống cà phê xong mình muốn chết");
        assert_eq!(bundle.topic, SuggestionTopic::Crisis);
    }

    #[test]
    fn crisis_keyword_selects_crisis_prompt_for_every_tier() {
        for tier in [UserTier::Free, UserTier::Gold] {
            assert_eq!(
                select_system_prompt("Tôi đang nghĩ đến chuyện tự tử", tier),
                SystemPrompt::Crisis
            );
        }
    }

    #[test]
    fn topic_prompt_precedes_tier_default() {
        assert_eq!(
            select_system_prompt("dạo này áp lực công việc quá", UserTier::Gold),
            SystemPrompt::Anxiety
        );
        assert_eq!(
            select_system_prompt("mình thấy cô đơn", UserTier::Free),
            SystemPrompt::Sadness
        );
        assert_eq!(
            select_system_prompt("hôm nay thế nào", UserTier::Gold),
            SystemPrompt::GoldDefault
        );
        assert_eq!(
            select_system_prompt("hôm nay thế nào", UserTier::Free),
            SystemPrompt::FreeDefault
        );
    }

    #[test]
    fn rendered_bundle_lists_every_suggestion() {
        let bundle = route_suggestions("cafe");
        let rendered = render_suggestions(bundle);
        assert_eq!(rendered.lines().count(), bundle.suggestions.len() + 1);
    }

    #[test]
    fn history_keeps_the_most_recent_window() {
        let history: Vec<i32> = (0..15).collect();
        assert_eq!(trim_history(&history, HISTORY_WINDOW), &history[5..]);
        assert_eq!(trim_history(&history[..3], HISTORY_WINDOW), &history[..3]);
    }

    #[test]
    fn long_titles_are_truncated_by_characters() {
        let title = conversation_title(&"ă".repeat(60));
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 1);
        assert!(title.ends_with('…'));
        assert_eq!(conversation_title("  chào  "), "chào");
    }
}
