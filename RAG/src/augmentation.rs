use crate::gemini_service::GenerationClient;
use crate::query_refiner::has_recency_marker;
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How the pipeline decides whether a prompt needs live web context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugmentationPolicy {
    /// Keyword and recency matching, no external call.
    Heuristic,
    /// Ask the generative model for a yes/no verdict.
    ModelDelegated,
    Always,
    Never,
}

impl FromStr for AugmentationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "model" | "model-delegated" | "model_delegated" => Ok(Self::ModelDelegated),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(anyhow::anyhow!(
                "unknown AUGMENTATION_POLICY '{}', expected heuristic, model, always or never",
                other
            )),
        }
    }
}

impl fmt::Display for AugmentationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heuristic => "heuristic",
            Self::ModelDelegated => "model",
            Self::Always => "always",
            Self::Never => "never",
        };
        f.write_str(name)
    }
}

const TRIGGER_PHRASES: &[&str] = &[
    "tin tức",
    "thời tiết",
    "tỷ giá",
    "giá vàng",
    "giá xăng",
    "kết quả trận",
    "kết quả xổ số",
    "kết quả bầu cử",
    "lịch thi đấu",
    "news",
    "weather",
    "exchange rate",
    "stock price",
    "live score",
    "final score",
    "election",
];

const DATE_PHRASES: &[&str] = &[
    "hôm nay là ngày bao nhiêu",
    "hôm nay là ngày mấy",
    "hôm nay ngày bao nhiêu",
    "hôm nay ngày mấy",
    "hôm nay là thứ mấy",
    "hôm nay thứ mấy",
    "what is today's date",
    "what's today's date",
    "what is the date today",
    "what's the date today",
    "what day is it today",
    "what day is today",
];

const AFFIRMATIVE_TOKENS: &[&str] = &["CÓ", "YES"];

pub struct AugmentationDecider {
    policy: AugmentationPolicy,
    generator: Arc<dyn GenerationClient>,
}

impl AugmentationDecider {
    pub fn new(policy: AugmentationPolicy, generator: Arc<dyn GenerationClient>) -> Self {
        Self { policy, generator }
    }

    pub fn policy(&self) -> AugmentationPolicy {
        self.policy
    }

    pub async fn needs_live_context(&self, prompt: &str) -> bool {
        match self.policy {
            AugmentationPolicy::Always => true,
            AugmentationPolicy::Never => false,
            AugmentationPolicy::Heuristic => matches_live_triggers(prompt),
            AugmentationPolicy::ModelDelegated => {
                match self.generator.generate(&classification_prompt(prompt)).await {
                    Ok(verdict) => {
                        log::info!("Augmentation verdict from model: {}", verdict.trim());
                        is_affirmative(&verdict)
                    }
                    Err(e) => {
                        log::warn!("Augmentation classification failed, answering without search: {}", e);
                        false
                    }
                }
            }
        }
    }
}

pub fn matches_live_triggers(prompt: &str) -> bool {
    let lowered = prompt.to_lowercase();
    has_recency_marker(&lowered) || TRIGGER_PHRASES.iter().any(|p| lowered.contains(p))
}

pub fn classification_prompt(prompt: &str) -> String {
    format!(
        r#"Bạn là bộ phân loại câu hỏi. Câu hỏi dưới đây có cần thông tin cập nhật từ internet (tin tức, sự kiện, số liệu mới, người đang giữ chức vụ) để trả lời chính xác không?
Chỉ trả lời đúng một từ: CÓ hoặc KHÔNG.

Câu hỏi: {prompt}"#
    )
}

/// Reads the verdict from its first word only; explanations that follow a
/// leading KHÔNG/NO often contain "có".
pub fn is_affirmative(verdict: &str) -> bool {
    let first_word = verdict
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_uppercase();
    AFFIRMATIVE_TOKENS.contains(&first_word.as_str())
}

pub fn is_date_query(prompt: &str) -> bool {
    let lowered = prompt.to_lowercase().replace('’', "'");
    DATE_PHRASES.iter().any(|p| lowered.contains(p))
}

/// Local answer for date questions.
pub fn date_answer(today: NaiveDate) -> String {
    format!(
        "Hôm nay là {}, ngày {} tháng {} năm {}.",
        weekday_name(today.weekday()),
        today.day(),
        today.month(),
        today.year()
    )
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Thứ Hai",
        Weekday::Tue => "Thứ Ba",
        Weekday::Wed => "Thứ Tư",
        Weekday::Thu => "Thứ Năm",
        Weekday::Fri => "Thứ Sáu",
        Weekday::Sat => "Thứ Bảy",
        Weekday::Sun => "Chủ Nhật",
    }
}
