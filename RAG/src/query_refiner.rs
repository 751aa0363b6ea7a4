//! Turns a user prompt into a query that search engines handle well.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static RECENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(19|20)\d{2}\b|\b(current|currently|latest|recent|recently|today|now|this year)\b|hiện nay|hiện tại|mới nhất|gần đây|đương nhiệm|hôm nay|bây giờ|năm nay",
    )
    .expect("recency regex is valid")
});

/// Well-known questions and the phrasing that finds them best. Keys are
/// lower case; first match wins.
const CANONICAL_QUERIES: &[(&str, &str)] = &[
    (
        "who is the current president of the united states",
        "current President of the United States",
    ),
    (
        "who is the president of the united states",
        "current President of the United States",
    ),
    (
        "who is the current prime minister of the united kingdom",
        "current Prime Minister of the United Kingdom",
    ),
    ("tổng thống mỹ hiện nay là ai", "tổng thống Hoa Kỳ đương nhiệm"),
    ("tổng thống mỹ là ai", "tổng thống Hoa Kỳ đương nhiệm"),
    ("thủ tướng việt nam hiện nay là ai", "thủ tướng Chính phủ Việt Nam đương nhiệm"),
    ("chủ tịch nước việt nam hiện nay là ai", "chủ tịch nước Việt Nam đương nhiệm"),
    ("tổng bí thư hiện nay là ai", "tổng bí thư Đảng Cộng sản Việt Nam đương nhiệm"),
];

/// Refines `raw` for web search: trim, canonical rewrite, question mark,
/// then a month/year hint when the text carries no sense of time.
/// Refining an already refined query returns it unchanged.
pub fn refine_query(raw: &str, today: NaiveDate) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut refined = canonical_rewrite(trimmed)
        .map(str::to_string)
        .unwrap_or_else(|| trimmed.to_string());

    if !has_question_mark(&refined) {
        let kept = refined.trim_end_matches(['.', '!']).trim_end().len();
        refined.truncate(kept);
        refined.push('?');
    }

    if !has_recency_marker(&refined) {
        refined.push_str(&format!(" (tháng {} năm {})", today.month(), today.year()));
    }

    refined
}

pub fn canonical_rewrite(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    CANONICAL_QUERIES
        .iter()
        .find(|(question, _)| lowered.contains(question))
        .map(|(_, phrasing)| *phrasing)
}

pub fn has_recency_marker(text: &str) -> bool {
    RECENCY_RE.is_match(text)
}

fn has_question_mark(text: &str) -> bool {
    text.contains('?') || text.contains('？')
}
