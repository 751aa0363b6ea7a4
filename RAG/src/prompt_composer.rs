use crate::models::Snippet;
use chrono::NaiveDate;

/// Builds the prompt sent to the model. Without snippets the question is
/// sent as is; with snippets the model is told to stay within them.
pub fn compose_prompt(query: &str, snippets: &[Snippet], today: NaiveDate) -> String {
    if snippets.is_empty() {
        return query.to_string();
    }

    let facts = snippets
        .iter()
        .map(|s| format!("- {}: {}", s.title, s.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Bạn là trợ lý học thuật, trả lời chính xác và cập nhật bằng ngôn ngữ của câu hỏi.
Các thông tin dưới đây được tìm kiếm trên internet vào ngày {date}.

Thông tin:
{facts}

Câu hỏi: {query}

Chỉ sử dụng các thông tin trên để trả lời. Nếu các thông tin này không đủ để trả lời, hãy nói rõ là không đủ thông tin.
Trả lời:"#,
        date = today.format("%d/%m/%Y"),
    )
}
