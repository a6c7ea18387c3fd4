use tracing::warn;

use crate::knowledge::KnowledgeFacts;

/// Render the instruction prompt sent to the model.
///
/// The question is embedded as a JSON string literal, so quotes and line
/// breaks in user text are escaped and cannot break out of the `Savol:` line.
pub fn build_prompt(question: &str, facts: &KnowledgeFacts) -> String {
    let facts_json = serde_json::to_string(facts).unwrap_or_else(|e| {
        warn!("Failed to serialize knowledge facts for prompt: {}", e);
        String::from("{}")
    });
    let quoted_question = serde_json::Value::from(question).to_string();

    format!(
        "Siz {} chatbotisiz. Foydalanuvchining savoliga faqat markaz haqidagi ma'lumotlar doirasida javob bering.\n\n\
        Markaz ma'lumotlari:\n{}\n\n\
        Savol: {}\nJavob:",
        facts.name, facts_json, quoted_question
    )
}
