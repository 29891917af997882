//! Payload rewrite for requests that overflowed a provider's context window.

use crate::api::types::{ChatCompletionRequest, ChatMessage, MessageContent};
use crate::provider::{CondenseError, Condenser};

const SUMMARY_PREFIX: &str = "Summary of earlier conversation: ";

/// Condense `payload` into a smaller request.
///
/// System messages and the final message are kept verbatim; everything in
/// between is folded into one summary system message placed before the final
/// message. With nothing to fold, the final message's text is condensed in
/// place.
pub async fn condense_payload(
    condenser: &dyn Condenser,
    payload: &ChatCompletionRequest,
    max_tokens: u32,
) -> Result<ChatCompletionRequest, CondenseError> {
    let Some((last, earlier)) = payload.messages.split_last() else {
        return Err(CondenseError::EmptyInput);
    };

    let foldable: Vec<String> = earlier
        .iter()
        .filter(|m| !m.is_system())
        .map(|m| format!("{}: {}", m.role, m.content.as_text()))
        .collect();

    let mut condensed = payload.clone();
    if foldable.is_empty() {
        let summary = condenser
            .condense(&[last.content.as_text()], max_tokens)
            .await?;
        if let Some(final_message) = condensed.messages.last_mut() {
            final_message.content = MessageContent::Text { content: summary };
        }
        return Ok(condensed);
    }

    let summary = condenser.condense(&foldable, max_tokens).await?;
    let mut messages: Vec<ChatMessage> = earlier.iter().filter(|m| m.is_system()).cloned().collect();
    messages.push(ChatMessage::text(
        "system",
        format!("{}{}", SUMMARY_PREFIX, summary),
    ));
    messages.push(last.clone());
    condensed.messages = messages;
    Ok(condensed)
}

/// Characters of message text in a payload.
pub fn payload_size(payload: &ChatCompletionRequest) -> usize {
    payload.messages.iter().map(|m| m.content.char_len()).sum()
}
