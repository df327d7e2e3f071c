//! Conversation history assembly for the language model

use chatai_llm::LlmMessage;

use crate::domain::entities::Message;

/// Persona sent as the first entry of every prompt
pub const SYSTEM_PERSONA: &str = "You are a helpful and friendly AI assistant.";

/// Build the prompt for `question` following `history` (chronological).
///
/// Layout: the system persona, then each prior exchange as a user entry
/// followed by an assistant entry, then `question` as the final user entry.
pub fn build_prompt(history: &[Message], question: &str) -> Vec<LlmMessage> {
    let mut prompt = Vec::with_capacity(2 * history.len() + 2);
    prompt.push(LlmMessage::system(SYSTEM_PERSONA));

    for message in history {
        prompt.push(LlmMessage::user(message.question.as_str()));
        prompt.push(LlmMessage::assistant(message.answer.as_str()));
    }

    prompt.push(LlmMessage::user(question));
    prompt
}
