//! The ordered transcript of one chat and its turn-taking rules.

use shared::chat::ChatMessage;
use shared::response::QueryResponse;

/// Shown in place of an answer the backend returned empty.
pub const EMPTY_ANSWER_FALLBACK: &str = "No response received.";

/// Append-only transcript plus the pending-turn flag the view derives its
/// "thinking" indicator from. No placeholder entry is inserted while a turn
/// is in flight, so the transcript stays accurate even if the turn is
/// abandoned.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    current_question: Option<String>,
    awaiting_response: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True between `submit` and `resolve_assistant_turn`.
    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// The question whose answer is pending, if any.
    pub fn current_question(&self) -> Option<&str> {
        self.current_question.as_deref()
    }

    /// Start a turn: guard, append the user message, mark the turn pending.
    /// Returns whether the caller should dispatch the request. A blank
    /// question or an already-pending turn leaves the transcript untouched.
    pub fn submit(&mut self, question: &str) -> bool {
        if self.awaiting_response || question.trim().is_empty() {
            return false;
        }

        self.append_user_message(question);
        self.begin_assistant_turn();
        self.current_question = Some(question.to_string());
        true
    }

    pub fn append_user_message(&mut self, content: &str) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn begin_assistant_turn(&mut self) {
        self.awaiting_response = true;
    }

    /// Close the pending turn. Exactly one assistant entry lands whether the
    /// turn succeeded or failed, so transcript length stays at two entries
    /// per submitted question.
    pub fn resolve_assistant_turn(&mut self, outcome: Result<QueryResponse, String>) {
        let message = match outcome {
            Ok(response) => {
                let content = if response.answer.trim().is_empty() {
                    EMPTY_ANSWER_FALLBACK.to_string()
                } else {
                    response.answer
                };
                ChatMessage::assistant(&content, response.sources)
            }
            Err(reason) => ChatMessage::assistant(&format!("Error: {}", reason), Vec::new()),
        };

        self.messages.push(message);
        self.awaiting_response = false;
        self.current_question = None;
    }
}
