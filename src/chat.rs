use anyhow::Result;

/// Shown in place of a real answer when the API call fails.
pub const FALLBACK_ANSWER: &str = "Sorry - Something went wrong. Please try again!";

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Chat transcript plus the pending input and in-flight flag.
///
/// Exactly two states: idle and awaiting an answer. `submit` moves to
/// awaiting (and is refused while already there), `settle` moves back
/// regardless of whether the call succeeded.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    input: String,
    cursor: usize,
    awaiting_answer: bool,
    last_error: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.awaiting_answer
    }

    /// Detail of the most recent failure, kept for display only. The
    /// transcript itself only ever carries [`FALLBACK_ANSWER`].
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the pending input wholesale, cursor at the end.
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.cursor = self.input.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Try to send the pending input. Returns the captured question when the
    /// guard passes; the caller dispatches it to the provider and later calls
    /// [`settle`](Self::settle) with the outcome.
    ///
    /// Guard: the trimmed input must be non-empty and no answer may already
    /// be in flight. A refused submit changes nothing.
    ///
    /// On success the input is cleared immediately and the question is
    /// appended to the transcript before the network call ever starts, so
    /// the UI shows the optimistic "sent" state while waiting.
    pub fn submit(&mut self) -> Option<String> {
        if self.awaiting_answer || self.input.trim().is_empty() {
            return None;
        }

        self.awaiting_answer = true;
        let question = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.last_error = None;
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: question.clone(),
        });
        Some(question)
    }

    /// Record the outcome of the in-flight request. A failure becomes the
    /// fixed fallback answer in the transcript; nothing is retried. The
    /// awaiting flag is always cleared so the input is never left stuck.
    pub fn settle(&mut self, result: Result<String>) {
        match result {
            Ok(answer) => {
                self.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: answer,
                });
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: FALLBACK_ANSWER.to_string(),
                });
            }
        }
        self.awaiting_answer = false;
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_submit_empty_input_is_noop() {
        let mut conv = Conversation::new();
        assert!(conv.submit().is_none());
        assert!(conv.messages().is_empty());
        assert!(!conv.is_awaiting_answer());
    }

    #[test]
    fn test_submit_whitespace_only_is_noop() {
        let mut conv = Conversation::new();
        conv.set_input("   \t  ");
        assert!(conv.submit().is_none());
        assert!(conv.messages().is_empty());
        assert_eq!(conv.input(), "   \t  ");
        assert!(!conv.is_awaiting_answer());
    }

    #[test]
    fn test_submit_clears_input_before_settle() {
        let mut conv = Conversation::new();
        conv.set_input("What is 2+2?");
        let question = conv.submit();
        assert_eq!(question.as_deref(), Some("What is 2+2?"));
        // Input is empty while the answer is still pending
        assert_eq!(conv.input(), "");
        assert_eq!(conv.cursor(), 0);
        assert!(conv.is_awaiting_answer());
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].role, ChatRole::User);
        assert_eq!(conv.messages()[0].content, "What is 2+2?");
    }

    #[test]
    fn test_submit_while_awaiting_is_rejected() {
        let mut conv = Conversation::new();
        conv.set_input("first");
        assert!(conv.submit().is_some());

        conv.set_input("second");
        assert!(conv.submit().is_none());
        // Only the first question made it into the transcript
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].content, "first");
        // The rejected input is untouched
        assert_eq!(conv.input(), "second");
    }

    #[test]
    fn test_settle_success_appends_answer() {
        let mut conv = Conversation::new();
        conv.set_input("What is 2+2?");
        conv.submit();
        conv.settle(Ok("4".to_string()));

        assert!(!conv.is_awaiting_answer());
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.messages()[1].role, ChatRole::Assistant);
        assert_eq!(conv.messages()[1].content, "4");
        assert!(conv.last_error().is_none());
    }

    #[test]
    fn test_settle_failure_appends_fallback() {
        let mut conv = Conversation::new();
        conv.set_input("x");
        conv.submit();
        conv.settle(Err(anyhow!("connection refused")));

        assert!(!conv.is_awaiting_answer());
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.messages()[1].role, ChatRole::Assistant);
        assert_eq!(conv.messages()[1].content, FALLBACK_ANSWER);
        assert_eq!(conv.last_error(), Some("connection refused"));
    }

    #[test]
    fn test_submit_allowed_again_after_failure() {
        let mut conv = Conversation::new();
        conv.set_input("x");
        conv.submit();
        conv.settle(Err(anyhow!("boom")));

        conv.set_input("y");
        assert!(conv.submit().is_some());
        assert_eq!(conv.messages().len(), 3);
        // A fresh submit drops the stale error detail
        assert!(conv.last_error().is_none());
    }

    #[test]
    fn test_set_input_idempotent() {
        let mut conv = Conversation::new();
        conv.set_input("hello");
        let cursor = conv.cursor();
        conv.set_input("hello");
        assert_eq!(conv.input(), "hello");
        assert_eq!(conv.cursor(), cursor);
        assert!(conv.messages().is_empty());
        assert!(!conv.is_awaiting_answer());
    }

    #[test]
    fn test_rapid_double_submit_one_question() {
        let mut conv = Conversation::new();
        conv.set_input("only once");
        let first = conv.submit();
        let second = conv.submit();
        assert!(first.is_some());
        assert!(second.is_none());
        let questions = conv
            .messages()
            .iter()
            .filter(|m| m.role == ChatRole::User)
            .count();
        assert_eq!(questions, 1);
    }

    #[test]
    fn test_cursor_editing_utf8() {
        let mut conv = Conversation::new();
        conv.insert_char('é');
        conv.insert_char('b');
        conv.move_cursor_left();
        conv.insert_char('a');
        assert_eq!(conv.input(), "éab");
        conv.delete_char_before_cursor();
        assert_eq!(conv.input(), "éb");
        conv.move_cursor_home();
        conv.delete_char_at_cursor();
        assert_eq!(conv.input(), "b");
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("abc", 0), 0);
        assert_eq!(char_to_byte_index("abc", 2), 2);
        assert_eq!(char_to_byte_index("abc", 10), 3);
        assert_eq!(char_to_byte_index("éé", 1), 2);
    }
}
