use crate::chat::Conversation;
use crate::config::Config;
use crate::gemini::GeminiClient;
use anyhow::Result;
use futures_util::future::FutureExt;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Chat state
    pub conversation: Conversation,
    pub answer_task: Option<JoinHandle<Result<String>>>,

    // Chat viewport (updated during render, used for scroll math)
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Animation state: 0-2 for the ellipsis on the thinking indicator
    pub animation_frame: u8,

    // Provider
    pub gemini: GeminiClient,
    pub model: String,
}

impl App {
    pub fn new(api_key: &str, config: &Config) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            conversation: Conversation::new(),
            answer_task: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            gemini: GeminiClient::new(api_key),
            model: config.model(),
        }
    }

    /// Run the conversation's submit guard and, when it passes, spawn the
    /// background request. Only the captured question is sent; prior turns
    /// stay local to the transcript.
    pub fn submit_question(&mut self) {
        let Some(question) = self.conversation.submit() else {
            return;
        };

        self.scroll_chat_to_bottom();

        let gemini = self.gemini.clone();
        let model = self.model.clone();
        self.answer_task = Some(tokio::spawn(async move {
            gemini.generate(&model, &question).await
        }));
    }

    /// Check the in-flight request without blocking and settle the
    /// conversation once it completes. Called from the main loop on every
    /// tick. A panicked task settles as a failure like any other error.
    pub fn poll_answer(&mut self) {
        let finished = self
            .answer_task
            .as_ref()
            .is_some_and(JoinHandle::is_finished);
        if !finished {
            return;
        }

        let Some(task) = self.answer_task.take() else {
            return;
        };

        // now_or_never is safe here: the task already finished
        let result = match task.now_or_never() {
            Some(Ok(result)) => result,
            Some(Err(join_err)) => Err(anyhow::anyhow!("answer task panicked: {join_err}")),
            None => return,
        };

        self.conversation.settle(result);
        self.scroll_chat_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_awaiting_answer() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(max);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.chat_height / 2);
    }

    pub fn scroll_half_page_down(&mut self) {
        let max = self.max_chat_scroll();
        self.chat_scroll = (self.chat_scroll + self.chat_height / 2).min(max);
    }

    pub fn scroll_chat_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll so the newest message (and the "Thinking..." indicator, when
    /// one is showing) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.total_chat_lines().saturating_sub(visible_height)
    }

    /// Estimate of the rendered transcript height, mirroring the layout in
    /// ui.rs: a role line per message, wrapped content lines, and a blank
    /// separator line.
    fn total_chat_lines(&self) -> u16 {
        // Default width before the first render
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.conversation.messages() {
            total_lines += 1; // Role line ("You:" or "AI:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.conversation.is_awaiting_answer() {
            total_lines += 2; // "AI:" + "Thinking..."
        }

        total_lines
    }
}
