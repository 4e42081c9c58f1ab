use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use sillage_core::error::{ModelError, Result, SillageError};
use sillage_core::model::{CallOptions, CompletionModel, CompletionRequest};

/// A scripted step: a reply text or an error message.
pub type MockReply = std::result::Result<String, String>;

/// Mock completion model for testing without HTTP.
///
/// Replies are consumed front-to-back; once a script is exhausted further
/// calls error, so tests fail loudly instead of silently reusing replies.
pub struct MockCompletionModel {
    script: Mutex<VecDeque<MockReply>>,
    default: Option<MockReply>,
}

impl MockCompletionModel {
    /// Every call returns the same reply text.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: Some(Ok(text.into())),
        }
    }

    /// Every call fails with the given error message.
    pub fn failing(error_msg: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: Some(Err(error_msg.into())),
        }
    }

    /// Calls consume the script in order; an exhausted script is an error.
    pub fn with_script(script: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(script)),
            default: None,
        }
    }

    fn next_reply(&self) -> MockReply {
        let mut script = self.script.lock().unwrap();
        match script.pop_front() {
            Some(reply) => reply,
            None => self
                .default
                .clone()
                .unwrap_or_else(|| Err("mock script exhausted".into())),
        }
    }
}

#[async_trait]
impl CompletionModel for MockCompletionModel {
    async fn complete(
        &self,
        _request: &CompletionRequest,
        _options: &CallOptions,
    ) -> Result<String> {
        self.next_reply()
            .map_err(|msg| SillageError::Model(ModelError::ApiRequest(msg)))
    }

    fn model_name(&self) -> &str {
        "mock-completion"
    }
}
