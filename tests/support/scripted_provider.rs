use async_trait::async_trait;
use nutrisight::providers::{ChatRequest, Provider};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Provider that replays canned replies in order and records how many
/// messages each request carried.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    message_counts: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|reply| (*reply).to_string()).collect()),
            message_counts: Mutex::new(Vec::new()),
        }
    }

    pub fn message_counts(&self) -> Vec<usize> {
        self.message_counts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<String> {
        self.message_counts
            .lock()
            .unwrap()
            .push(request.messages.len());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }
}
