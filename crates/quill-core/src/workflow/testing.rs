//! Test doubles shared by the workflow test suites.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use quill_types::checkpoint::{Checkpoint, CheckpointSummary};
use quill_types::error::RepositoryError;
use quill_types::llm::LlmError;

use crate::repository::checkpoint::CheckpointStore;

use super::generation::{ContentGenerator, GenerationRequest};

/// Generator that replays scripted results, then succeeds forever.
///
/// Unscripted calls produce `"Draft {n} about {topic}"` where `n` counts
/// all calls, so successive drafts are distinguishable.
pub(crate) struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(script: Vec<Result<&str, &str>>) -> Self {
        Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn always_ok() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(LlmError::Provider { message }),
            None => Ok(format!("Draft {call} about {}", request.topic)),
        }
    }
}

/// HashMap-backed store that counts writes and can be told to fail.
#[derive(Default)]
pub(crate) struct MockStore {
    entries: Mutex<HashMap<String, Checkpoint>>,
    puts: AtomicU32,
    fail_puts: bool,
}

impl MockStore {
    pub(crate) fn failing() -> Self {
        Self {
            fail_puts: true,
            ..Self::default()
        }
    }

    pub(crate) fn puts(&self) -> u32 {
        self.puts.load(Ordering::SeqCst)
    }

    pub(crate) fn peek(&self, thread_id: &str) -> Option<Checkpoint> {
        self.entries.lock().unwrap().get(thread_id).cloned()
    }
}

impl CheckpointStore for MockStore {
    async fn put(&self, checkpoint: Checkpoint) -> Result<(), RepositoryError> {
        if self.fail_puts {
            return Err(RepositoryError::Unavailable);
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(checkpoint.thread_id.clone(), checkpoint);
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>, RepositoryError> {
        Ok(self.peek(thread_id))
    }

    async fn list(&self) -> Result<Vec<CheckpointSummary>, RepositoryError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .map(Checkpoint::summary)
            .collect())
    }
}
