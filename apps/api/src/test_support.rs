//! Shared fixtures for handler and pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::jobs::MemoryJobQueue;
use crate::llm_client::{GenerationParams, LlmError, TextGenerator};
use crate::state::AppState;
use crate::store::memory::MemorySongStore;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub const GOOD_SONG_JSON: &str = r#"{
  "songTitle": "된장찌개 끓던 저녁",
  "lyrics": "[Intro]\n김이 모락모락 오르던 부엌\n\n[Verse 1]\n해 질 녘 골목 끝에 어머니 목소리\n\n[Chorus]\n그립구려 그 저녁이",
  "styleTags": "korean ballad, warm, soft female vocal, piano, strings, slow tempo"
}"#;

enum Script {
    Reply(String),
    SlowReply(String, Duration),
    Fail,
    Hang,
}

/// `TextGenerator` that answers from a fixed script and records prompts.
pub struct ScriptedGenerator {
    script: Script,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedGenerator {
    fn with(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn reply(text: &str) -> Self {
        Self::with(Script::Reply(text.to_string()))
    }

    /// Replies with `text` after `delay`, like a model that takes a while.
    pub fn slow_reply(text: &str, delay: Duration) -> Self {
        Self::with(Script::SlowReply(text.to_string(), delay))
    }

    pub fn failing() -> Self {
        Self::with(Script::Fail)
    }

    pub fn hanging() -> Self {
        Self::with(Script::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, params: &GenerationParams<'_>) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(params.prompt.to_string());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::SlowReply(text, delay) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Script::Fail => Err(LlmError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::EmptyContent)
            }
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        redis_url: None,
        gemini_api_key: "unused".to_string(),
        admin_token: ADMIN_TOKEN.to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        generation_timeout: Duration::from_secs(30),
        stale_claim_after: Duration::from_secs(600),
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemorySongStore>,
    pub jobs: Arc<MemoryJobQueue>,
    pub generator: Arc<ScriptedGenerator>,
}

pub fn test_app(generator: ScriptedGenerator) -> TestApp {
    let store = Arc::new(MemorySongStore::new());
    let jobs = Arc::new(MemoryJobQueue::new());
    let generator = Arc::new(generator);
    let state = AppState {
        store: store.clone(),
        generator: generator.clone(),
        jobs: jobs.clone(),
        config: test_config(),
    };
    TestApp {
        state,
        store,
        jobs,
        generator,
    }
}
