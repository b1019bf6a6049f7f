//! Deterministic stand-ins for the providers, shared by unit and router tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;

use crate::config::Config;
use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::jobs::{JobPosting, JobQuery, JobSource};
use crate::llm_client::{CompletionBackend, CompletionError, Prompt, StructuredClient};
use crate::schema::scoring::VerdictPolicy;
use crate::speech::{AudioStream, SpeechRequest, SpeechService, Transcription, TranscriptionRequest};
use crate::state::AppState;

enum Script {
    Queue(VecDeque<String>),
    Repeat(String),
    Fail(CompletionError),
}

/// Completion backend that replays scripted outputs and records every prompt.
pub struct FakeCompletion {
    script: Mutex<Script>,
    prompts: Mutex<Vec<Prompt>>,
}

impl FakeCompletion {
    fn with(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Returns each output once, in order; further calls fail as transport errors.
    pub fn new(outputs: Vec<&str>) -> Arc<Self> {
        Self::with(Script::Queue(outputs.into_iter().map(str::to_string).collect()))
    }

    pub fn repeating(output: &str) -> Arc<Self> {
        Self::with(Script::Repeat(output.to_string()))
    }

    pub fn failing(error: CompletionError) -> Arc<Self> {
        Self::with(Script::Fail(error))
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

fn replay(error: &CompletionError) -> CompletionError {
    match error {
        CompletionError::Transport(msg) => CompletionError::Transport(msg.clone()),
        CompletionError::SchemaViolation(e) => CompletionError::SchemaViolation(e.clone()),
        CompletionError::MalformedOutput(msg) => CompletionError::MalformedOutput(msg.clone()),
    }
}

#[async_trait]
impl CompletionBackend for FakeCompletion {
    async fn generate_json(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match &mut *self.script.lock().unwrap() {
            Script::Queue(outputs) => outputs
                .pop_front()
                .ok_or_else(|| CompletionError::Transport("no scripted output left".to_string())),
            Script::Repeat(output) => Ok(output.clone()),
            Script::Fail(error) => Err(replay(error)),
        }
    }
}

/// `prefix-1`, `prefix-2`, ...
pub struct SequentialIds {
    prefix: String,
    next: AtomicUsize,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: AtomicUsize::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{n}", self.prefix)
    }
}

pub fn analysis_json() -> String {
    serde_json::json!({
        "description_summary": "Backend internship building REST APIs in Rust.",
        "requirements": ["REST API development", "SQL", "Version control with Git"],
        "required_skills": ["Rust", "SQL", "Git", "Docker"]
    })
    .to_string()
}

/// Job source that serves a fixed page of postings and records each query.
#[derive(Default)]
pub struct FakeJobs {
    postings: Vec<JobPosting>,
    fail_with_status: Option<u16>,
    queries: Mutex<Vec<JobQuery>>,
}

impl FakeJobs {
    pub fn with_postings(postings: Vec<JobPosting>) -> Self {
        Self {
            postings,
            ..Self::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<JobQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSource for FakeJobs {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, AppError> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(status) = self.fail_with_status {
            return Err(AppError::Upstream {
                provider: "JSearch",
                status,
                message: "rate limited".to_string(),
            });
        }
        Ok(self.postings.clone())
    }
}

/// Speech service that streams fixed chunks and echoes transcription options.
pub struct FakeSpeech {
    chunks: Vec<&'static [u8]>,
    requests: Mutex<Vec<TranscriptionRequest>>,
}

impl Default for FakeSpeech {
    fn default() -> Self {
        Self {
            chunks: vec![&b"ID3"[..], &b"\x00\x01"[..], &b"\x02"[..]],
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl FakeSpeech {
    pub fn transcriptions(&self) -> Vec<TranscriptionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechService for FakeSpeech {
    async fn synthesize(&self, _request: &SpeechRequest) -> Result<AudioStream, AppError> {
        let chunks: Vec<Result<Bytes, AppError>> = self
            .chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(*c)))
            .collect();
        Ok(AudioStream::from_stream(stream::iter(chunks)))
    }

    async fn transcribe(&self, request: TranscriptionRequest) -> Result<Transcription, AppError> {
        let transcription = Transcription {
            transcription: format!("{} bytes", request.audio.len()),
            language_code: request.language_code.clone(),
            audio_events: request.tag_audio_events.then(Vec::new),
            speakers: request.diarize.then(|| vec!["speaker_0".to_string()]),
        };
        self.requests.lock().unwrap().push(request);
        Ok(transcription)
    }
}

pub fn test_config() -> Config {
    Config {
        gemini_api_key: Some("test".to_string()),
        rapidapi_key: Some("test".to_string()),
        elevenlabs_api_key: "test".to_string(),
        verdict_policy: VerdictPolicy::Trust,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub fn test_state(llm: Arc<FakeCompletion>, jobs: Arc<FakeJobs>, speech: Arc<FakeSpeech>) -> AppState {
    AppState {
        llm: StructuredClient::new(llm),
        jobs,
        speech,
        ids: Arc::new(SequentialIds::new("id")),
        config: test_config(),
    }
}
