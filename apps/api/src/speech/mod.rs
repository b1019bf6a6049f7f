//! Speech adapter for text-to-speech and speech-to-text via ElevenLabs.

use std::collections::BTreeSet;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;

pub mod handlers;
pub mod stream;

pub use stream::AudioStream;

const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io/v1";
const REQUEST_TIMEOUT_SECS: u64 = 120;
pub const MAX_TTS_CHARS: usize = 5000;

fn default_voice_id() -> String {
    "JBFqnCBsd6RMkjVDRZzb".to_string()
}

fn default_tts_model() -> String {
    "eleven_turbo_v2_5".to_string()
}

fn default_output_format() -> String {
    "mp3_44100_128".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_tts_model")]
    pub model_id: String,
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl SpeechRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let len = self.text.chars().count();
        if len == 0 {
            return Err(AppError::InvalidRequest("text cannot be empty".to_string()));
        }
        if len > MAX_TTS_CHARS {
            return Err(AppError::InvalidRequest(format!(
                "text must be at most {MAX_TTS_CHARS} characters, got {len}"
            )));
        }
        Ok(())
    }

    /// MP3 formats stream as `audio/mpeg`; everything else is served as WAV.
    pub fn media_type(&self) -> (&'static str, &'static str) {
        if self.output_format.starts_with("mp3") {
            ("audio/mpeg", "mp3")
        } else {
            ("audio/wav", "wav")
        }
    }
}

/// Decoded multipart upload for `POST /tts/transcribe`.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: Bytes,
    pub file_name: String,
    pub content_type: Option<String>,
    pub model_id: String,
    pub tag_audio_events: bool,
    pub language_code: Option<String>,
    pub diarize: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    pub transcription: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_events: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SttResponse {
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    words: Vec<SttWord>,
}

#[derive(Debug, Deserialize)]
struct SttWord {
    #[serde(default)]
    text: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    speaker_id: Option<String>,
}

impl SttResponse {
    fn into_transcription(self, tag_audio_events: bool, diarize: bool) -> Transcription {
        let audio_events = tag_audio_events.then(|| {
            self.words
                .iter()
                .filter(|w| w.kind == "audio_event")
                .map(|w| w.text.clone())
                .collect()
        });
        let speakers = diarize.then(|| {
            self.words
                .iter()
                .filter_map(|w| w.speaker_id.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        });
        Transcription {
            transcription: self.text,
            language_code: self.language_code,
            audio_events,
            speakers,
        }
    }
}

/// Speech provider. Carried in `AppState` as `Arc<dyn SpeechService>`.
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, AppError>;
    async fn transcribe(&self, request: TranscriptionRequest) -> Result<Transcription, AppError>;
}

pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
        })
    }

    async fn upstream_error(response: reqwest::Response) -> AppError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        warn!("ElevenLabs returned {}: {}", status, message);
        AppError::Upstream {
            provider: "ElevenLabs",
            status,
            message,
        }
    }
}

fn transport(e: reqwest::Error) -> AppError {
    AppError::Transport(format!("ElevenLabs error: {e}"))
}

#[async_trait]
impl SpeechService for ElevenLabsClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, AppError> {
        #[derive(Serialize)]
        struct Body<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let response = self
            .client
            .post(format!(
                "{ELEVENLABS_API_BASE}/text-to-speech/{}/stream",
                request.voice_id
            ))
            .header("xi-api-key", &self.api_key)
            .query(&[("output_format", request.output_format.as_str())])
            .json(&Body {
                text: &request.text,
                model_id: &request.model_id,
            })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        debug!("Streaming synthesized audio for voice {}", request.voice_id);
        Ok(AudioStream::from_stream(
            response.bytes_stream().map(|chunk| chunk.map_err(transport)),
        ))
    }

    async fn transcribe(&self, request: TranscriptionRequest) -> Result<Transcription, AppError> {
        let mut file = multipart::Part::bytes(request.audio.to_vec()).file_name(request.file_name);
        if let Some(mime) = request.content_type.as_deref() {
            file = file
                .mime_str(mime)
                .map_err(|e| AppError::InvalidRequest(format!("invalid audio content type: {e}")))?;
        }

        let mut form = multipart::Form::new()
            .part("file", file)
            .text("model_id", request.model_id)
            .text("tag_audio_events", request.tag_audio_events.to_string())
            .text("diarize", request.diarize.to_string());
        if let Some(code) = request.language_code {
            form = form.text("language_code", code);
        }

        let response = self
            .client
            .post(format!("{ELEVENLABS_API_BASE}/speech-to-text"))
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let body = response.bytes().await.map_err(transport)?;
        let text = std::str::from_utf8(&body)
            .map_err(|e| AppError::AudioDecode(format!("transcript is not valid UTF-8: {e}")))?;
        let parsed: SttResponse = serde_json::from_str(text).map_err(|e| AppError::Upstream {
            provider: "ElevenLabs",
            status: 200,
            message: format!("unreadable transcription response: {e}"),
        })?;

        Ok(parsed.into_transcription(request.tag_audio_events, request.diarize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speech(text: &str, format: &str) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            voice_id: default_voice_id(),
            model_id: default_tts_model(),
            output_format: format.to_string(),
        }
    }

    #[test]
    fn test_speech_request_defaults() {
        let req: SpeechRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(req.voice_id, "JBFqnCBsd6RMkjVDRZzb");
        assert_eq!(req.model_id, "eleven_turbo_v2_5");
        assert_eq!(req.output_format, "mp3_44100_128");
    }

    #[test]
    fn test_speech_text_bounds() {
        assert!(speech("", "mp3_44100_128").validate().is_err());
        assert!(speech("hi", "mp3_44100_128").validate().is_ok());
        assert!(speech(&"é".repeat(MAX_TTS_CHARS), "mp3_44100_128").validate().is_ok());
        assert!(speech(&"a".repeat(MAX_TTS_CHARS + 1), "mp3_44100_128")
            .validate()
            .is_err());
    }

    #[test]
    fn test_media_type_follows_output_format() {
        assert_eq!(speech("x", "mp3_22050_32").media_type(), ("audio/mpeg", "mp3"));
        assert_eq!(speech("x", "pcm_16000").media_type(), ("audio/wav", "wav"));
    }

    #[test]
    fn test_stt_response_mapping() {
        let resp: SttResponse = serde_json::from_str(
            r#"{"language_code":"eng","language_probability":0.98,"text":"Hello (laughs) there",
                "words":[
                    {"text":"Hello","type":"word","speaker_id":"speaker_1"},
                    {"text":" ","type":"spacing","speaker_id":"speaker_1"},
                    {"text":"(laughs)","type":"audio_event","speaker_id":"speaker_0"},
                    {"text":"there","type":"word","speaker_id":"speaker_1"}
                ]}"#,
        )
        .unwrap();
        let t = resp.into_transcription(true, true);
        assert_eq!(t.transcription, "Hello (laughs) there");
        assert_eq!(t.language_code.as_deref(), Some("eng"));
        assert_eq!(t.audio_events, Some(vec!["(laughs)".to_string()]));
        assert_eq!(
            t.speakers,
            Some(vec!["speaker_0".to_string(), "speaker_1".to_string()])
        );
    }

    #[test]
    fn test_stt_optional_sections_omitted() {
        let resp: SttResponse = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        let t = resp.into_transcription(false, false);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v, serde_json::json!({"transcription": "hi"}));
    }
}
