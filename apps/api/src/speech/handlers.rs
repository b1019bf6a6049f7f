use axum::{
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiMultipart};
use crate::speech::{SpeechRequest, Transcription, TranscriptionRequest};
use crate::state::AppState;

const DEFAULT_STT_MODEL: &str = "scribe_v1";

/// POST /tts/speak
///
/// Synthesizes speech and streams the audio back as it arrives.
pub async fn handle_speak(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SpeechRequest>,
) -> Result<Response, AppError> {
    request.validate()?;
    info!(
        voice = %request.voice_id,
        chars = request.text.chars().count(),
        "Synthesizing speech"
    );

    let audio = state.speech.synthesize(&request).await?;
    let (media_type, ext) = request.media_type();

    Ok((
        [
            (header::CONTENT_TYPE, media_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"speech.{ext}\""),
            ),
        ],
        Body::from_stream(audio),
    )
        .into_response())
}

/// POST /tts/transcribe
///
/// Multipart upload: `file` plus optional `model_id`, `tag_audio_events`,
/// `language_code` and `diarize` text fields.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<Transcription>, AppError> {
    let request = read_transcription_form(multipart).await?;
    info!(
        bytes = request.audio.len(),
        model = %request.model_id,
        "Transcribing audio"
    );

    let transcription = state.speech.transcribe(request).await?;
    Ok(Json(transcription))
}

async fn read_transcription_form(mut multipart: Multipart) -> Result<TranscriptionRequest, AppError> {
    let mut audio: Option<(Bytes, String, Option<String>)> = None;
    let mut model_id = DEFAULT_STT_MODEL.to_string();
    let mut tag_audio_events = true;
    let mut language_code = None;
    let mut diarize = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("audio").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidRequest(format!("could not read audio file: {e}")))?;
            audio = Some((data, file_name, content_type));
            continue;
        }

        let raw = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("could not read field '{name}': {e}")))?;
        let value = decode_text(&name, &raw)?;
        match name.as_str() {
            "model_id" if !value.trim().is_empty() => model_id = value.trim().to_string(),
            "tag_audio_events" => tag_audio_events = parse_flag(&name, &value)?,
            "diarize" => diarize = parse_flag(&name, &value)?,
            "language_code" if !value.trim().is_empty() => {
                language_code = Some(value.trim().to_string())
            }
            _ => {}
        }
    }

    let (audio, file_name, content_type) =
        audio.ok_or_else(|| AppError::InvalidRequest("missing 'file' field".to_string()))?;
    if audio.is_empty() {
        return Err(AppError::InvalidRequest("audio file is empty".to_string()));
    }

    Ok(TranscriptionRequest {
        audio,
        file_name,
        content_type,
        model_id,
        tag_audio_events,
        language_code,
        diarize,
    })
}

fn decode_text(name: &str, raw: &[u8]) -> Result<String, AppError> {
    String::from_utf8(raw.to_vec())
        .map_err(|e| AppError::AudioDecode(format!("field '{name}' is not valid UTF-8: {e}")))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(AppError::InvalidRequest(format!(
            "field '{name}' must be a boolean, got '{other}'"
        ))),
    }
}
