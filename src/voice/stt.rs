//! Speech-to-text over a Whisper-compatible HTTP API

use crate::config::VoiceConfig;
use crate::{Error, Result};

/// Transcription response
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcribes WAV audio to text
pub struct SpeechToText {
    client: reqwest::Client,
    url: String,
    model: String,
    language: String,
    api_key: String,
}

impl SpeechToText {
    /// Create an STT client from voice configuration
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured
    pub fn new(voice: &VoiceConfig, locale: &str) -> Result<Self> {
        let api_key = voice
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY required for STT".to_string()))?;

        // Whisper wants the bare language code, not the full locale tag
        let language = locale.split('-').next().unwrap_or("en").to_string();

        Ok(Self {
            client: reqwest::Client::new(),
            url: voice.stt_url.clone(),
            model: voice.stt_model.clone(),
            language,
            api_key,
        })
    }

    /// Transcribe WAV bytes to text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recognition`] when the API answers but produces an
    /// empty transcript, [`Error::Stt`] on API failures
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "STT API error");
            return Err(Error::Stt(format!("STT API error {status}: {body}")));
        }

        let result: TranscriptionResponse = response.json().await?;

        if result.text.trim().is_empty() {
            return Err(Error::Recognition("empty transcript".to_string()));
        }

        tracing::debug!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}
