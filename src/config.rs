//! Configuration for the Odel assistant

use std::path::PathBuf;

use serde::Deserialize;

use crate::{Error, Result};

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Wake phrase that moves the assistant into command listening
    pub wake_word: String,

    /// BCP-47 locale tag for recognition and synthesis
    pub locale: String,

    /// Voice (STT/TTS) configuration
    pub voice: VoiceConfig,

    /// Knowledge and device endpoint configuration
    pub connectors: ConnectorConfig,

    /// Number of turns retained in short-term conversation history
    pub history_limit: usize,
}

/// Speech-to-text and text-to-speech configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable audio capture and playback
    pub enabled: bool,

    /// STT endpoint (Whisper-compatible transcription API)
    pub stt_url: String,

    /// STT model identifier
    pub stt_model: String,

    /// TTS endpoint (returns MP3 bytes)
    pub tts_url: String,

    /// TTS model identifier
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,

    /// API key sent as a bearer token to the STT/TTS endpoints
    pub api_key: Option<String>,
}

/// Outbound endpoint configuration for knowledge and device connectors
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Light-control endpoint (receives PUT with `1`/`0`)
    pub light_url: String,

    /// Random-joke endpoint
    pub joke_url: String,

    /// Dictionary endpoint base (word appended as a path segment)
    pub dictionary_url: String,

    /// Weather endpoint base
    pub weather_url: String,

    /// Weather coordinates
    pub latitude: f64,
    pub longitude: f64,

    /// General-knowledge primary (instant-answer API)
    pub answer_url: String,

    /// General-knowledge secondary (encyclopedia summary base, title appended)
    pub summary_url: String,

    /// Connectivity probe endpoint (expected to return 204)
    pub probe_url: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stt_url: "https://api.openai.com/v1/audio/transcriptions".to_string(),
            stt_model: "whisper-1".to_string(),
            tts_url: "https://api.openai.com/v1/audio/speech".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 0.9,
            api_key: None,
        }
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            light_url: "https://iotx0-f34a3-default-rtdb.firebaseio.com/light.json".to_string(),
            joke_url: "https://official-joke-api.appspot.com/random_joke".to_string(),
            dictionary_url: "https://api.dictionaryapi.dev/api/v2/entries/en".to_string(),
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            latitude: 12.97,
            longitude: 77.59,
            answer_url: "https://api.duckduckgo.com/".to_string(),
            summary_url: "https://en.wikipedia.org/api/rest_v1/page/summary".to_string(),
            probe_url: "https://connectivitycheck.gstatic.com/generate_204".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wake_word: "hey odel".to_string(),
            locale: "en-IN".to_string(),
            voice: VoiceConfig::default(),
            connectors: ConnectorConfig::default(),
            history_limit: 5,
        }
    }
}

/// On-disk configuration file shape (all fields optional)
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    wake_word: Option<String>,
    locale: Option<String>,
    history_limit: Option<usize>,
    #[serde(default)]
    voice: VoiceFile,
    #[serde(default)]
    connectors: ConnectorFile,
}

#[derive(Debug, Default, Deserialize)]
struct VoiceFile {
    enabled: Option<bool>,
    stt_url: Option<String>,
    stt_model: Option<String>,
    tts_url: Option<String>,
    tts_model: Option<String>,
    tts_voice: Option<String>,
    tts_speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectorFile {
    light_url: Option<String>,
    joke_url: Option<String>,
    dictionary_url: Option<String>,
    weather_url: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    answer_url: Option<String>,
    summary_url: Option<String>,
    probe_url: Option<String>,
}

impl Config {
    /// Load configuration from the default config file (if present) plus
    /// environment overrides
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed
    pub fn load() -> Result<Self> {
        let path = config_path();
        let file = match &path {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(p)?;
                let parsed: ConfigFile = toml::from_str(&raw)?;
                tracing::debug!(path = %p.display(), "loaded config file");
                parsed
            }
            _ => ConfigFile::default(),
        };

        Self::from_file(file)
    }

    /// Load configuration with voice explicitly disabled (headless mode)
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let mut config = Self::load()?;
        if disable_voice {
            config.voice.enabled = false;
        }
        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        let defaults = Self::default();
        let voice_defaults = VoiceConfig::default();
        let conn_defaults = ConnectorConfig::default();

        let voice = VoiceConfig {
            enabled: std::env::var("ODEL_DISABLE_VOICE").map_or_else(
                |_| file.voice.enabled.unwrap_or(voice_defaults.enabled),
                |v| !matches!(v.as_str(), "1" | "true"),
            ),
            stt_url: env_or("ODEL_STT_URL", file.voice.stt_url, voice_defaults.stt_url),
            stt_model: env_or(
                "ODEL_STT_MODEL",
                file.voice.stt_model,
                voice_defaults.stt_model,
            ),
            tts_url: env_or("ODEL_TTS_URL", file.voice.tts_url, voice_defaults.tts_url),
            tts_model: env_or(
                "ODEL_TTS_MODEL",
                file.voice.tts_model,
                voice_defaults.tts_model,
            ),
            tts_voice: env_or(
                "ODEL_TTS_VOICE",
                file.voice.tts_voice,
                voice_defaults.tts_voice,
            ),
            tts_speed: file.voice.tts_speed.unwrap_or(voice_defaults.tts_speed),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
        };

        if !(0.25..=4.0).contains(&voice.tts_speed) {
            return Err(Error::Config(format!(
                "tts_speed must be within 0.25..=4.0, got {}",
                voice.tts_speed
            )));
        }

        let connectors = ConnectorConfig {
            light_url: env_or(
                "ODEL_LIGHT_URL",
                file.connectors.light_url,
                conn_defaults.light_url,
            ),
            joke_url: file.connectors.joke_url.unwrap_or(conn_defaults.joke_url),
            dictionary_url: file
                .connectors
                .dictionary_url
                .unwrap_or(conn_defaults.dictionary_url),
            weather_url: file
                .connectors
                .weather_url
                .unwrap_or(conn_defaults.weather_url),
            latitude: file.connectors.latitude.unwrap_or(conn_defaults.latitude),
            longitude: file.connectors.longitude.unwrap_or(conn_defaults.longitude),
            answer_url: file.connectors.answer_url.unwrap_or(conn_defaults.answer_url),
            summary_url: file
                .connectors
                .summary_url
                .unwrap_or(conn_defaults.summary_url),
            probe_url: file.connectors.probe_url.unwrap_or(conn_defaults.probe_url),
        };

        let history_limit = file.history_limit.unwrap_or(defaults.history_limit);
        if history_limit == 0 {
            return Err(Error::Config("history_limit must be at least 1".to_string()));
        }

        Ok(Self {
            wake_word: env_or("ODEL_WAKE_WORD", file.wake_word, defaults.wake_word)
                .to_lowercase(),
            locale: env_or("ODEL_LOCALE", file.locale, defaults.locale),
            voice,
            connectors,
            history_limit,
        })
    }
}

/// Environment variable, then config file value, then default
fn env_or(var: &str, file_value: Option<String>, default: String) -> String {
    std::env::var(var)
        .ok()
        .or(file_value)
        .unwrap_or(default)
}

/// Path to the user's config file
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("ODEL_CONFIG") {
        return Some(PathBuf::from(p));
    }
    directories::ProjectDirs::from("dev", "odel", "odel")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.wake_word, "hey odel");
        assert_eq!(config.history_limit, 5);
        assert!(config.voice.enabled);
        assert!((config.voice.tts_speed - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn file_overrides_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
            wake_word = "Hey Buddy"
            history_limit = 3

            [voice]
            tts_speed = 1.2

            [connectors]
            latitude = 51.5
            "#,
        )
        .unwrap();

        let config = Config::from_file(file).unwrap();
        assert_eq!(config.wake_word, "hey buddy");
        assert_eq!(config.history_limit, 3);
        assert!((config.voice.tts_speed - 1.2).abs() < f64::EPSILON);
        assert!((config.connectors.latitude - 51.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_speed() {
        let file: ConfigFile = toml::from_str("[voice]\ntts_speed = 9.0").unwrap();
        assert!(Config::from_file(file).is_err());
    }

    #[test]
    fn rejects_zero_history() {
        let file: ConfigFile = toml::from_str("history_limit = 0").unwrap();
        assert!(Config::from_file(file).is_err());
    }
}
