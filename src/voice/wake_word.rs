//! Wake-phrase detection
//!
//! Two small pieces: an energy-based segmenter that turns the raw capture
//! stream into finished speech segments, and a wake-phrase matcher applied
//! to transcripts of those segments. The segmenter serves both listening
//! modes; the controller decides whether a segment is a wake check or a
//! command.

/// Minimum audio energy to count as speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum speech length for a usable segment (samples at 16 kHz, 0.3 s)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing silence that ends an utterance (samples, 0.5 s)
const SILENCE_SAMPLES: usize = 8000;

/// Accumulates capture chunks into complete speech segments
#[derive(Debug, Default)]
pub struct SpeechSegmenter {
    buffer: Vec<f32>,
    silence: usize,
    in_speech: bool,
}

impl SpeechSegmenter {
    /// Create an idle segmenter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of samples; returns a finished segment once enough
    /// speech has been followed by enough silence
    pub fn feed(&mut self, samples: &[f32]) -> Option<Vec<f32>> {
        let energy = rms_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        if !self.in_speech {
            if !is_speech {
                return None;
            }
            self.in_speech = true;
            self.buffer.clear();
            self.silence = 0;
            tracing::trace!(energy, "speech started");
        }

        self.buffer.extend_from_slice(samples);

        if is_speech {
            self.silence = 0;
        } else {
            self.silence += samples.len();
        }

        if self.silence > SILENCE_SAMPLES {
            // The buffer ends with the trailing silence; only the speech
            // portion counts toward the minimum length.
            let speech_len = self.buffer.len().saturating_sub(self.silence);
            let segment = std::mem::take(&mut self.buffer);
            self.in_speech = false;
            self.silence = 0;

            if speech_len > MIN_SPEECH_SAMPLES {
                tracing::debug!(samples = segment.len(), "speech segment complete");
                return Some(segment);
            }
            tracing::trace!(samples = segment.len(), "segment too short, dropped");
        }

        None
    }

    /// Whether speech is currently being accumulated
    #[must_use]
    pub const fn in_speech(&self) -> bool {
        self.in_speech
    }

    /// Discard any partial segment
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.silence = 0;
        self.in_speech = false;
    }
}

/// Matches a configured wake phrase against transcripts
#[derive(Debug, Clone)]
pub struct WakePhrase {
    phrase: String,
}

impl WakePhrase {
    /// Create a matcher; the phrase is normalized once
    #[must_use]
    pub fn new(phrase: &str) -> Self {
        Self {
            phrase: phrase.trim().to_lowercase(),
        }
    }

    /// The normalized phrase
    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Whether the transcript contains the wake phrase
    #[must_use]
    pub fn matches(&self, transcript: &str) -> bool {
        transcript.to_lowercase().contains(&self.phrase)
    }

    /// Text following the wake phrase, trimmed of leading punctuation;
    /// empty if the phrase is absent or nothing follows it
    #[must_use]
    pub fn command_after(&self, transcript: &str) -> String {
        let lower = transcript.to_lowercase();
        lower.find(&self.phrase).map_or_else(String::new, |pos| {
            lower[pos + self.phrase.len()..]
                .trim_start_matches([',', '.', '!', '?', ' '])
                .trim()
                .to_string()
        })
    }
}

/// RMS energy of a sample chunk
#[allow(clippy::cast_precision_loss)]
fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_of_silence_and_tone() {
        assert!(rms_energy(&vec![0.0; 100]) < 0.001);
        assert!(rms_energy(&vec![0.5; 100]) > 0.4);
    }

    #[test]
    fn wake_phrase_matching() {
        let wake = WakePhrase::new("  Hey Odel ");
        assert_eq!(wake.phrase(), "hey odel");

        assert!(wake.matches("hey odel, what time is it?"));
        assert!(wake.matches("HEY ODEL"));
        assert!(!wake.matches("hello world"));
    }

    #[test]
    fn command_extraction() {
        let wake = WakePhrase::new("hey odel");
        assert_eq!(
            wake.command_after("hey odel, tell me a joke"),
            "tell me a joke"
        );
        assert_eq!(wake.command_after("hey odel"), "");
        assert_eq!(wake.command_after("unrelated"), "");
    }
}
