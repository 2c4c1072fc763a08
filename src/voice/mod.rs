//! Voice I/O
//!
//! Audio capture, speech segmentation, wake-phrase matching, playback, and
//! the HTTP STT/TTS clients.

mod capture;
mod playback;
mod stt;
mod tts;
mod wake_word;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use playback::AudioPlayback;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
pub use wake_word::{SpeechSegmenter, WakePhrase};
