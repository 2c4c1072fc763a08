//! Voice pipeline tests that need no audio hardware

use std::io::Cursor;

use odel::voice::{SAMPLE_RATE, SpeechSegmenter, WakePhrase, samples_to_wav};

/// Generate sine wave audio samples
fn sine(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

fn silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

#[test]
fn segmenter_ignores_silence() {
    let mut segmenter = SpeechSegmenter::new();
    assert!(segmenter.feed(&silence(0.5)).is_none());
    assert!(!segmenter.in_speech());
}

#[test]
fn segmenter_completes_speech_then_silence() {
    let mut segmenter = SpeechSegmenter::new();

    let speech = sine(440.0, 0.5, 0.3);
    assert!(segmenter.feed(&speech).is_none());
    assert!(segmenter.in_speech());

    let segment = segmenter.feed(&silence(0.6)).expect("segment");
    assert!(segment.len() >= speech.len());
    assert!(!segmenter.in_speech());
}

#[test]
fn segmenter_drops_too_short_bursts() {
    let mut segmenter = SpeechSegmenter::new();

    // 0.1s of speech is under the minimum segment length
    segmenter.feed(&sine(440.0, 0.1, 0.3));
    assert!(segmenter.feed(&silence(0.6)).is_none());
    assert!(!segmenter.in_speech());
}

#[test]
fn segmenter_accumulates_across_chunks() {
    let mut segmenter = SpeechSegmenter::new();

    let chunk = sine(440.0, 0.2, 0.3);
    segmenter.feed(&chunk);
    segmenter.feed(&chunk);
    segmenter.feed(&chunk);

    let segment = segmenter.feed(&silence(0.6)).expect("segment");
    assert!(segment.len() >= chunk.len() * 3);
}

#[test]
fn segmenter_reset_discards_partial_segment() {
    let mut segmenter = SpeechSegmenter::new();

    segmenter.feed(&sine(440.0, 0.5, 0.3));
    assert!(segmenter.in_speech());

    segmenter.reset();
    assert!(!segmenter.in_speech());
    assert!(segmenter.feed(&silence(0.6)).is_none());
}

#[test]
fn wake_phrase_normalized_and_case_insensitive() {
    let wake = WakePhrase::new("  Hey Odel  ");
    assert_eq!(wake.phrase(), "hey odel");
    assert!(wake.matches("HEY ODEL, turn on the light"));
    assert!(!wake.matches("hello there"));
}

#[test]
fn wake_phrase_command_extraction() {
    let wake = WakePhrase::new("hey odel");
    assert_eq!(wake.command_after("hey odel, what's the weather?"), "what's the weather?");
    assert_eq!(wake.command_after("Hey Odel"), "");
}

#[test]
fn samples_to_wav_header() {
    let samples = sine(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");
    assert!(wav_data.len() > 44);
}

#[test]
fn wav_roundtrip() {
    let original: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);

    let read: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(read.len(), original.len());
}
