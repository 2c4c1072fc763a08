//! Wake/Listen controller
//!
//! An explicit state machine replaces callback-driven control flow: the
//! assistant alternates between passive wake-phrase listening and active
//! command listening, speaking responses in between. The controller owns
//! every audio and speech resource handle; they are created on start and
//! released when the loop exits.
//!
//! ```text
//! Idle ──start──▶ Passive ──wake/trigger──▶ Active ──command──▶ Speaking
//!                    ▲                        │                    │
//!                    │◀──recognition failed───┘                    │
//!                    │◀────────────── speech done ─────────────────┘
//!                    │          (wake/trigger while Speaking
//!                    │           cancels output ──▶ Active)
//! ```

use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::connectivity::{ConnectivityMonitor, Transition};
use crate::dialogue::DialogueProcessor;
use crate::voice::{
    AudioCapture, AudioPlayback, SAMPLE_RATE, SpeechSegmenter, SpeechToText, TextToSpeech,
    WakePhrase, samples_to_wav,
};
use crate::{ConversationContext, Result};

/// Spoken once when the controller starts
const INTRO_TEXT: &str = "Hello! This is Odel. Ready to assist you.";

/// Spoken acknowledgement when a bare wake phrase is heard
const WAKE_ACK_TEXT: &str = "Yes?";

/// Spoken when active-mode recognition fails
const APOLOGY_TEXT: &str = "Sorry, I didn't catch that.";

/// Delay before restarting passive listening after a recognition error
const PASSIVE_RESTART_DELAY: Duration = Duration::from_secs(1);

/// How long active mode waits for a command before giving up
const ACTIVE_WINDOW: Duration = Duration::from_secs(8);

/// Capture poll cadence
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Listening states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    /// Not listening; audio resources idle
    Idle,
    /// Passive wake-phrase listening
    Passive,
    /// Active command listening
    Active,
    /// Speaking a response
    Speaking,
}

/// Events driving state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenEvent {
    /// Controller started
    Start,
    /// Wake phrase heard
    WakeDetected,
    /// Explicit talk/interrupt control
    ManualTrigger,
    /// A command transcript was produced
    CommandHeard,
    /// Speech output finished
    SpeechDone,
    /// Recognition produced no usable transcript
    RecognitionFailed,
    /// Controller stopping
    Stop,
}

impl ListenState {
    /// Transition table; unlisted combinations keep the current state.
    ///
    /// A wake or manual trigger while `Speaking` goes straight to `Active`
    /// (output is cancelled by the caller, with no `Passive` re-entry).
    /// Active-mode recognition failures pass through `Speaking` because the
    /// apology is itself speech output.
    #[must_use]
    pub const fn on(self, event: ListenEvent) -> Self {
        match (self, event) {
            (Self::Idle, ListenEvent::Start) => Self::Passive,
            (
                Self::Passive | Self::Speaking,
                ListenEvent::WakeDetected | ListenEvent::ManualTrigger,
            ) => Self::Active,
            (Self::Active, ListenEvent::CommandHeard | ListenEvent::RecognitionFailed) => {
                Self::Speaking
            }
            (Self::Speaking, ListenEvent::SpeechDone) => Self::Passive,
            (Self::Passive, ListenEvent::RecognitionFailed) => Self::Passive,
            (_, ListenEvent::Stop) => Self::Idle,
            (state, _) => state,
        }
    }
}

/// Owns the audio pipeline and runs the listen/speak loop
pub struct WakeListenController {
    capture: AudioCapture,
    playback: AudioPlayback,
    stt: SpeechToText,
    tts: TextToSpeech,
    wake: WakePhrase,
    segmenter: SpeechSegmenter,
    dialogue: DialogueProcessor,
    context: ConversationContext,
    connectivity: ConnectivityMonitor,
    notices: mpsc::Receiver<Transition>,
    trigger: mpsc::Receiver<()>,
}

impl WakeListenController {
    /// Build the controller, acquiring audio devices and speech clients
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Audio`] when no capture or playback device
    /// exists (the unsupported-platform case) and [`crate::Error::Config`]
    /// when speech API credentials are missing
    pub fn new(
        config: &Config,
        dialogue: DialogueProcessor,
        connectivity: ConnectivityMonitor,
        notices: mpsc::Receiver<Transition>,
        trigger: mpsc::Receiver<()>,
    ) -> Result<Self> {
        Ok(Self {
            capture: AudioCapture::new()?,
            playback: AudioPlayback::new()?,
            stt: SpeechToText::new(&config.voice, &config.locale)?,
            tts: TextToSpeech::new(&config.voice)?,
            wake: WakePhrase::new(&config.wake_word),
            segmenter: SpeechSegmenter::new(),
            dialogue,
            context: ConversationContext::new(config.history_limit),
            connectivity,
            notices,
            trigger,
        })
    }

    /// Run the listen/speak loop until the trigger channel closes
    ///
    /// # Errors
    ///
    /// Returns error only on unrecoverable audio failures; recognition,
    /// synthesis, and connector failures all resolve to spoken messages
    /// and a return to passive listening
    #[allow(clippy::future_not_send)]
    pub async fn run(mut self) -> Result<()> {
        self.capture.start()?;

        let mut state = ListenState::Idle.on(ListenEvent::Start);
        tracing::info!(wake_phrase = self.wake.phrase(), "listening for wake phrase");

        if self.say(INTRO_TEXT).await {
            state = ListenState::Passive.on(ListenEvent::ManualTrigger);
        }

        loop {
            tracing::trace!(?state, "listen state");
            state = match state {
                ListenState::Idle => break,
                ListenState::Passive => self.passive_step().await,
                ListenState::Active => self.active_step().await,
                // Speaking is entered inline by say(); reaching it here
                // means a handler forgot to speak, so just re-arm.
                ListenState::Speaking => ListenState::Passive,
            };
        }

        self.capture.stop();
        tracing::info!("controller stopped");
        Ok(())
    }

    /// One passive-mode step: wait for a wake phrase, a manual trigger, or
    /// a connectivity notice
    async fn passive_step(&mut self) -> ListenState {
        self.segmenter.reset();
        self.capture.clear_buffer();

        let outcome = tokio::select! {
            trigger = self.trigger.recv() => match trigger {
                Some(()) => PassiveOutcome::Triggered,
                None => PassiveOutcome::Shutdown,
            },
            notice = self.notices.recv() => match notice {
                Some(transition) => PassiveOutcome::Notice(transition),
                None => PassiveOutcome::Shutdown,
            },
            segment = next_segment(&self.capture, &mut self.segmenter) => {
                PassiveOutcome::Segment(segment)
            }
        };

        match outcome {
            PassiveOutcome::Shutdown => ListenState::Idle.on(ListenEvent::Stop),
            PassiveOutcome::Triggered => {
                tracing::debug!("manual trigger");
                ListenState::Passive.on(ListenEvent::ManualTrigger)
            }
            PassiveOutcome::Notice(transition) => {
                if self.say(transition.notice()).await {
                    ListenState::Speaking.on(ListenEvent::ManualTrigger)
                } else {
                    ListenState::Passive
                }
            }
            PassiveOutcome::Segment(segment) => self.check_wake(segment).await,
        }
    }

    /// Transcribe a passive segment and check it for the wake phrase
    async fn check_wake(&mut self, segment: Vec<f32>) -> ListenState {
        let transcript = match self.transcribe(&segment).await {
            Ok(text) => text,
            Err(e) => {
                // Passive listening runs indefinitely, so it self-heals:
                // wait briefly and go around again instead of bailing.
                tracing::debug!(error = %e, "passive recognition failed, restarting");
                tokio::time::sleep(PASSIVE_RESTART_DELAY).await;
                return ListenState::Passive.on(ListenEvent::RecognitionFailed);
            }
        };

        if !self.wake.matches(&transcript) {
            tracing::trace!(transcript = %transcript, "no wake phrase");
            return ListenState::Passive;
        }

        tracing::info!(transcript = %transcript, "wake phrase detected");
        let state = ListenState::Passive.on(ListenEvent::WakeDetected);
        debug_assert_eq!(state, ListenState::Active);

        // The wake segment may already carry the command
        let command = self.wake.command_after(&transcript);
        if command.is_empty() {
            self.say(WAKE_ACK_TEXT).await;
            return state;
        }

        self.respond(&command).await
    }

    /// One active-mode step: wait for a single command utterance
    async fn active_step(&mut self) -> ListenState {
        self.segmenter.reset();
        self.capture.clear_buffer();
        tracing::debug!("active listening");

        let segment = tokio::time::timeout(
            ACTIVE_WINDOW,
            next_segment(&self.capture, &mut self.segmenter),
        )
        .await;

        let transcript = match segment {
            Ok(samples) => self.transcribe(&samples).await,
            Err(_) => Err(crate::Error::Recognition("no speech heard".to_string())),
        };

        match transcript {
            Ok(command) => {
                let state = ListenState::Active.on(ListenEvent::CommandHeard);
                debug_assert_eq!(state, ListenState::Speaking);
                self.respond(&command).await
            }
            Err(e) => {
                tracing::debug!(error = %e, "active recognition failed");
                let state = ListenState::Active.on(ListenEvent::RecognitionFailed);
                debug_assert_eq!(state, ListenState::Speaking);
                if self.say(APOLOGY_TEXT).await {
                    ListenState::Speaking.on(ListenEvent::ManualTrigger)
                } else {
                    ListenState::Speaking.on(ListenEvent::SpeechDone)
                }
            }
        }
    }

    /// Process one turn and speak the response
    async fn respond(&mut self, command: &str) -> ListenState {
        let online = self.connectivity.is_online();
        let result = self
            .dialogue
            .process_turn(command, &mut self.context, online)
            .await;

        if self.say(&result.text).await {
            ListenState::Speaking.on(ListenEvent::WakeDetected)
        } else {
            ListenState::Speaking.on(ListenEvent::SpeechDone)
        }
    }

    /// Speak text, allowing a wake phrase or manual trigger to cut it off.
    /// Returns true when speech was interrupted. Synthesis or playback
    /// failures are logged and swallowed; the loop must stay alive.
    async fn say(&mut self, text: &str) -> bool {
        let mp3 = match self.tts.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(error = %e, "TTS failed, skipping speech");
                return false;
            }
        };

        self.segmenter.reset();
        self.capture.clear_buffer();

        // Dropping the playback future tears the output stream down, so an
        // interruption cancels speech immediately rather than queueing.
        tokio::select! {
            result = self.playback.play_mp3(&mp3) => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "playback failed");
                }
                false
            }
            Some(()) = self.trigger.recv() => {
                tracing::debug!("speech interrupted by manual trigger");
                true
            }
            () = wake_during_speech(
                &self.capture,
                &mut self.segmenter,
                &self.stt,
                &self.wake,
            ) => {
                tracing::debug!("speech interrupted by wake phrase");
                true
            }
        }
    }

    async fn transcribe(&self, samples: &[f32]) -> Result<String> {
        let wav = samples_to_wav(samples, SAMPLE_RATE)?;
        self.stt.transcribe(wav).await
    }
}

enum PassiveOutcome {
    Triggered,
    Notice(Transition),
    Segment(Vec<f32>),
    Shutdown,
}

/// Poll the capture buffer until the segmenter yields a finished segment
async fn next_segment(capture: &AudioCapture, segmenter: &mut SpeechSegmenter) -> Vec<f32> {
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        let chunk = capture.take_buffer();
        if chunk.is_empty() {
            continue;
        }
        if let Some(segment) = segmenter.feed(&chunk) {
            return segment;
        }
    }
}

/// Resolve only when the wake phrase is heard; non-wake segments are
/// discarded so unrelated chatter does not cancel speech output
async fn wake_during_speech(
    capture: &AudioCapture,
    segmenter: &mut SpeechSegmenter,
    stt: &SpeechToText,
    wake: &WakePhrase,
) {
    loop {
        let segment = next_segment(capture, segmenter).await;
        let Ok(wav) = samples_to_wav(&segment, SAMPLE_RATE) else {
            continue;
        };
        match stt.transcribe(wav).await {
            Ok(transcript) if wake.matches(&transcript) => return,
            Ok(_) | Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_enters_passive() {
        assert_eq!(ListenState::Idle.on(ListenEvent::Start), ListenState::Passive);
    }

    #[test]
    fn wake_moves_passive_to_active() {
        assert_eq!(
            ListenState::Passive.on(ListenEvent::WakeDetected),
            ListenState::Active
        );
        assert_eq!(
            ListenState::Passive.on(ListenEvent::ManualTrigger),
            ListenState::Active
        );
    }

    #[test]
    fn wake_while_speaking_goes_straight_to_active() {
        // One step, no intermediate Passive re-entry
        assert_eq!(
            ListenState::Speaking.on(ListenEvent::WakeDetected),
            ListenState::Active
        );
        assert_eq!(
            ListenState::Speaking.on(ListenEvent::ManualTrigger),
            ListenState::Active
        );
    }

    #[test]
    fn command_and_completion_cycle() {
        assert_eq!(
            ListenState::Active.on(ListenEvent::CommandHeard),
            ListenState::Speaking
        );
        assert_eq!(
            ListenState::Speaking.on(ListenEvent::SpeechDone),
            ListenState::Passive
        );
    }

    #[test]
    fn passive_failure_stays_passive() {
        assert_eq!(
            ListenState::Passive.on(ListenEvent::RecognitionFailed),
            ListenState::Passive
        );
    }

    #[test]
    fn active_failure_speaks_apology() {
        assert_eq!(
            ListenState::Active.on(ListenEvent::RecognitionFailed),
            ListenState::Speaking
        );
    }

    #[test]
    fn stop_from_anywhere() {
        for state in [
            ListenState::Idle,
            ListenState::Passive,
            ListenState::Active,
            ListenState::Speaking,
        ] {
            assert_eq!(state.on(ListenEvent::Stop), ListenState::Idle);
        }
    }

    #[test]
    fn unrelated_events_keep_state() {
        assert_eq!(
            ListenState::Passive.on(ListenEvent::SpeechDone),
            ListenState::Passive
        );
        assert_eq!(
            ListenState::Idle.on(ListenEvent::WakeDetected),
            ListenState::Idle
        );
    }
}
