use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use odel::connectors::{HttpKnowledge, HttpLight};
use odel::voice::{AudioCapture, AudioPlayback, TextToSpeech};
use odel::{
    Config, ConnectivityMonitor, ConversationContext, DialogueProcessor, WakeListenController,
};

/// Odel - voice assistant
#[derive(Parser)]
#[command(name = "odel", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for machines without audio hardware)
    #[arg(long, env = "ODEL_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Process a single text query and print the response
    Ask {
        /// The query text
        query: String,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is Odel. Ready to assist you.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,odel=info",
        1 => "info,odel=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_with_options(cli.disable_voice)?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Ask { query } => ask(&config, &query).await,
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    if !config.voice.enabled {
        anyhow::bail!("voice is disabled; use `odel ask <query>` for text turns");
    }

    tracing::info!(
        wake_word = %config.wake_word,
        locale = %config.locale,
        "starting odel"
    );

    let dialogue = build_processor(&config);
    let connectivity = ConnectivityMonitor::new();

    let (notice_tx, notice_rx) = tokio::sync::mpsc::channel(4);
    let _probe = connectivity.spawn_probe(config.connectors.probe_url.clone(), notice_tx);

    // Talk/interrupt control: Enter on stdin triggers active listening
    let (trigger_tx, trigger_rx) = tokio::sync::mpsc::channel(4);
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            match std::io::stdin().read_line(&mut line) {
                // 0 bytes = stdin closed
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    line.clear();
                    if trigger_tx.blocking_send(()).is_err() {
                        break;
                    }
                }
            }
        }
    });

    let controller =
        WakeListenController::new(&config, dialogue, connectivity, notice_rx, trigger_rx)?;

    tracing::info!("odel ready - say \"{}\" or press Enter", config.wake_word);

    // Voice loop stays on the main thread: cpal streams aren't Send
    controller.run().await?;

    Ok(())
}

fn build_processor(config: &Config) -> DialogueProcessor {
    let knowledge = Arc::new(HttpKnowledge::new(config.connectors.clone()));
    let light = Arc::new(HttpLight::new(config.connectors.light_url.clone()));
    DialogueProcessor::new(knowledge, light)
}

/// Process one text turn without any audio hardware
async fn ask(config: &Config, query: &str) -> anyhow::Result<()> {
    let dialogue = build_processor(config);
    let mut context = ConversationContext::new(config.history_limit);

    // One-shot probe instead of the periodic monitor
    let online = odel::connectivity::probe_once(&config.connectors.probe_url).await;

    let result = dialogue.process_turn(query, &mut context, online).await;
    println!("[{}] {}", result.intent.tag(), result.text);
    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
#[allow(clippy::future_not_send)]
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new()?;

    let sample_rate = 24000_i32;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    playback.play(samples).await?;

    println!("If you heard the tone, your speakers are working!");

    Ok(())
}

/// Test TTS output
#[allow(clippy::future_not_send)]
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let tts = TextToSpeech::new(&config.voice)?;

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    let mut playback = AudioPlayback::new()?;
    playback.play_mp3(&mp3_data).await?;

    println!("If you heard the speech, TTS is working!");

    Ok(())
}
