//! Terminal frontend for live debate sessions
//!
//! Wires the audio devices, the remote channel and the session worker
//! together, then drives everything from a small stdin command loop.

use std::io::BufRead;
use std::thread;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use rostrum::audio::{BufferSink, PlaybackBuffer};
use rostrum::chat::ChatRole;
use rostrum::playback::SystemClock;
use rostrum::prompts::{suggest_topic, DebateMode};
use rostrum::remote::GeminiChannel;
use rostrum::session::{Session, SessionCommand, SessionConfig, SessionEvent};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rostrum=info,warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let mode = match args.next() {
        Some(name) => DebateMode::from_name(&name)
            .with_context(|| format!("unknown mode '{}'", name))?,
        None => DebateMode::Coach,
    };
    let topic = match args.next().as_deref() {
        Some("suggest") => Some(suggest_topic().to_string()),
        Some(topic) => Some(topic.to_string()),
        None => None,
    };

    let mut config = SessionConfig::from_env()?.with_mode(mode);
    if let Some(topic) = topic {
        println!("Topic: {}", topic);
        config = config.with_topic(topic);
    }
    config.validate()?;

    let (channel, frame_rx) = GeminiChannel::connect(&config.endpoint, &config.api_key)?;

    // Ten seconds of headroom between the session thread and the device
    let buffer = PlaybackBuffer::new(config.output_sample_rate as usize * 10);

    #[cfg(feature = "audio-io")]
    let (_output, _capture, sink, mic_rx) = {
        use crossbeam_channel::bounded;
        use rostrum::audio::{AudioOutput, MicCapture};

        let mut output = AudioOutput::new()?;
        let device_rate = output.sample_rate();
        output.start_playback(buffer.clone())?;

        let sink = BufferSink::new(buffer.clone(), config.output_sample_rate, device_rate)?;

        let (mic_tx, mic_rx) = bounded(64);
        let mut capture = MicCapture::new()?;
        capture.start(mic_tx)?;

        (output, capture, sink, mic_rx)
    };

    #[cfg(not(feature = "audio-io"))]
    let sink = BufferSink::new(
        buffer.clone(),
        config.output_sample_rate,
        config.output_sample_rate,
    )?;

    let (session, handle) = Session::new(
        config,
        SystemClock::new(),
        sink,
        Box::new(channel),
        frame_rx,
    );

    #[cfg(feature = "audio-io")]
    let session = session.with_microphone(mic_rx);

    let events = handle.events().clone();
    let printer = thread::spawn(move || {
        for event in events.iter() {
            match event {
                SessionEvent::Connected => println!("* connected, configuring the model"),
                SessionEvent::Ready => println!("* model ready, start speaking"),
                SessionEvent::Chat(message) => {
                    let who = match message.role {
                        ChatRole::User => "you",
                        ChatRole::Model => "model",
                        ChatRole::System => "--",
                    };
                    println!("[{}] {}", who, message.text);
                }
                SessionEvent::Speaking(true) => println!("* speaking..."),
                SessionEvent::Speaking(false) => {}
                SessionEvent::Phase(phase) => println!("* phase: {}", phase.label()),
                SessionEvent::TimerTick(secs) => {
                    if secs % 10 == 0 || secs <= 5 {
                        println!("* {}s left", secs);
                    }
                }
                SessionEvent::Scores(scores) => println!("* delivery scores: {:?}", scores),
                SessionEvent::TurnComplete => {}
                SessionEvent::Disconnected => {
                    println!("* disconnected");
                    break;
                }
                SessionEvent::Error(message) => println!("! {}", message),
                SessionEvent::Shutdown => break,
            }
        }
    });

    let worker = session.spawn();
    info!("commands: rest | done | quit | anything else is sent as text");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        let command = match trimmed {
            "" => continue,
            "rest" => SessionCommand::RestCase,
            "done" => SessionCommand::PlayerDone,
            "quit" | "exit" => SessionCommand::Shutdown,
            text => SessionCommand::SendText(text.to_string()),
        };
        let stop = matches!(command, SessionCommand::Shutdown);
        if handle.send(command).is_err() {
            break;
        }
        if stop {
            break;
        }
    }

    match worker.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("session worker panicked"),
    }
    let _ = printer.join();
    Ok(())
}
