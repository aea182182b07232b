//! End-to-end session behavior against a scripted remote channel.
//!
//! The channel, clock and audio sink are all test doubles, so the worker
//! loop runs with no network, no devices and no real deadlines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use rostrum::chat::ChatRole;
use rostrum::duel::DuelPhase;
use rostrum::playback::{AudioBuffer, AudioSink, Clock};
use rostrum::prompts::{DebateMode, REST_CASE_MESSAGE};
use rostrum::remote::RemoteChannel;
use rostrum::session::{Session, SessionCommand, SessionConfig, SessionEvent, SessionHandle};
use rostrum::wire::WireFrame;
use rostrum::Result;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared, ordered record of side effects across the channel and the sink.
type Log = Arc<Mutex<Vec<String>>>;

#[derive(Clone)]
struct TestClock(Arc<Mutex<f64>>);

impl TestClock {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(0.0)))
    }

    fn set(&self, t: f64) {
        *self.0.lock() = t;
    }
}

impl Clock for TestClock {
    fn now(&self) -> f64 {
        *self.0.lock()
    }
}

#[derive(Clone)]
struct LoggingSink {
    log: Log,
}

impl AudioSink for LoggingSink {
    fn schedule(&mut self, buffer: AudioBuffer, _start_time: f64) {
        self.log
            .lock()
            .push(format!("schedule {} samples", buffer.samples.len()));
    }

    fn stop_all(&mut self) {
        self.log.lock().push("flush".to_string());
    }
}

#[derive(Clone)]
struct ScriptedChannel {
    log: Log,
    open: Arc<AtomicBool>,
}

impl RemoteChannel for ScriptedChannel {
    fn send(&self, frame: rostrum::wire::ClientFrame) -> Result<()> {
        let json = serde_json::to_value(&frame).expect("outbound frames serialize");
        let entry = if let Some(setup) = json.get("setup") {
            format!("send setup {}", setup["model"].as_str().unwrap_or(""))
        } else if let Some(content) = json.get("clientContent") {
            let text = content["turns"][0]["parts"][0]["text"].as_str().unwrap_or("");
            format!("send text {}", text)
        } else {
            "send media".to_string()
        };
        self.log.lock().push(entry);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

struct Harness {
    clock: TestClock,
    log: Log,
    frame_tx: Sender<WireFrame>,
    handle: SessionHandle,
    worker: std::thread::JoinHandle<Result<()>>,
}

impl Harness {
    fn start(mode: DebateMode) -> Self {
        let clock = TestClock::new();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let (frame_tx, frame_rx) = crossbeam_channel::unbounded();

        let config = SessionConfig {
            mode,
            api_key: "test-key".into(),
            ..SessionConfig::default()
        };

        let channel = ScriptedChannel {
            log: Arc::clone(&log),
            open: Arc::new(AtomicBool::new(true)),
        };
        let sink = LoggingSink {
            log: Arc::clone(&log),
        };

        let (session, handle) = Session::new(
            config,
            clock.clone(),
            sink,
            Box::new(channel),
            frame_rx,
        );
        let worker = session.spawn();

        Self {
            clock,
            log,
            frame_tx,
            handle,
            worker,
        }
    }

    fn push_json(&self, json: &str) {
        self.frame_tx
            .send(WireFrame::Text(json.to_string()))
            .expect("session is running");
    }

    /// Wait until an event matching `pred` arrives, discarding the rest.
    fn wait_for(&self, pred: impl Fn(&SessionEvent) -> bool) -> SessionEvent {
        let deadline = Instant::now() + RECV_TIMEOUT;
        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .expect("timed out waiting for event");
            let event = self
                .handle
                .events()
                .recv_timeout(remaining)
                .expect("timed out waiting for event");
            if pred(&event) {
                return event;
            }
        }
    }

    fn wait_for_log(&self, needle: &str) {
        let deadline = Instant::now() + RECV_TIMEOUT;
        while Instant::now() < deadline {
            if self.log.lock().iter().any(|entry| entry.contains(needle)) {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("log never contained {:?}: {:?}", needle, self.log.lock());
    }

    fn shutdown(self) {
        let _ = self.handle.send(SessionCommand::Shutdown);
        self.worker
            .join()
            .expect("worker does not panic")
            .expect("session shuts down cleanly");
    }
}

fn audio_frame(samples: usize) -> String {
    use base64::engine::general_purpose::STANDARD as B64;
    use base64::Engine as _;
    let payload = B64.encode(vec![0u8; samples * 2]);
    format!(
        "{{\"serverContent\":{{\"modelTurn\":{{\"parts\":[{{\"inlineData\":{{\"mimeType\":\"audio/pcm\",\"data\":\"{}\"}}}}]}}}}}}",
        payload
    )
}

#[test]
fn setup_is_sent_before_anything_else() {
    let harness = Harness::start(DebateMode::Coach);

    harness.wait_for(|e| matches!(e, SessionEvent::Connected));
    harness.wait_for_log("send setup models/");
    assert!(harness.log.lock()[0].starts_with("send setup"));

    harness.shutdown();
}

#[test]
fn setup_complete_makes_the_session_ready() {
    let harness = Harness::start(DebateMode::Coach);

    harness.push_json("{\"setupComplete\": {}}");
    harness.wait_for(|e| matches!(e, SessionEvent::Ready));

    harness.shutdown();
}

#[test]
fn model_text_becomes_chat_and_scores() {
    let harness = Harness::start(DebateMode::Coach);

    harness.push_json(
        "{\"serverContent\":{\"modelTurn\":{\"parts\":[{\"text\":\"Great posture today!\"}]}}}",
    );

    let event = harness.wait_for(|e| matches!(e, SessionEvent::Scores(_)));
    let SessionEvent::Scores(scores) = event else {
        unreachable!()
    };
    assert!(scores.posture.is_some());

    let event = harness.wait_for(|e| matches!(e, SessionEvent::Chat(_)));
    let SessionEvent::Chat(message) = event else {
        unreachable!()
    };
    assert_eq!(message.role, ChatRole::Model);
    assert_eq!(message.text, "Great posture today!");

    harness.shutdown();
}

#[test]
fn audio_plays_and_interruption_silences_it() {
    let harness = Harness::start(DebateMode::Coach);

    harness.push_json(&audio_frame(24000));
    harness.wait_for(|e| matches!(e, SessionEvent::Speaking(true)));
    harness.wait_for_log("schedule 24000 samples");

    harness.push_json("{\"serverContent\":{\"interrupted\":true}}");
    harness.wait_for(|e| matches!(e, SessionEvent::Speaking(false)));
    harness.wait_for_log("flush");

    // Audio stamped before the interruption never reaches the sink again
    let scheduled = harness
        .log
        .lock()
        .iter()
        .filter(|entry| entry.starts_with("schedule"))
        .count();
    assert_eq!(scheduled, 1);

    harness.shutdown();
}

#[test]
fn rest_case_flushes_then_sends_the_text_turn() {
    let harness = Harness::start(DebateMode::Coach);
    harness.wait_for(|e| matches!(e, SessionEvent::Connected));

    harness.push_json(&audio_frame(24000));
    harness.wait_for_log("schedule");

    harness.handle.send(SessionCommand::RestCase).unwrap();
    harness.wait_for_log(REST_CASE_MESSAGE);

    let log = harness.log.lock().clone();
    let flush_at = log.iter().position(|e| e == "flush").expect("flushed");
    let sent_at = log
        .iter()
        .position(|e| e.contains(REST_CASE_MESSAGE))
        .expect("sent");
    assert!(flush_at < sent_at, "flush must precede the text turn: {:?}", log);

    let event = harness.wait_for(|e| matches!(e, SessionEvent::Chat(_)));
    let SessionEvent::Chat(message) = event else {
        unreachable!()
    };
    assert_eq!(message.role, ChatRole::User);

    harness.shutdown();
}

#[test]
fn duel_runs_waiting_to_verdict_on_timers() {
    let harness = Harness::start(DebateMode::Duel);

    // The duel clock starts when the judge acknowledges setup
    harness.push_json("{\"setupComplete\": {}}");
    let event = harness.wait_for(|e| matches!(e, SessionEvent::Phase(_)));
    assert!(matches!(event, SessionEvent::Phase(DuelPhase::Player1)));

    // Player 1's 30 seconds run out
    harness.clock.set(30.0);
    let event = harness.wait_for(|e| matches!(e, SessionEvent::Phase(_)));
    assert!(matches!(event, SessionEvent::Phase(DuelPhase::Player2)));
    harness.wait_for_log("send text TRANSITION:");

    // Hand-over order: playback flushed before the trigger goes out
    {
        let log = harness.log.lock().clone();
        let flush_at = log.iter().position(|e| e == "flush").expect("flushed");
        let trigger_at = log
            .iter()
            .position(|e| e.contains("TRANSITION:"))
            .expect("trigger sent");
        assert!(flush_at < trigger_at, "{:?}", log);
    }

    // Settle delay, then player 2's countdown runs out
    harness.clock.set(34.5);
    harness.wait_for(|e| matches!(e, SessionEvent::TimerTick(_)));
    harness.clock.set(65.0);
    let event = harness.wait_for(|e| matches!(e, SessionEvent::Phase(_)));
    assert!(matches!(event, SessionEvent::Phase(DuelPhase::Verdict)));
    harness.wait_for_log("send text VERDICT:");

    harness.shutdown();
}

#[test]
fn duel_player_can_yield_early() {
    let harness = Harness::start(DebateMode::Duel);

    harness.push_json("{\"setupComplete\": {}}");
    harness.wait_for(|e| matches!(e, SessionEvent::Phase(DuelPhase::Player1)));

    harness.clock.set(5.0);
    harness.handle.send(SessionCommand::PlayerDone).unwrap();
    harness.wait_for(|e| matches!(e, SessionEvent::Phase(DuelPhase::Player2)));
    harness.wait_for_log("send text TRANSITION:");

    harness.shutdown();
}

#[test]
fn malformed_frames_are_dropped_not_fatal() {
    let harness = Harness::start(DebateMode::Coach);

    harness.push_json("this is not json");
    harness.push_json("{\"setupComplete\": {}}");

    // The bad frame was logged and skipped; the stream keeps flowing
    harness.wait_for(|e| matches!(e, SessionEvent::Ready));
    harness.shutdown();
}

#[test]
fn closing_the_remote_disconnects_the_session() {
    let harness = Harness::start(DebateMode::Coach);
    harness.wait_for(|e| matches!(e, SessionEvent::Connected));

    let Harness {
        handle, worker, frame_tx, ..
    } = harness;
    drop(frame_tx);

    let deadline = Instant::now() + RECV_TIMEOUT;
    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .expect("timed out waiting for disconnect");
        match handle.events().recv_timeout(remaining) {
            Ok(SessionEvent::Disconnected) => break,
            Ok(_) => continue,
            Err(e) => panic!("event stream ended early: {}", e),
        }
    }

    worker
        .join()
        .expect("worker does not panic")
        .expect("disconnect is a clean shutdown");
}
