//! Session orchestrator
//!
//! Owns one live debate session end to end: the remote channel, the turn
//! sequencer, the playback scheduler and (in duel mode) the phase machine.
//! Runs as a single worker thread polling its inputs; the frontend talks to
//! it through [`SessionHandle`] and renders the [`SessionEvent`] stream.
//!
//! Ordering on a phase hand-over is strict: flush playback, begin a new
//! turn, then send the trigger phrase. Anything looser lets audio from the
//! previous speaker bleed into the next phase.

pub mod config;

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, error, info, warn};

use crate::analysis::{score_reply, DeliveryScores};
use crate::chat::ChatMessage;
use crate::duel::{AdvanceReason, DuelMachine, DuelPhase, DuelTick, Transition};
use crate::playback::{AudioChunk, AudioSink, Clock, PlaybackScheduler, TurnSequencer};
use crate::prompts::REST_CASE_MESSAGE;
use crate::remote::RemoteChannel;
use crate::wire::{classify_frame, ClientFrame, ServerEvent, WireFrame};
use crate::{Result, RostrumError};

pub use config::SessionConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Commands the frontend sends into a running session.
#[derive(Clone, Debug)]
pub enum SessionCommand {
    /// The user finished their argument and wants the model's response
    RestCase,

    /// The current duel speaker yielded early
    PlayerDone,

    /// Arbitrary user text, sent as a complete turn
    SendText(String),

    Shutdown,
}

/// Events the session emits for the presentation layer.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// The socket is open and setup was sent
    Connected,

    /// The model acknowledged setup and is listening
    Ready,

    Chat(ChatMessage),

    /// Whether response audio is currently playing
    Speaking(bool),

    Phase(DuelPhase),

    /// Whole seconds left on the duel speaking countdown
    TimerTick(u64),

    Scores(DeliveryScores),

    TurnComplete,

    Disconnected,

    Error(String),

    Shutdown,
}

/// Frontend half of a session: send commands, drain events.
pub struct SessionHandle {
    command_tx: Sender<SessionCommand>,
    event_rx: Receiver<SessionEvent>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| RostrumError::ChannelError("session worker is gone".into()))
    }

    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.event_rx
    }

    pub fn try_event(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// One live debate session. Generic over the clock and sink so the whole
/// loop is testable without devices or real time.
pub struct Session<C: Clock + Clone, S: AudioSink> {
    config: SessionConfig,
    clock: C,
    sequencer: TurnSequencer,
    scheduler: PlaybackScheduler<C, S>,
    duel: Option<DuelMachine>,
    channel: Box<dyn RemoteChannel>,
    frame_rx: Receiver<WireFrame>,
    mic_rx: Option<Receiver<Vec<f32>>>,
    video_rx: Option<Receiver<Vec<u8>>>,
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    last_tick: Option<u64>,
}

impl<C: Clock + Clone, S: AudioSink> Session<C, S> {
    pub fn new(
        config: SessionConfig,
        clock: C,
        sink: S,
        channel: Box<dyn RemoteChannel>,
        frame_rx: Receiver<WireFrame>,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = crossbeam_channel::bounded(32);
        let (event_tx, event_rx) = crossbeam_channel::unbounded();

        let scheduler =
            PlaybackScheduler::new(clock.clone(), sink, config.output_sample_rate);
        let duel = config
            .mode
            .is_duel()
            .then(|| DuelMachine::new(config.turn_seconds, config.settle_delay));

        let session = Self {
            config,
            clock,
            sequencer: TurnSequencer::new(),
            scheduler,
            duel,
            channel,
            frame_rx,
            mic_rx: None,
            video_rx: None,
            command_rx,
            event_tx,
            last_tick: None,
        };

        (session, SessionHandle { command_tx, event_rx })
    }

    /// Attach a microphone stream; buffers are forwarded as realtime input.
    pub fn with_microphone(mut self, mic_rx: Receiver<Vec<f32>>) -> Self {
        self.mic_rx = Some(mic_rx);
        self
    }

    /// Attach a camera snapshot stream (JPEG bytes).
    pub fn with_video(mut self, video_rx: Receiver<Vec<u8>>) -> Self {
        self.video_rx = Some(video_rx);
        self
    }

    /// Run the session to completion on the current thread.
    pub fn run(mut self) -> Result<()> {
        self.channel.send(ClientFrame::setup(
            &self.config.model,
            &self.config.system_instruction(),
        ))?;
        self.emit(SessionEvent::Connected);
        info!(
            mode = self.config.mode.label(),
            model = %self.config.model,
            "session started"
        );

        loop {
            if self.drain_commands() {
                break;
            }

            if !self.drain_frames() {
                self.emit(SessionEvent::Disconnected);
                break;
            }

            self.forward_capture();

            let report = self.scheduler.pump(&self.sequencer);
            if report.became_idle {
                self.emit(SessionEvent::Speaking(false));
            }

            self.poll_duel();

            thread::sleep(POLL_INTERVAL);
        }

        self.scheduler.flush();
        self.channel.close();
        self.emit(SessionEvent::Shutdown);
        info!("session ended");
        Ok(())
    }

    /// Run the session on its own thread.
    pub fn spawn(self) -> JoinHandle<Result<()>>
    where
        C: Send + 'static,
        S: Send + 'static,
    {
        thread::spawn(move || self.run())
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Returns true when the session should shut down.
    fn drain_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(SessionCommand::RestCase) => {
                    // Interrupt whatever is playing before yielding the floor
                    self.scheduler.flush();
                    self.sequencer.begin_new_turn();
                    self.emit(SessionEvent::Speaking(false));
                    if let Err(e) = self.channel.send(ClientFrame::user_text(REST_CASE_MESSAGE)) {
                        self.emit(SessionEvent::Error(e.user_message()));
                        return true;
                    }
                    self.emit(SessionEvent::Chat(ChatMessage::user(REST_CASE_MESSAGE)));
                }
                Ok(SessionCommand::PlayerDone) => {
                    let now = self.clock.now();
                    let transition = self
                        .duel
                        .as_mut()
                        .and_then(|duel| duel.advance(now, AdvanceReason::DoneSignal));
                    if let Some(transition) = transition {
                        if self.apply_transition(transition).is_err() {
                            return true;
                        }
                    }
                }
                Ok(SessionCommand::SendText(text)) => {
                    if let Err(e) = self.channel.send(ClientFrame::user_text(&text)) {
                        self.emit(SessionEvent::Error(e.user_message()));
                        return true;
                    }
                    self.emit(SessionEvent::Chat(ChatMessage::user(text)));
                }
                Ok(SessionCommand::Shutdown) => return true,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }

    /// Returns false when the remote channel is gone.
    fn drain_frames(&mut self) -> bool {
        loop {
            match self.frame_rx.try_recv() {
                Ok(frame) => match classify_frame(frame) {
                    Ok(events) => {
                        for event in events {
                            self.handle_server_event(event);
                        }
                    }
                    Err(e) => {
                        // Malformed frames are dropped, the stream continues
                        warn!("{}", e);
                    }
                },
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    warn!("remote channel closed");
                    return false;
                }
            }
        }
    }

    fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::SetupComplete => {
                info!("model ready");
                self.emit(SessionEvent::Ready);
                // The duel clock starts as soon as the judge is listening
                let transition = self
                    .duel
                    .as_mut()
                    .and_then(|duel| duel.start(self.clock.now()));
                if let Some(transition) = transition {
                    self.emit(SessionEvent::Phase(transition.to));
                    self.emit(SessionEvent::Chat(ChatMessage::system(
                        "Duel started. Player 1, make your case.",
                    )));
                }
            }
            ServerEvent::Text(text) => {
                let scores = score_reply(&text);
                if !scores.is_empty() {
                    self.emit(SessionEvent::Scores(scores));
                }
                self.emit(SessionEvent::Chat(ChatMessage::model(text)));
            }
            ServerEvent::Audio(payload) => {
                let chunk = AudioChunk::new(payload, self.sequencer.current());
                let was_playing = self.scheduler.is_playing();
                self.scheduler.enqueue(chunk);
                if !was_playing {
                    self.emit(SessionEvent::Speaking(true));
                }
            }
            ServerEvent::TurnComplete => {
                debug!("model turn complete");
                self.emit(SessionEvent::TurnComplete);
            }
            ServerEvent::Interrupted => {
                debug!("model interrupted, flushing playback");
                self.scheduler.flush();
                self.sequencer.begin_new_turn();
                self.emit(SessionEvent::Speaking(false));
            }
        }
    }

    fn forward_capture(&mut self) {
        if let Some(mic_rx) = &self.mic_rx {
            while let Ok(samples) = mic_rx.try_recv() {
                if let Err(e) = self.channel.send(ClientFrame::audio_chunk(&samples)) {
                    debug!("dropping microphone buffer: {}", e);
                    break;
                }
            }
        }
        if let Some(video_rx) = &self.video_rx {
            while let Ok(jpeg) = video_rx.try_recv() {
                if let Err(e) = self.channel.send(ClientFrame::video_frame(&jpeg)) {
                    debug!("dropping camera frame: {}", e);
                    break;
                }
            }
        }
    }

    fn poll_duel(&mut self) {
        let now = self.clock.now();

        let tick = self.duel.as_mut().and_then(|duel| duel.tick(now));
        match tick {
            Some(DuelTick::CountdownStarted) => {
                self.emit(SessionEvent::TimerTick(self.config.turn_seconds));
                self.last_tick = Some(self.config.turn_seconds);
            }
            Some(DuelTick::TimerExpired) => {
                let transition = self
                    .duel
                    .as_mut()
                    .and_then(|duel| duel.advance(now, AdvanceReason::TimerExpired));
                if let Some(transition) = transition {
                    if let Err(e) = self.apply_transition(transition) {
                        error!("failed to hand over the duel: {}", e);
                        self.emit(SessionEvent::Error(e.user_message()));
                    }
                }
            }
            None => {}
        }

        let remaining = self.duel.as_ref().and_then(|duel| duel.remaining(now));
        if let Some(remaining) = remaining {
            if self.last_tick != Some(remaining) {
                self.last_tick = Some(remaining);
                self.emit(SessionEvent::TimerTick(remaining));
            }
        }
    }

    /// Flush, invalidate in-flight audio, then send the trigger phrase.
    fn apply_transition(&mut self, transition: Transition) -> Result<()> {
        self.scheduler.flush();
        self.sequencer.begin_new_turn();
        self.emit(SessionEvent::Speaking(false));
        self.last_tick = None;

        if let Some(trigger) = transition.trigger {
            self.channel.send(ClientFrame::user_text(trigger))?;
        }

        self.emit(SessionEvent::Phase(transition.to));
        let note = match transition.to {
            DuelPhase::Player2 => "Player 1 rests. Player 2, make your case.",
            DuelPhase::Verdict => "Time! The judge is deliberating.",
            DuelPhase::Waiting | DuelPhase::Player1 => "Duel started.",
        };
        self.emit(SessionEvent::Chat(ChatMessage::system(note)));
        info!(
            from = transition.from.label(),
            to = transition.to.label(),
            "duel hand-over"
        );
        Ok(())
    }
}
