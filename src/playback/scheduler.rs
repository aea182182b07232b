//! Streaming audio playback scheduler
//!
//! Buffers encoded response chunks and schedules them back-to-back on a
//! shared output timeline, so playback stays gapless even when chunks arrive
//! in bursts. The scheduler never waits for a chunk to finish audibly; it
//! schedules ahead of real time and lets the sink drain.
//!
//! Interruption handling is intentionally blunt: `flush()` stops everything,
//! empties the queue and resets the cursor to now, so a new turn can never
//! overlap audio from a stale one.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, warn};

use crate::playback::decode::{decode_pcm16, AudioBuffer};
use crate::playback::sequencer::TurnSequencer;

/// Tolerance when deciding whether all scheduled audio has finished.
pub const IDLE_EPSILON: f64 = 0.1;

/// An encoded audio payload stamped with the turn it belongs to.
#[derive(Clone, Debug)]
pub struct AudioChunk {
    pub payload: Vec<u8>,
    pub turn_id: u64,
}

impl AudioChunk {
    pub fn new(payload: Vec<u8>, turn_id: u64) -> Self {
        Self { payload, turn_id }
    }
}

/// Time source for the output timeline, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock anchored at creation time.
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Output collaborator that accepts decoded buffers at scheduled times.
///
/// Start times handed to `schedule` are strictly non-decreasing and
/// back-to-back; `stop_all` must silence everything previously scheduled.
pub trait AudioSink {
    fn schedule(&mut self, buffer: AudioBuffer, start_time: f64);
    fn stop_all(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlaybackState {
    Idle,
    Playing,
}

/// Outcome of one drain pass, mainly for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Chunks scheduled onto the timeline
    pub scheduled: usize,

    /// Chunks silently dropped because their turn went stale
    pub dropped_stale: usize,

    /// Chunks skipped because they failed to decode
    pub skipped_bad: usize,

    /// Whether this pass drained the last audio and went idle
    pub became_idle: bool,
}

/// Buffered, gapless playback over an [`AudioSink`].
///
/// Owns the chunk queue and the playback cursor. The cursor only moves
/// forward: it advances by each scheduled chunk's duration and is clamped
/// up to the current time when processing falls behind.
pub struct PlaybackScheduler<C: Clock, S: AudioSink> {
    queue: VecDeque<AudioChunk>,
    cursor: f64,
    state: PlaybackState,
    clock: C,
    sink: S,
    sample_rate: u32,
}

impl<C: Clock, S: AudioSink> PlaybackScheduler<C, S> {
    pub fn new(clock: C, sink: S, sample_rate: u32) -> Self {
        let cursor = clock.now();
        Self {
            queue: VecDeque::new(),
            cursor,
            state: PlaybackState::Idle,
            clock,
            sink,
            sample_rate,
        }
    }

    /// Append a chunk to the queue; wakes the drain loop if it was idle.
    ///
    /// The `Playing` guard ensures at most one drain pass is ever pending;
    /// starting fresh from idle re-anchors the cursor at the current time.
    pub fn enqueue(&mut self, chunk: AudioChunk) {
        if self.state == PlaybackState::Idle {
            self.state = PlaybackState::Playing;
            self.cursor = self.clock.now();
            debug!(cursor = self.cursor, "playback starting");
        }
        self.queue.push_back(chunk);
    }

    /// Drain the queue, scheduling every playable chunk onto the timeline.
    ///
    /// Called repeatedly from the session loop (the cooperative stand-in for
    /// a timer-driven re-check). Stale chunks are dropped silently; decode
    /// failures skip the chunk and keep draining.
    pub fn pump(&mut self, sequencer: &TurnSequencer) -> PumpReport {
        let mut report = PumpReport::default();

        while let Some(chunk) = self.queue.pop_front() {
            if !sequencer.is_current(chunk.turn_id) {
                debug!(
                    turn = chunk.turn_id,
                    current = sequencer.current(),
                    "dropping stale audio chunk"
                );
                report.dropped_stale += 1;
                continue;
            }

            let buffer = match decode_pcm16(&chunk.payload, self.sample_rate) {
                Ok(buffer) => buffer,
                Err(e) => {
                    warn!("skipping undecodable audio chunk: {}", e);
                    report.skipped_bad += 1;
                    continue;
                }
            };

            // Never schedule into the past; otherwise keep the chunks
            // back-to-back on the shared timeline.
            let now = self.clock.now();
            let start = if self.cursor < now { now } else { self.cursor };
            let duration = buffer.duration_secs();

            self.sink.schedule(buffer, start);
            self.cursor = start + duration;
            report.scheduled += 1;
        }

        if self.state == PlaybackState::Playing
            && self.queue.is_empty()
            && self.clock.now() >= self.cursor - IDLE_EPSILON
        {
            self.state = PlaybackState::Idle;
            report.became_idle = true;
            debug!("all audio played, scheduler idle");
        }

        report
    }

    /// Stop every scheduled unit of audio, empty the queue and reset the
    /// cursor to now. Safe to call repeatedly.
    pub fn flush(&mut self) {
        self.sink.stop_all();
        self.queue.clear();
        self.cursor = self.clock.now();
        self.state = PlaybackState::Idle;
        debug!(cursor = self.cursor, "playback flushed");
    }

    /// Whether audio is queued or still scheduled ahead of real time.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Next scheduled start time on the output timeline.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Number of chunks waiting to be scheduled.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}
