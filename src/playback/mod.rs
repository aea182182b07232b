pub mod decode;
pub mod scheduler;
pub mod sequencer;

pub use decode::{decode_pcm16, AudioBuffer};
pub use scheduler::{AudioChunk, AudioSink, Clock, PlaybackScheduler, PumpReport, SystemClock};
pub use sequencer::TurnSequencer;
