pub mod buffer;
#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod resampler;
pub mod sink;

pub use buffer::PlaybackBuffer;
#[cfg(feature = "audio-io")]
pub use input::MicCapture;
#[cfg(feature = "audio-io")]
pub use output::AudioOutput;
pub use resampler::AudioResampler;
pub use sink::BufferSink;
