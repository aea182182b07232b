//! Playback sink bridging the scheduler to the output device
//!
//! The scheduler hands this sink decoded buffers with back-to-back start
//! times, so writing them to the shared [`PlaybackBuffer`] in order
//! preserves the timeline; the device callback drains the buffer at its own
//! rate. `stop_all` clears the buffer, which silences everything scheduled.

use tracing::warn;

use crate::audio::buffer::PlaybackBuffer;
use crate::audio::resampler::AudioResampler;
use crate::playback::decode::AudioBuffer;
use crate::playback::scheduler::AudioSink;
use crate::Result;

pub struct BufferSink {
    buffer: PlaybackBuffer,
    resampler: Option<AudioResampler>,
}

impl BufferSink {
    /// `model_rate` is the wire rate of response audio; `device_rate` the
    /// rate the output device consumes.
    pub fn new(buffer: PlaybackBuffer, model_rate: u32, device_rate: u32) -> Result<Self> {
        let resampler = if model_rate != device_rate {
            Some(AudioResampler::new(model_rate, device_rate)?)
        } else {
            None
        };

        Ok(Self { buffer, resampler })
    }
}

impl AudioSink for BufferSink {
    fn schedule(&mut self, audio: AudioBuffer, _start_time: f64) {
        match self.resampler.as_mut() {
            Some(resampler) => match resampler.resample(&audio.samples) {
                Ok(converted) => self.buffer.write(&converted),
                Err(e) => warn!("dropping audio buffer, resampling failed: {}", e),
            },
            None => self.buffer.write(&audio.samples),
        }
    }

    fn stop_all(&mut self) {
        self.buffer.clear();
        if let Some(resampler) = self.resampler.as_mut() {
            resampler.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_second_buffer() -> AudioBuffer {
        AudioBuffer {
            samples: vec![0.1; 24000],
            sample_rate: 24000,
        }
    }

    #[test]
    fn test_passthrough_without_rate_change() {
        let shared = PlaybackBuffer::new(48000);
        let mut sink = BufferSink::new(shared.clone(), 24000, 24000).unwrap();

        sink.schedule(one_second_buffer(), 0.0);
        assert_eq!(shared.len(), 24000);
    }

    #[test]
    fn test_stop_all_silences_buffer() {
        let shared = PlaybackBuffer::new(48000);
        let mut sink = BufferSink::new(shared.clone(), 24000, 24000).unwrap();

        sink.schedule(one_second_buffer(), 0.0);
        sink.stop_all();
        assert!(shared.is_empty());
    }

    #[test]
    fn test_resamples_to_device_rate() {
        let shared = PlaybackBuffer::new(96000);
        let mut sink = BufferSink::new(shared.clone(), 24000, 48000).unwrap();

        sink.schedule(one_second_buffer(), 0.0);
        // Doubled rate over the full chunks consumed so far
        assert!(shared.len() > 40000);
    }
}
