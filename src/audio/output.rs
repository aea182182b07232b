//! Output device playback
//!
//! Owns the cpal output stream and drains the shared [`PlaybackBuffer`]
//! that the session's playback sink writes into. The stream is created on
//! the thread that owns this struct; only the buffer handle crosses threads.

use crate::audio::buffer::PlaybackBuffer;
use crate::{Result, RostrumError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    is_playing: Arc<Mutex<bool>>,
}

impl AudioOutput {
    /// Create an output handle on the default output device.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| RostrumError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| {
                RostrumError::AudioDeviceError(format!("Failed to get output config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            is_playing: Arc::new(Mutex::new(false)),
        })
    }

    /// Sample rate the device consumes; the playback sink must resample
    /// response audio to this rate.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start draining `buffer` to the device.
    pub fn start_playback(&mut self, buffer: PlaybackBuffer) -> Result<()> {
        if *self.is_playing.lock() {
            warn!("Already playing");
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let is_playing = Arc::clone(&self.is_playing);

        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !*is_playing.lock() {
                        data.fill(0.0);
                        return;
                    }

                    let frames = data.len() / channels;
                    let mut mono = vec![0.0f32; frames];
                    buffer.read_into(&mut mono);

                    // Duplicate the mono signal across all device channels
                    for (frame, &sample) in mono.iter().enumerate() {
                        for channel in 0..channels {
                            data[frame * channels + channel] = sample;
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                RostrumError::AudioDeviceError(format!("Failed to build output stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            RostrumError::AudioDeviceError(format!("Failed to start output stream: {}", e))
        })?;

        *self.is_playing.lock() = true;
        self.stream = Some(stream);

        info!("Started audio playback");
        Ok(())
    }

    /// Stop playing audio
    pub fn stop_playback(&mut self) -> Result<()> {
        *self.is_playing.lock() = false;

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Stopped audio playback");
        }

        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        *self.is_playing.lock()
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.stop_playback();
    }
}
