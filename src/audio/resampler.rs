//! Sample-rate conversion between device rates and the wire rates
//!
//! The model consumes 16 kHz microphone audio and produces 24 kHz response
//! audio; audio devices rarely run at either. Streaming input is buffered
//! internally so callers can feed buffers of any size.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::{Result, RostrumError};

const CHUNK_SIZE: usize = 1024;

/// Streaming mono resampler.
pub struct AudioResampler {
    inner: SincFixedIn<f32>,
    pending: Vec<f32>,
}

impl AudioResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let inner = SincFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            2.0,
            params,
            CHUNK_SIZE,
            1,
        )
        .map_err(|e| RostrumError::AudioDeviceError(format!("failed to create resampler: {}", e)))?;

        Ok(Self {
            inner,
            pending: Vec::with_capacity(CHUNK_SIZE * 2),
        })
    }

    /// Feed samples in, get converted samples out. Input shorter than the
    /// processing chunk is held until enough has accumulated.
    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        self.pending.extend_from_slice(input);

        let mut output = Vec::new();
        while self.pending.len() >= CHUNK_SIZE {
            let chunk: Vec<f32> = self.pending.drain(..CHUNK_SIZE).collect();
            let processed = self
                .inner
                .process(&[chunk], None)
                .map_err(|e| RostrumError::AudioDeviceError(format!("resampling failed: {}", e)))?;
            output.extend_from_slice(&processed[0]);
        }

        Ok(output)
    }

    /// Drop buffered input (used when playback is flushed).
    pub fn reset(&mut self) {
        self.pending.clear();
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsample_roughly_scales_length() {
        let mut resampler = AudioResampler::new(16000, 48000).unwrap();
        let input: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resampler.resample(&input).unwrap();

        // 3x rate over the 4 full chunks consumed
        let expected = 4096.0 * 3.0;
        assert!((output.len() as f32 - expected).abs() / expected < 0.1);
    }

    #[test]
    fn test_short_input_is_buffered() {
        let mut resampler = AudioResampler::new(24000, 48000).unwrap();
        assert!(resampler.resample(&[0.0; 100]).unwrap().is_empty());

        // Accumulating past the chunk size releases output
        let output = resampler.resample(&[0.0; CHUNK_SIZE]).unwrap();
        assert!(!output.is_empty());
    }

    #[test]
    fn test_reset_discards_pending() {
        let mut resampler = AudioResampler::new(24000, 48000).unwrap();
        resampler.resample(&[0.5; 500]).unwrap();
        resampler.reset();
        assert!(resampler.resample(&[0.0; 600]).unwrap().is_empty());
    }
}
