//! Decoding of model audio payloads
//!
//! The model streams 16-bit little-endian PCM. Chunks are decoded lazily at
//! playback time so stale chunks can be dropped without paying for decode.

use crate::{Result, RostrumError};

/// Decoded audio samples ready for scheduling.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    /// Audio samples (f32, mono)
    pub samples: Vec<f32>,

    /// Sample rate of the audio
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Get the duration of this audio in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode a PCM16-LE payload into f32 samples.
pub fn decode_pcm16(payload: &[u8], sample_rate: u32) -> Result<AudioBuffer> {
    if payload.is_empty() {
        return Err(RostrumError::PlaybackError("empty audio payload".into()));
    }
    if payload.len() % 2 != 0 {
        return Err(RostrumError::PlaybackError(format!(
            "PCM16 payload has odd length {}",
            payload.len()
        )));
    }

    let samples = payload
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(AudioBuffer {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pcm16() {
        // 0, i16::MAX, i16::MIN as little-endian pairs
        let payload = [0u8, 0, 0xFF, 0x7F, 0x00, 0x80];
        let buffer = decode_pcm16(&payload, 24000).unwrap();

        assert_eq!(buffer.samples.len(), 3);
        assert_eq!(buffer.samples[0], 0.0);
        assert!((buffer.samples[1] - (32767.0 / 32768.0)).abs() < 1e-6);
        assert_eq!(buffer.samples[2], -1.0);
    }

    #[test]
    fn test_duration() {
        let payload = vec![0u8; 24000 * 2];
        let buffer = decode_pcm16(&payload, 24000).unwrap();
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert!(decode_pcm16(&[], 24000).is_err());
        assert!(decode_pcm16(&[1, 2, 3], 24000).is_err());
    }
}
