//! Outbound JSON frames
//!
//! Shapes match the BidiGenerateContent protocol: one top-level key per
//! frame, camelCase fields, media as mime-typed base64 chunks.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use serde::Serialize;

/// Mime type for outbound microphone audio (PCM16 LE at 16 kHz).
pub const AUDIO_MIME: &str = "audio/pcm;rate=16000";

/// Mime type for outbound camera snapshots.
pub const JPEG_MIME: &str = "image/jpeg";

/// A single frame sent to the remote channel.
///
/// Externally tagged so each variant serializes as `{"setup": {...}}`,
/// `{"clientContent": {...}}` or `{"realtimeInput": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub enum ClientFrame {
    #[serde(rename = "setup")]
    Setup(Setup),

    #[serde(rename = "clientContent")]
    ClientContent(ClientContent),

    #[serde(rename = "realtimeInput")]
    RealtimeInput(RealtimeInput),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub model: String,
    pub generation_config: GenerationConfig,
    pub system_instruction: Content,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContent {
    pub turns: Vec<Content>,
    pub turn_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    pub media_chunks: Vec<MediaChunk>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaChunk {
    pub mime_type: String,
    pub data: String,
}

impl ClientFrame {
    /// Session setup: model name, audio-only responses, system instruction.
    pub fn setup(model: &str, system_instruction: &str) -> Self {
        ClientFrame::Setup(Setup {
            model: format!("models/{}", model),
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
            },
            system_instruction: Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
        })
    }

    /// A complete user text turn (trigger phrases, rest-my-case, etc).
    pub fn user_text(text: &str) -> Self {
        ClientFrame::ClientContent(ClientContent {
            turns: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }],
            turn_complete: true,
        })
    }

    /// A microphone buffer as a PCM16-LE base64 media chunk.
    pub fn audio_chunk(samples: &[f32]) -> Self {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            let pcm = if clamped < 0.0 {
                (clamped * 32768.0) as i16
            } else {
                (clamped * 32767.0) as i16
            };
            bytes.extend_from_slice(&pcm.to_le_bytes());
        }

        ClientFrame::RealtimeInput(RealtimeInput {
            media_chunks: vec![MediaChunk {
                mime_type: AUDIO_MIME.to_string(),
                data: B64.encode(&bytes),
            }],
        })
    }

    /// A camera snapshot as a JPEG base64 media chunk.
    pub fn video_frame(jpeg: &[u8]) -> Self {
        ClientFrame::RealtimeInput(RealtimeInput {
            media_chunks: vec![MediaChunk {
                mime_type: JPEG_MIME.to_string(),
                data: B64.encode(jpeg),
            }],
        })
    }
}
