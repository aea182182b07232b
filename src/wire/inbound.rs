//! Inbound frame classification
//!
//! The server interleaves control events and payload on one socket, in two
//! wire shapes: textual JSON, and binary frames that may themselves carry
//! JSON or raw audio bytes. Everything is normalized into [`ServerEvent`]s;
//! a frame that cannot be classified is reported as a parse error for the
//! caller to log and drop, never to tear down the connection.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use serde::Deserialize;

use crate::{Result, RostrumError};

/// A raw frame as received from the remote channel.
#[derive(Clone, Debug)]
pub enum WireFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Normalized inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    /// Session setup acknowledged, the model is listening
    SetupComplete,

    /// Text content from the model turn
    Text(String),

    /// Encoded audio payload from the model turn
    Audio(Vec<u8>),

    /// The model finished its turn
    TurnComplete,

    /// The model was interrupted; pending playback must be flushed
    Interrupted,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    setup_complete: Option<serde_json::Value>,
    server_content: Option<ServerContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    model_turn: Option<ModelTurn>,
    #[serde(default)]
    turn_complete: bool,
    #[serde(default)]
    interrupted: bool,
}

#[derive(Debug, Deserialize)]
struct ModelTurn {
    #[serde(default)]
    parts: Vec<ServerPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerPart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

/// Classify one wire frame into zero or more normalized events.
///
/// Binary frames are tried as JSON first; anything that fails that is
/// treated as a raw audio payload.
pub fn classify_frame(frame: WireFrame) -> Result<Vec<ServerEvent>> {
    match frame {
        WireFrame::Text(text) => classify_json(&text),
        WireFrame::Binary(bytes) => {
            if let Ok(text) = std::str::from_utf8(&bytes) {
                if let Ok(events) = classify_json(text) {
                    return Ok(events);
                }
            }
            Ok(vec![ServerEvent::Audio(bytes)])
        }
    }
}

fn classify_json(text: &str) -> Result<Vec<ServerEvent>> {
    let message: ServerMessage = serde_json::from_str(text)
        .map_err(|e| RostrumError::ParseError(format!("malformed server frame: {}", e)))?;

    let mut events = Vec::new();

    if message.setup_complete.is_some() {
        events.push(ServerEvent::SetupComplete);
    }

    if let Some(content) = message.server_content {
        if let Some(turn) = content.model_turn {
            for part in turn.parts {
                if let Some(text) = part.text {
                    events.push(ServerEvent::Text(text));
                }
                if let Some(inline) = part.inline_data {
                    if !is_audio(inline.mime_type.as_deref()) {
                        continue;
                    }
                    let payload = B64.decode(inline.data.as_bytes()).map_err(|e| {
                        RostrumError::ParseError(format!("bad base64 audio payload: {}", e))
                    })?;
                    events.push(ServerEvent::Audio(payload));
                }
            }
        }

        // Order matters: payload first, then turn boundary, then interruption
        if content.turn_complete {
            events.push(ServerEvent::TurnComplete);
        }
        if content.interrupted {
            events.push(ServerEvent::Interrupted);
        }
    }

    Ok(events)
}

// Inline data without a mime type is treated as audio; the model only
// inlines audio in audio-response mode.
fn is_audio(mime: Option<&str>) -> bool {
    match mime {
        Some(mime) => mime.starts_with("audio/"),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_complete() {
        let events = classify_frame(WireFrame::Text("{\"setupComplete\": {}}".into())).unwrap();
        assert_eq!(events, vec![ServerEvent::SetupComplete]);
    }

    #[test]
    fn test_model_turn_with_text_and_audio() {
        let b64 = B64.encode([0u8, 0, 0, 0]);
        let json = format!(
            "{{\"serverContent\": {{\"modelTurn\": {{\"parts\": [\
             {{\"text\": \"Great posture!\"}},\
             {{\"inlineData\": {{\"mimeType\": \"audio/pcm;rate=24000\", \"data\": \"{}\"}}}}\
             ]}}, \"turnComplete\": true}}}}",
            b64
        );

        let events = classify_frame(WireFrame::Text(json)).unwrap();
        assert_eq!(
            events,
            vec![
                ServerEvent::Text("Great posture!".into()),
                ServerEvent::Audio(vec![0, 0, 0, 0]),
                ServerEvent::TurnComplete,
            ]
        );
    }

    #[test]
    fn test_interrupted() {
        let events = classify_frame(WireFrame::Text(
            "{\"serverContent\": {\"interrupted\": true}}".into(),
        ))
        .unwrap();
        assert_eq!(events, vec![ServerEvent::Interrupted]);
    }

    #[test]
    fn test_non_audio_inline_data_ignored() {
        let json = "{\"serverContent\": {\"modelTurn\": {\"parts\": [\
                    {\"inlineData\": {\"mimeType\": \"image/png\", \"data\": \"AAAA\"}}]}}}";
        let events = classify_frame(WireFrame::Text(json.into())).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_binary_json_frame() {
        let events =
            classify_frame(WireFrame::Binary(b"{\"setupComplete\": {}}".to_vec())).unwrap();
        assert_eq!(events, vec![ServerEvent::SetupComplete]);
    }

    #[test]
    fn test_binary_non_json_is_raw_audio() {
        let payload = vec![0x01, 0x02, 0xFF, 0xFE];
        let events = classify_frame(WireFrame::Binary(payload.clone())).unwrap();
        assert_eq!(events, vec![ServerEvent::Audio(payload)]);
    }

    #[test]
    fn test_malformed_text_is_a_parse_error() {
        let result = classify_frame(WireFrame::Text("not json".into()));
        assert!(matches!(result, Err(RostrumError::ParseError(_))));
    }

    #[test]
    fn test_bad_base64_is_a_parse_error() {
        let json = "{\"serverContent\": {\"modelTurn\": {\"parts\": [\
                    {\"inlineData\": {\"mimeType\": \"audio/pcm\", \"data\": \"!!!\"}}]}}}";
        let result = classify_frame(WireFrame::Text(json.into()));
        assert!(matches!(result, Err(RostrumError::ParseError(_))));
    }
}
