//! Wire format for the bidirectional model channel
//!
//! Outbound frames are JSON control/content messages (`setup`,
//! `clientContent`, `realtimeInput`); inbound frames arrive as either text
//! JSON, binary-wrapped JSON, or raw audio bytes and are normalized into
//! [`inbound::ServerEvent`]s by the classifier.

pub mod inbound;
pub mod outbound;

pub use inbound::{classify_frame, ServerEvent, WireFrame};
pub use outbound::{ClientFrame, AUDIO_MIME, JPEG_MIME};
