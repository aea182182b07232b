//! Remote bidirectional channel
//!
//! The session talks to the hosted model through this seam. Sends are only
//! attempted while the channel is open; a closed channel is fatal to the
//! session and there is no automatic reconnect.

pub mod gemini;

use crate::wire::ClientFrame;
use crate::Result;

pub use gemini::GeminiChannel;

pub trait RemoteChannel: Send {
    /// Queue a frame for delivery. Fails only on a closed channel.
    fn send(&self, frame: ClientFrame) -> Result<()>;

    /// Whether the underlying socket is still open.
    fn is_open(&self) -> bool;

    /// Close the socket and stop the worker.
    fn close(&self);
}
