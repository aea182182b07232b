//! WebSocket channel to the Gemini Live API
//!
//! Runs the socket on a dedicated worker thread with a current-thread tokio
//! runtime; the rest of the application stays synchronous. Inbound frames
//! are forwarded untouched; classification happens in the session loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::remote::RemoteChannel;
use crate::wire::{ClientFrame, WireFrame};
use crate::{Result, RostrumError};

/// Default endpoint for BidiGenerateContent sessions.
pub const DEFAULT_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/\
     google.ai.generativelanguage.v1alpha.GenerativeService.BidiGenerateContent";

enum Op {
    Frame(ClientFrame),
    Close,
}

/// Handle to the socket worker. Cloneable would hide ownership; the session
/// holds the single handle as `Box<dyn RemoteChannel>`.
pub struct GeminiChannel {
    outbound_tx: UnboundedSender<Op>,
    open: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl GeminiChannel {
    /// Connect and start the worker. Returns the channel handle and the
    /// receiver the session drains raw inbound frames from.
    ///
    /// Blocks until the socket is open; a connect failure is fatal.
    pub fn connect(
        endpoint: &str,
        api_key: &str,
    ) -> Result<(Self, crossbeam_channel::Receiver<WireFrame>)> {
        let url = format!("{}?key={}", endpoint, api_key);
        let (frame_tx, frame_rx) = crossbeam_channel::unbounded();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let open = Arc::new(AtomicBool::new(false));
        let worker_open = Arc::clone(&open);

        let worker = thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("failed to build runtime: {}", e)));
                    return;
                }
            };

            runtime.block_on(socket_loop(url, frame_tx, outbound_rx, ready_tx, worker_open));
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(RostrumError::ConnectionError(e));
            }
            Err(_) => {
                let _ = worker.join();
                return Err(RostrumError::ConnectionError(
                    "socket worker exited before connecting".into(),
                ));
            }
        }

        Ok((
            Self {
                outbound_tx,
                open,
                worker: Mutex::new(Some(worker)),
            },
            frame_rx,
        ))
    }
}

async fn socket_loop(
    url: String,
    frame_tx: Sender<WireFrame>,
    mut outbound_rx: mpsc::UnboundedReceiver<Op>,
    ready_tx: crossbeam_channel::Sender<std::result::Result<(), String>>,
    open: Arc<AtomicBool>,
) {
    let mut ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => {
            info!("Connected to model channel");
            open.store(true, Ordering::SeqCst);
            let _ = ready_tx.send(Ok(()));
            ws
        }
        Err(e) => {
            let _ = ready_tx.send(Err(format!("connect failed: {}", e)));
            return;
        }
    };

    loop {
        tokio::select! {
            maybe_msg = ws.next() => match maybe_msg {
                Some(Ok(Message::Text(text))) => {
                    let _ = frame_tx.send(WireFrame::Text(text));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    let _ = frame_tx.send(WireFrame::Binary(bytes));
                }
                Some(Ok(Message::Close(reason))) => {
                    info!("Remote channel closed: {:?}", reason);
                    break;
                }
                Some(Ok(_)) => {} // ping/pong handled by tungstenite
                Some(Err(e)) => {
                    warn!("Socket error: {}", e);
                    break;
                }
                None => break,
            },
            op = outbound_rx.recv() => match op {
                Some(Op::Frame(frame)) => {
                    let payload = match serde_json::to_string(&frame) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("Failed to serialize outbound frame: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = ws.send(Message::Text(payload)).await {
                        warn!("Send failed, closing channel: {}", e);
                        break;
                    }
                }
                Some(Op::Close) | None => {
                    debug!("Closing socket");
                    let _ = ws.close(None).await;
                    break;
                }
            },
        }
    }

    open.store(false, Ordering::SeqCst);
}

impl RemoteChannel for GeminiChannel {
    fn send(&self, frame: ClientFrame) -> Result<()> {
        if !self.is_open() {
            return Err(RostrumError::ChannelError("channel is closed".into()));
        }
        self.outbound_tx
            .send(Op::Frame(frame))
            .map_err(|_| RostrumError::ChannelError("socket worker is gone".into()))
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&self) {
        let _ = self.outbound_tx.send(Op::Close);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl Drop for GeminiChannel {
    fn drop(&mut self) {
        let _ = self.outbound_tx.send(Op::Close);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}
