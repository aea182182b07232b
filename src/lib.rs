pub mod analysis;
pub mod audio;
pub mod chat;
pub mod duel;
pub mod playback;
pub mod prompts;
pub mod remote;
pub mod session;
pub mod wire;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RostrumError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for RostrumError {
    fn from(e: std::io::Error) -> Self {
        RostrumError::ConnectionError(e.to_string())
    }
}

impl RostrumError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The session must be restarted explicitly by the user
            RostrumError::ConnectionError(_) => false,
            // Malformed frames are dropped and the stream continues
            RostrumError::ParseError(_) => true,
            // A bad chunk is skipped and the drain loop continues
            RostrumError::PlaybackError(_) => true,
            RostrumError::AudioDeviceError(_) => false,
            RostrumError::ChannelError(_) => false,
            RostrumError::ConfigError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            RostrumError::ConnectionError(_) => {
                "Connection to the debate service failed. Please start a new session.".to_string()
            }
            RostrumError::ParseError(_) => {
                "Received an unreadable message from the service.".to_string()
            }
            RostrumError::PlaybackError(_) => {
                "A piece of the response audio could not be played.".to_string()
            }
            RostrumError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            RostrumError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            RostrumError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RostrumError>;
