//! Session configuration

use crate::prompts::DebateMode;
use crate::remote::gemini::DEFAULT_ENDPOINT;
use crate::{Result, RostrumError};

/// Default Live API model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-native-audio-preview-12-2025";

/// Sample rate the model expects microphone audio at.
pub const INPUT_SAMPLE_RATE: u32 = 16000;

/// Sample rate the model produces response audio at.
pub const OUTPUT_SAMPLE_RATE: u32 = 24000;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub mode: DebateMode,
    pub topic: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub api_key: String,

    /// Rate of outbound microphone audio.
    pub input_sample_rate: u32,

    /// Rate of inbound response audio.
    pub output_sample_rate: u32,

    /// Speaking time per duel player, in whole seconds.
    pub turn_seconds: u64,

    /// Pause after a duel hand-over before the next countdown starts.
    pub settle_delay: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: DebateMode::Coach,
            topic: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            input_sample_rate: INPUT_SAMPLE_RATE,
            output_sample_rate: OUTPUT_SAMPLE_RATE,
            turn_seconds: 30,
            settle_delay: 4.0,
        }
    }
}

impl SessionConfig {
    /// Build a config from the environment; `GEMINI_API_KEY` is required.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| RostrumError::ConfigError("GEMINI_API_KEY is not set".into()))?;
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }

    pub fn with_mode(mut self, mode: DebateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RostrumError::ConfigError("API key is empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(RostrumError::ConfigError("Model name is empty".into()));
        }
        if self.turn_seconds == 0 {
            return Err(RostrumError::ConfigError(
                "Duel speaking time must be at least one second".into(),
            ));
        }
        if self.settle_delay < 0.0 {
            return Err(RostrumError::ConfigError(
                "Settle delay cannot be negative".into(),
            ));
        }
        Ok(())
    }

    /// The persona instruction, with the chosen topic appended when set.
    pub fn system_instruction(&self) -> String {
        let base = self.mode.instruction();
        match &self.topic {
            Some(topic) => format!("{}\n\nThe debate topic is: \"{}\"", base, topic),
            None => base.to_string(),
        }
    }
}
