//! Settings surface
//!
//! What the sidebar offers: the provider credential, a temperature slider
//! and a model picker. Settings are read once per exchange.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use sdk::SageError;

use crate::llm::ModelParams;
use crate::secrets::SecretString;

/// Temperature preselected on the slider
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Slider increment
pub const TEMPERATURE_STEP: f32 = 0.1;

/// Models offered in the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "llama3-8b-8192", alias = "Llama3-8b-8192")]
    Llama3,

    #[serde(rename = "mixtral-8x7b-32768", alias = "Mixtral-8x7b-32768")]
    Mixtral,

    #[serde(rename = "gemma-7b-it", alias = "Gemma-7b-it")]
    Gemma,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 3] = [ModelChoice::Llama3, ModelChoice::Mixtral, ModelChoice::Gemma];

    /// Label shown in the picker
    pub fn display_name(self) -> &'static str {
        match self {
            ModelChoice::Llama3 => "Llama3-8b-8192",
            ModelChoice::Mixtral => "Mixtral-8x7b-32768",
            ModelChoice::Gemma => "Gemma-7b-it",
        }
    }

    /// Model id sent to the provider
    pub fn id(self) -> &'static str {
        match self {
            ModelChoice::Llama3 => "llama3-8b-8192",
            ModelChoice::Mixtral => "mixtral-8x7b-32768",
            ModelChoice::Gemma => "gemma-7b-it",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelChoice {
    type Err = SageError;

    /// Accepts the id or the display name, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ModelChoice::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(s) || m.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                SageError::Configuration(format!(
                    "Unknown model '{}'. Choose one of: {}",
                    s,
                    ModelChoice::ALL.map(ModelChoice::id).join(", ")
                ))
            })
    }
}

/// Per-exchange settings
#[derive(Debug, Clone)]
pub struct Settings {
    credential: Option<SecretString>,
    temperature: f32,
    model: ModelChoice,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credential: None,
            temperature: DEFAULT_TEMPERATURE,
            model: ModelChoice::default(),
        }
    }
}

impl Settings {
    /// # Errors
    ///
    /// `SageError::Configuration` when the temperature is outside `[0, 1]`.
    pub fn new(
        credential: Option<SecretString>,
        temperature: f32,
        model: ModelChoice,
    ) -> Result<Self, SageError> {
        validate_temperature(temperature)?;
        Ok(Self {
            credential,
            temperature,
            model,
        })
    }

    /// The credential, unless missing or blank
    pub fn credential(&self) -> Option<&SecretString> {
        self.credential.as_ref().filter(|c| !c.is_blank())
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn model(&self) -> ModelChoice {
        self.model
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            model: self.model.id().to_string(),
            temperature: self.temperature,
        }
    }
}

pub fn validate_temperature(temperature: f32) -> Result<(), SageError> {
    if !temperature.is_finite() || !(0.0..=1.0).contains(&temperature) {
        return Err(SageError::Configuration(format!(
            "Temperature must be between 0.0 and 1.0, got {}",
            temperature
        )));
    }
    Ok(())
}
