use serde::Deserialize;

use crate::Result;
use crate::overrides::OverrideTemplates;

/// Integration-level options. Unknown keys are ignored so the section can be
/// shared with other settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    pub current_temperature_template: Option<String>,
    pub current_humidity_template: Option<String>,
}

impl IntegrationConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn templates(&self) -> OverrideTemplates {
        OverrideTemplates {
            temperature: self.current_temperature_template.clone(),
            humidity: self.current_humidity_template.clone(),
        }
    }
}

/// Stored credentials for one MirAIe account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub username: String,
    pub password: String,
}

impl ConfigEntry {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
