//! Current temperature/humidity overrides fed by platform templates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

pub const STATE_UNAVAILABLE: &str = "unavailable";
pub const STATE_UNKNOWN: &str = "unknown";

/// Template strings the platform should track on behalf of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTemplates {
    pub temperature: Option<String>,
    pub humidity: Option<String>,
}

impl OverrideTemplates {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.humidity.is_none()
    }

    /// Templates to subscribe to, temperature first.
    pub fn tracked(&self) -> Vec<&str> {
        self.temperature
            .iter()
            .chain(self.humidity.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn is_tracked(&self, template: &str) -> bool {
        self.temperature.as_deref() == Some(template) || self.humidity.as_deref() == Some(template)
    }
}

/// Outcome of one template recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateResult {
    Rendered(Value),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    pub template: String,
    pub result: TemplateResult,
}

impl TemplateUpdate {
    pub fn rendered(template: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            template: template.into(),
            result: TemplateResult::Rendered(value.into()),
        }
    }

    pub fn error(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            result: TemplateResult::Error(message.into()),
        }
    }
}

/// Last known good override values. Bad results never clear a value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverrideCache {
    temperature: Option<f64>,
    humidity: Option<f64>,
}

impl OverrideCache {
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn humidity(&self) -> Option<f64> {
        self.humidity
    }

    /// Apply a batch of recomputed results. Returns true when at least one
    /// update belonged to a tracked template, whether or not a value changed.
    pub fn apply(&mut self, templates: &OverrideTemplates, updates: &[TemplateUpdate]) -> bool {
        let mut touched = false;
        for update in updates {
            if !templates.is_tracked(&update.template) {
                continue;
            }
            touched = true;

            let Some(value) = usable_value(&update.result) else {
                trace!(template = %update.template, "skipping template result");
                continue;
            };

            if templates.temperature.as_deref() == Some(update.template.as_str()) {
                self.temperature = Some(value);
            }
            if templates.humidity.as_deref() == Some(update.template.as_str()) {
                self.humidity = Some(value);
            }
        }
        touched
    }
}

fn usable_value(result: &TemplateResult) -> Option<f64> {
    match result {
        TemplateResult::Error(_) => None,
        TemplateResult::Rendered(Value::Number(n)) => n.as_f64(),
        TemplateResult::Rendered(Value::String(s)) => {
            if s == STATE_UNAVAILABLE || s == STATE_UNKNOWN {
                return None;
            }
            s.trim().parse().ok()
        }
        TemplateResult::Rendered(_) => None,
    }
}
