mod config;
mod device;
mod diff;
mod entity;
mod error;
mod integration;
mod journal;
mod overrides;
mod platform;
mod translate;
mod types;

pub use config::{ConfigEntry, IntegrationConfig};
pub use device::{CallbackId, Device, Hub, HubConnector, UpdateCallback};
pub use diff::StateChange;
pub use entity::{ClimateCommand, ClimateEntity, ClimateEntityBuilder, EntityHandle, EntityMessage};
pub use error::{DeviceError, Error, Result};
pub use integration::IntegrationContext;
pub use journal::{Journal, JournalMode};
pub use overrides::{
    OverrideCache, OverrideTemplates, STATE_UNAVAILABLE, STATE_UNKNOWN, TemplateResult,
    TemplateUpdate,
};
pub use platform::*;
pub use translate::*;
pub use types::*;
