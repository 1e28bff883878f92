use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{ConfigEntry, IntegrationConfig};
use crate::device::{Hub, HubConnector};
use crate::entity::{ClimateEntity, EntityHandle};
use crate::{Error, Result};

/// Per-process integration state, handed explicitly to whatever creates
/// entities: the connected hubs by config entry id and the shared options.
pub struct IntegrationContext {
    config: IntegrationConfig,
    connector: Arc<dyn HubConnector>,
    hubs: HashMap<String, Arc<dyn Hub>>,
    entities: HashMap<String, Vec<EntityHandle>>,
}

impl IntegrationContext {
    pub fn new(config: IntegrationConfig, connector: Arc<dyn HubConnector>) -> Self {
        Self {
            config,
            connector,
            hubs: HashMap::new(),
            entities: HashMap::new(),
        }
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    /// Connect the entry's account and register its hub. Re-running for the
    /// same entry replaces the previous hub.
    pub async fn setup_entry(&mut self, entry: &ConfigEntry) -> Result<()> {
        debug!(entry = %entry.entry_id, "setting up entry");
        let hub = self
            .connector
            .connect(&entry.username, &entry.password)
            .await?;
        self.hubs.insert(entry.entry_id.clone(), hub);
        Ok(())
    }

    /// Shut down the entry's entities and drop its hub. Returns whether the
    /// entry was loaded.
    pub fn unload_entry(&mut self, entry_id: &str) -> bool {
        let removed = self.hubs.remove(entry_id).is_some();
        let handles = self.entities.remove(entry_id).unwrap_or_default();
        for handle in &handles {
            // a dropped or already stopped entity has nothing to detach
            if handle.shutdown().is_err() {
                trace!(entry = %entry_id, "entity queue already closed");
            }
        }
        debug!(entry = %entry_id, removed, entities = handles.len(), "unloading entry");
        removed
    }

    pub fn hub(&self, entry_id: &str) -> Option<&Arc<dyn Hub>> {
        self.hubs.get(entry_id)
    }

    /// One climate entity per device in the entry's home, all sharing the
    /// integration's override templates. Their handles are kept so that
    /// unloading the entry stops them.
    pub fn climate_entities(&mut self, entry_id: &str) -> Result<Vec<ClimateEntity>> {
        let hub = self
            .hubs
            .get(entry_id)
            .ok_or_else(|| Error::UnknownEntry(entry_id.to_string()))?;
        let templates = self.config.templates();
        let entities: Vec<ClimateEntity> = hub
            .devices()
            .into_iter()
            .map(|device| {
                ClimateEntity::builder(device)
                    .templates(templates.clone())
                    .build()
            })
            .collect();
        self.entities
            .entry(entry_id.to_string())
            .or_default()
            .extend(entities.iter().map(ClimateEntity::handle));
        debug!(entry = %entry_id, count = entities.len(), "created climate entities");
        Ok(entities)
    }
}
