use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::device::{self, CallbackId, Device};
use crate::diff::{StateChange, state_changes};
use crate::journal::Journal;
use crate::overrides::{OverrideCache, OverrideTemplates, TemplateUpdate};
use crate::platform::*;
use crate::translate::{self, ClimateState, DeviceCall};
use crate::{Error, Result};

type StateCallback = Box<dyn Fn(&ClimateState) + Send + Sync>;
type ChangeCallback = Box<dyn Fn(&StateChange) + Send + Sync>;

/// Service call as dispatched by the platform, before its strings are
/// checked against the entity's vocabulary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ClimateCommand {
    TurnOn,
    TurnOff,
    SetTemperature { temperature: f64 },
    SetHvacMode { hvac_mode: String },
    SetFanMode { fan_mode: String },
    SetSwingMode { swing_mode: String },
    SetSwingHorizontalMode { swing_horizontal_mode: String },
    SetPresetMode { preset_mode: String },
}

pub enum EntityMessage {
    /// The device pushed a new status snapshot.
    DeviceUpdated,
    /// The platform recomputed one or more tracked templates.
    TemplateResults(Vec<TemplateUpdate>),
    Command(ClimateCommand, oneshot::Sender<Result<()>>),
    Shutdown,
}

/// Cloneable sender side of an entity's message queue.
#[derive(Clone)]
pub struct EntityHandle {
    sender: mpsc::UnboundedSender<EntityMessage>,
    update_pending: Arc<AtomicBool>,
}

impl EntityHandle {
    /// Queue a refresh. At most one refresh is pending at a time; the
    /// snapshot is read when it is handled, so the latest one always wins.
    pub fn device_updated(&self) -> Result<()> {
        if self.update_pending.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.send(EntityMessage::DeviceUpdated)
    }

    pub fn template_results(&self, updates: Vec<TemplateUpdate>) -> Result<()> {
        self.send(EntityMessage::TemplateResults(updates))
    }

    pub async fn command(&self, command: ClimateCommand) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(EntityMessage::Command(command, tx))?;
        rx.await.map_err(|_| Error::Closed)?
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(EntityMessage::Shutdown)
    }

    fn send(&self, msg: EntityMessage) -> Result<()> {
        self.sender.send(msg).map_err(|_| Error::Closed)
    }
}

/// What a device callback keeps of the queue. Holding only a weak sender
/// lets the queue close once every [`EntityHandle`] is gone.
struct UpdateNotifier {
    sender: mpsc::WeakUnboundedSender<EntityMessage>,
    update_pending: Arc<AtomicBool>,
}

impl UpdateNotifier {
    fn notify(&self) {
        if self.update_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let sent = self
            .sender
            .upgrade()
            .is_some_and(|tx| tx.send(EntityMessage::DeviceUpdated).is_ok());
        if !sent {
            self.update_pending.store(false, Ordering::Release);
            trace!("dropping device update: queue closed");
        }
    }
}

pub struct ClimateEntityBuilder {
    device: Arc<dyn Device>,
    templates: OverrideTemplates,
    state_callbacks: Vec<StateCallback>,
    change_callbacks: Vec<ChangeCallback>,
    journal: Option<Journal>,
}

impl ClimateEntityBuilder {
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self {
            device,
            templates: OverrideTemplates::default(),
            state_callbacks: Vec::new(),
            change_callbacks: Vec::new(),
            journal: None,
        }
    }

    pub fn templates(mut self, templates: OverrideTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn on_state(mut self, f: impl Fn(&ClimateState) + Send + Sync + 'static) -> Self {
        self.state_callbacks.push(Box::new(f));
        self
    }

    pub fn on_change(mut self, f: impl Fn(&StateChange) + Send + Sync + 'static) -> Self {
        self.change_callbacks.push(Box::new(f));
        self
    }

    pub fn journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn build(self) -> ClimateEntity {
        let (sender, receiver) = mpsc::unbounded_channel();
        ClimateEntity {
            device: self.device,
            templates: self.templates,
            overrides: OverrideCache::default(),
            capabilities: ClimateCapabilities::default(),
            state_callbacks: self.state_callbacks,
            change_callbacks: self.change_callbacks,
            journal: self.journal,
            last_state: None,
            sender,
            receiver,
            update_pending: Arc::new(AtomicBool::new(false)),
            callback_id: None,
        }
    }
}

/// Climate entity for one MirAIe air conditioner.
///
/// Every read accessor projects the device's current snapshot; nothing but
/// the override cache is kept between reads.
pub struct ClimateEntity {
    device: Arc<dyn Device>,
    templates: OverrideTemplates,
    overrides: OverrideCache,
    capabilities: ClimateCapabilities,
    state_callbacks: Vec<StateCallback>,
    change_callbacks: Vec<ChangeCallback>,
    journal: Option<Journal>,
    last_state: Option<Value>,
    sender: mpsc::UnboundedSender<EntityMessage>,
    receiver: mpsc::UnboundedReceiver<EntityMessage>,
    update_pending: Arc<AtomicBool>,
    callback_id: Option<CallbackId>,
}

impl ClimateEntity {
    pub fn builder(device: Arc<dyn Device>) -> ClimateEntityBuilder {
        ClimateEntityBuilder::new(device)
    }

    /// Handles taken before [`ClimateEntity::run`] feed that run; the run
    /// ends on its own once all of them are dropped.
    pub fn handle(&self) -> EntityHandle {
        EntityHandle {
            sender: self.sender.clone(),
            update_pending: Arc::clone(&self.update_pending),
        }
    }

    // -- Metadata --

    pub fn unique_id(&self) -> &str {
        self.device.id()
    }

    pub fn name(&self) -> &str {
        self.device.friendly_name()
    }

    pub fn icon(&self) -> &'static str {
        ICON
    }

    pub fn translation_key(&self) -> &'static str {
        DOMAIN
    }

    pub fn device_info(&self) -> DeviceInfo {
        let details = self.device.details();
        DeviceInfo {
            identifiers: vec![(DOMAIN.to_string(), self.device.id().to_string())],
            name: self.device.friendly_name().to_string(),
            manufacturer: details.brand,
            model: details.model_number,
            sw_version: details.firmware_version,
        }
    }

    pub fn capabilities(&self) -> &ClimateCapabilities {
        &self.capabilities
    }

    /// Templates the platform should recompute and feed back through
    /// [`EntityHandle::template_results`].
    pub fn tracked_templates(&self) -> Vec<&str> {
        self.templates.tracked()
    }

    pub fn overrides(&self) -> &OverrideCache {
        &self.overrides
    }

    // -- Projection --

    pub fn state(&self) -> ClimateState {
        translate::project(&self.device.status(), &self.overrides)
    }

    pub fn available(&self) -> bool {
        self.device.status().is_online
    }

    pub fn hvac_mode(&self) -> HvacMode {
        let status = self.device.status();
        translate::project_hvac_mode(status.power_mode, status.hvac_mode)
    }

    pub fn fan_mode(&self) -> FanMode {
        translate::project_fan_mode(self.device.status().fan_mode)
    }

    pub fn preset_mode(&self) -> Preset {
        let status = self.device.status();
        translate::project_preset(status.preset_mode, status.converti_mode)
    }

    pub fn swing_mode(&self) -> SwingPosition {
        translate::project_swing(SwingAxis::Vertical, self.device.status().v_swing_mode)
    }

    pub fn swing_horizontal_mode(&self) -> SwingPosition {
        translate::project_swing(SwingAxis::Horizontal, self.device.status().h_swing_mode)
    }

    pub fn target_temperature(&self) -> Option<f64> {
        self.device.status().temperature
    }

    pub fn current_temperature(&self) -> Option<f64> {
        translate::project_current_temperature(&self.device.status(), &self.overrides)
    }

    /// Only known through the humidity override; the unit has no sensor.
    pub fn current_humidity(&self) -> Option<f64> {
        translate::project_current_humidity(&self.overrides)
    }

    // -- Lifecycle --

    /// Subscribe to device pushes and emit the initial state. Does nothing
    /// while already attached.
    pub fn added_to_platform(&mut self) {
        self.attach(self.sender.downgrade());
    }

    fn attach(&mut self, sender: mpsc::WeakUnboundedSender<EntityMessage>) {
        if self.callback_id.is_some() {
            return;
        }
        let notifier = UpdateNotifier {
            sender,
            update_pending: Arc::clone(&self.update_pending),
        };
        let id = self
            .device
            .register_callback(Box::new(move || notifier.notify()));
        self.callback_id = Some(id);
        debug!(
            device = %self.device.id(),
            templates = self.templates.tracked().len(),
            "added to platform"
        );
        self.write_state();
    }

    pub fn will_remove(&mut self) {
        if let Some(id) = self.callback_id.take() {
            self.device.remove_callback(id);
        }
        debug!(device = %self.device.id(), "removed from platform");
    }

    /// Attach, then handle queued messages one at a time until shutdown or
    /// until every handle is dropped, then detach.
    ///
    /// The current queue is moved into the run and a fresh one takes its
    /// place, so the entity itself keeps no sender to the running queue.
    pub async fn run(&mut self) {
        let (next_sender, next_receiver) = mpsc::unbounded_channel();
        let sender = std::mem::replace(&mut self.sender, next_sender);
        let mut receiver = std::mem::replace(&mut self.receiver, next_receiver);

        self.attach(sender.downgrade());
        drop(sender);

        while let Some(msg) = receiver.recv().await {
            if !self.handle_message(msg).await {
                break;
            }
        }
        self.will_remove();
    }

    /// Returns false once the entity should stop.
    pub async fn handle_message(&mut self, msg: EntityMessage) -> bool {
        match msg {
            EntityMessage::DeviceUpdated => {
                self.update_pending.store(false, Ordering::Release);
                self.write_state();
            }
            EntityMessage::TemplateResults(updates) => {
                self.handle_template_results(&updates);
            }
            EntityMessage::Command(command, reply) => {
                let result = self.execute(command).await;
                if reply.send(result).is_err() {
                    trace!("command caller went away");
                }
            }
            EntityMessage::Shutdown => return false,
        }
        true
    }

    /// Fold recomputed template values into the override cache. The state is
    /// re-emitted whenever a tracked template was part of the batch.
    pub fn handle_template_results(&mut self, updates: &[TemplateUpdate]) {
        if self.overrides.apply(&self.templates, updates) {
            self.write_state();
        }
    }

    // -- Command methods --

    pub async fn execute(&mut self, command: ClimateCommand) -> Result<()> {
        match command {
            ClimateCommand::TurnOn => self.turn_on().await,
            ClimateCommand::TurnOff => self.turn_off().await,
            ClimateCommand::SetTemperature { temperature } => {
                self.set_temperature(temperature).await
            }
            ClimateCommand::SetHvacMode { hvac_mode } => {
                self.set_hvac_mode(HvacMode::parse(&hvac_mode)?).await
            }
            ClimateCommand::SetFanMode { fan_mode } => {
                self.set_fan_mode(FanMode::parse(&fan_mode)?).await
            }
            ClimateCommand::SetSwingMode { swing_mode } => self.set_swing_mode(&swing_mode).await,
            ClimateCommand::SetSwingHorizontalMode {
                swing_horizontal_mode,
            } => self.set_swing_horizontal_mode(&swing_horizontal_mode).await,
            ClimateCommand::SetPresetMode { preset_mode } => {
                self.set_preset_mode(Preset::parse(&preset_mode)?).await
            }
        }
    }

    pub async fn turn_on(&mut self) -> Result<()> {
        self.set_hvac_mode(HvacMode::Cool).await
    }

    pub async fn turn_off(&mut self) -> Result<()> {
        self.set_hvac_mode(HvacMode::Off).await
    }

    /// Range and step are enforced by the platform; the value is passed through.
    pub async fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        debug!(device = %self.device.id(), temperature, "set temperature");
        self.issue("set_temperature", vec![DeviceCall::SetTemperature(temperature)])
            .await
    }

    pub async fn set_hvac_mode(&mut self, mode: HvacMode) -> Result<()> {
        debug!(device = %self.device.id(), mode = %mode, "set hvac mode");
        let calls = translate::hvac_mode_calls(mode, self.device.status().power_mode);
        self.issue("set_hvac_mode", calls).await
    }

    pub async fn set_fan_mode(&mut self, mode: FanMode) -> Result<()> {
        debug!(device = %self.device.id(), mode = %mode, "set fan mode");
        let call = DeviceCall::SetFanMode(translate::ac_fan_mode_for(mode));
        self.issue("set_fan_mode", vec![call]).await
    }

    pub async fn set_swing_mode(&mut self, token: &str) -> Result<()> {
        debug!(device = %self.device.id(), token, "set swing vertical mode");
        let position = SwingPosition::parse(SwingAxis::Vertical, token);
        self.issue("set_swing_mode", vec![translate::swing_call(position)])
            .await
    }

    pub async fn set_swing_horizontal_mode(&mut self, token: &str) -> Result<()> {
        debug!(device = %self.device.id(), token, "set swing horizontal mode");
        let position = SwingPosition::parse(SwingAxis::Horizontal, token);
        self.issue("set_swing_horizontal_mode", vec![translate::swing_call(position)])
            .await
    }

    pub async fn set_preset_mode(&mut self, preset: Preset) -> Result<()> {
        debug!(device = %self.device.id(), preset = %preset, "set preset mode");
        self.issue("set_preset_mode", vec![translate::preset_call(preset)])
            .await
    }

    // -- Helpers --

    /// Issue calls in order, stopping at the first failure, which is
    /// returned as the device reported it.
    async fn issue(&mut self, action: &str, calls: Vec<DeviceCall>) -> Result<()> {
        let device = Arc::clone(&self.device);
        for call in calls {
            let call_id = self
                .journal
                .as_mut()
                .map(|j| j.log_call(device.id(), action, &call));

            trace!(device = %device.id(), call = call.name(), "issuing device call");
            if let Err(e) = device::dispatch(device.as_ref(), call).await {
                if let (Some(journal), Some(id)) = (self.journal.as_mut(), call_id) {
                    journal.log_failure(device.id(), id, &e.to_string());
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn write_state(&mut self) {
        let state = self.state();
        let value = match serde_json::to_value(&state) {
            Ok(v) => v,
            Err(e) => {
                warn!(device = %self.device.id(), "failed to serialize state: {e}");
                return;
            }
        };

        let changes = state_changes(self.last_state.as_ref(), &value);
        for change in &changes {
            for cb in &self.change_callbacks {
                cb(change);
            }
        }
        for cb in &self.state_callbacks {
            cb(&state);
        }

        if let Some(ref mut journal) = self.journal {
            journal.log_state(self.device.id(), &value);
        }

        debug!(
            device = %self.device.id(),
            changes = changes.len(),
            "state written"
        );
        self.last_state = Some(value);
    }
}
