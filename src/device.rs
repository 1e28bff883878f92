//! Seams to the external MirAIe hub/broker library.
//!
//! Connection handling, authentication and the push transport all live
//! behind these traits; this crate only calls them.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::translate::DeviceCall;
use crate::types::*;

/// Invoked by the device library whenever a new status snapshot arrives.
pub type UpdateCallback = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);

#[async_trait]
pub trait Device: Send + Sync {
    fn id(&self) -> &str;
    fn friendly_name(&self) -> &str;
    fn details(&self) -> DeviceDetails;
    /// Latest pushed status. Cheap to call; never performs I/O.
    fn status(&self) -> DeviceStatus;

    async fn turn_on(&self) -> Result<()>;
    async fn turn_off(&self) -> Result<()>;
    async fn set_temperature(&self, temperature: f64) -> Result<()>;
    async fn set_hvac_mode(&self, mode: AcMode) -> Result<()>;
    async fn set_fan_mode(&self, mode: AcFanMode) -> Result<()>;
    async fn set_v_swing_mode(&self, mode: SwingMode) -> Result<()>;
    async fn set_h_swing_mode(&self, mode: SwingMode) -> Result<()>;
    async fn set_preset_mode(&self, mode: PresetMode) -> Result<()>;
    async fn set_converti_mode(&self, mode: ConvertiMode) -> Result<()>;

    fn register_callback(&self, callback: UpdateCallback) -> CallbackId;
    fn remove_callback(&self, id: CallbackId);
}

/// Issue one planned call on the device.
pub(crate) async fn dispatch(device: &dyn Device, call: DeviceCall) -> Result<()> {
    match call {
        DeviceCall::TurnOn => device.turn_on().await,
        DeviceCall::TurnOff => device.turn_off().await,
        DeviceCall::SetTemperature(t) => device.set_temperature(t).await,
        DeviceCall::SetHvacMode(mode) => device.set_hvac_mode(mode).await,
        DeviceCall::SetFanMode(mode) => device.set_fan_mode(mode).await,
        DeviceCall::SetVSwingMode(mode) => device.set_v_swing_mode(mode).await,
        DeviceCall::SetHSwingMode(mode) => device.set_h_swing_mode(mode).await,
        DeviceCall::SetPresetMode(mode) => device.set_preset_mode(mode).await,
        DeviceCall::SetConvertiMode(mode) => device.set_converti_mode(mode).await,
    }
}

/// An authenticated hub holding the user's home.
pub trait Hub: Send + Sync {
    fn devices(&self) -> Vec<Arc<dyn Device>>;
}

#[async_trait]
pub trait HubConnector: Send + Sync {
    async fn connect(&self, username: &str, password: &str) -> Result<Arc<dyn Hub>>;
}
