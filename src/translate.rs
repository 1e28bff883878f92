//! Mode translation between the platform vocabulary and the MirAIe vocabulary.
//!
//! Both directions are total. Some mappings are deliberately lossy: the
//! vendor has no "fan off", so platform `off` is sent as `quiet` and `quiet`
//! always reads back as `off`; every swing value outside 1..=5 reads as
//! position 0.

use serde::Serialize;

use crate::overrides::OverrideCache;
use crate::platform::{FanMode, HvacMode, Preset, SwingAxis, SwingPosition};
use crate::types::*;

/// A single delegated call on the device, in the order it must be issued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "call", content = "value", rename_all = "snake_case")]
pub enum DeviceCall {
    TurnOn,
    TurnOff,
    SetTemperature(f64),
    SetHvacMode(AcMode),
    SetFanMode(AcFanMode),
    SetVSwingMode(SwingMode),
    SetHSwingMode(SwingMode),
    SetPresetMode(PresetMode),
    SetConvertiMode(ConvertiMode),
}

impl DeviceCall {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceCall::TurnOn => "turn_on",
            DeviceCall::TurnOff => "turn_off",
            DeviceCall::SetTemperature(_) => "set_temperature",
            DeviceCall::SetHvacMode(_) => "set_hvac_mode",
            DeviceCall::SetFanMode(_) => "set_fan_mode",
            DeviceCall::SetVSwingMode(_) => "set_v_swing_mode",
            DeviceCall::SetHSwingMode(_) => "set_h_swing_mode",
            DeviceCall::SetPresetMode(_) => "set_preset_mode",
            DeviceCall::SetConvertiMode(_) => "set_converti_mode",
        }
    }
}

// -- Command direction --

pub fn ac_mode_for(mode: HvacMode) -> Option<AcMode> {
    match mode {
        HvacMode::Off => None,
        HvacMode::Auto => Some(AcMode::Auto),
        HvacMode::Cool => Some(AcMode::Cool),
        HvacMode::Dry => Some(AcMode::Dry),
        HvacMode::FanOnly => Some(AcMode::Fan),
    }
}

/// Calls needed to put the unit in `mode`. A unit that is off is powered on
/// before its mode is changed.
pub fn hvac_mode_calls(mode: HvacMode, power: PowerMode) -> Vec<DeviceCall> {
    match ac_mode_for(mode) {
        None => vec![DeviceCall::TurnOff],
        Some(ac_mode) => {
            let mut calls = Vec::with_capacity(2);
            if power == PowerMode::Off {
                calls.push(DeviceCall::TurnOn);
            }
            calls.push(DeviceCall::SetHvacMode(ac_mode));
            calls
        }
    }
}

pub fn ac_fan_mode_for(mode: FanMode) -> AcFanMode {
    match mode {
        FanMode::Off => AcFanMode::Quiet,
        FanMode::Auto => AcFanMode::Auto,
        FanMode::Low => AcFanMode::Low,
        FanMode::Medium => AcFanMode::Medium,
        FanMode::High => AcFanMode::High,
    }
}

pub fn swing_call(position: SwingPosition) -> DeviceCall {
    let swing = SwingMode(position.level());
    match position.axis() {
        SwingAxis::Vertical => DeviceCall::SetVSwingMode(swing),
        SwingAxis::Horizontal => DeviceCall::SetHSwingMode(swing),
    }
}

pub fn preset_call(preset: Preset) -> DeviceCall {
    match preset {
        Preset::Primary(mode) => DeviceCall::SetPresetMode(mode),
        Preset::Converti(level) => DeviceCall::SetConvertiMode(ConvertiMode::from_level(level)),
    }
}

// -- Projection direction --

/// Power state wins over the stored operating mode.
pub fn project_hvac_mode(power: PowerMode, mode: AcMode) -> HvacMode {
    if power == PowerMode::Off {
        return HvacMode::Off;
    }
    match mode {
        AcMode::Auto => HvacMode::Auto,
        AcMode::Cool => HvacMode::Cool,
        AcMode::Dry => HvacMode::Dry,
        AcMode::Fan => HvacMode::FanOnly,
    }
}

pub fn project_fan_mode(mode: AcFanMode) -> FanMode {
    match mode {
        AcFanMode::Quiet => FanMode::Off,
        AcFanMode::Auto => FanMode::Auto,
        AcFanMode::Low => FanMode::Low,
        AcFanMode::Medium => FanMode::Medium,
        AcFanMode::High => FanMode::High,
    }
}

pub fn project_preset(preset: PresetMode, converti: ConvertiMode) -> Preset {
    match converti {
        ConvertiMode::Off | ConvertiMode::NotSet => Preset::Primary(preset),
        ConvertiMode::Level(level) => Preset::Converti(level),
    }
}

pub fn project_swing(axis: SwingAxis, swing: SwingMode) -> SwingPosition {
    match swing.value() {
        level @ 1..=5 => SwingPosition::new(axis, level),
        _ => SwingPosition::new(axis, 0),
    }
}

/// Override first, then the unit's own room sensor.
pub fn project_current_temperature(status: &DeviceStatus, overrides: &OverrideCache) -> Option<f64> {
    overrides.temperature().or(status.room_temperature)
}

/// The unit has no humidity sensor; only the override can supply one.
pub fn project_current_humidity(overrides: &OverrideCache) -> Option<f64> {
    overrides.humidity()
}

/// Platform-facing view of one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateState {
    pub available: bool,
    pub hvac_mode: HvacMode,
    pub fan_mode: FanMode,
    pub preset_mode: Preset,
    pub swing_mode: SwingPosition,
    pub swing_horizontal_mode: SwingPosition,
    pub target_temperature: Option<f64>,
    pub current_temperature: Option<f64>,
    pub current_humidity: Option<f64>,
}

pub fn project(status: &DeviceStatus, overrides: &OverrideCache) -> ClimateState {
    ClimateState {
        available: status.is_online,
        hvac_mode: project_hvac_mode(status.power_mode, status.hvac_mode),
        fan_mode: project_fan_mode(status.fan_mode),
        preset_mode: project_preset(status.preset_mode, status.converti_mode),
        swing_mode: project_swing(SwingAxis::Vertical, status.v_swing_mode),
        swing_horizontal_mode: project_swing(SwingAxis::Horizontal, status.h_swing_mode),
        target_temperature: status.temperature,
        current_temperature: project_current_temperature(status, overrides),
        current_humidity: project_current_humidity(overrides),
    }
}
