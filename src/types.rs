//! Vendor-side vocabulary as reported and accepted by MirAIe devices.

use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerMode {
    On,
    #[default]
    Off,
}

impl PowerMode {
    pub fn as_miraie_str(&self) -> &'static str {
        match self {
            PowerMode::On => "on",
            PowerMode::Off => "off",
        }
    }

    pub fn from_miraie_str(s: &str) -> Option<Self> {
        match s {
            "on" => Some(PowerMode::On),
            "off" => Some(PowerMode::Off),
            _ => None,
        }
    }
}

/// Operating mode stored on the unit. Survives power-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcMode {
    Auto,
    #[default]
    Cool,
    Dry,
    Fan,
}

impl AcMode {
    pub fn as_miraie_str(&self) -> &'static str {
        match self {
            AcMode::Auto => "auto",
            AcMode::Cool => "cool",
            AcMode::Dry => "dry",
            AcMode::Fan => "fan",
        }
    }

    pub fn from_miraie_str(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(AcMode::Auto),
            "cool" => Some(AcMode::Cool),
            "dry" => Some(AcMode::Dry),
            "fan" => Some(AcMode::Fan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcFanMode {
    #[default]
    Auto,
    Quiet,
    Low,
    Medium,
    High,
}

impl AcFanMode {
    pub fn as_miraie_str(&self) -> &'static str {
        match self {
            AcFanMode::Auto => "auto",
            AcFanMode::Quiet => "quiet",
            AcFanMode::Low => "low",
            AcFanMode::Medium => "medium",
            AcFanMode::High => "high",
        }
    }

    pub fn from_miraie_str(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(AcFanMode::Auto),
            "quiet" => Some(AcFanMode::Quiet),
            "low" => Some(AcFanMode::Low),
            "medium" => Some(AcFanMode::Medium),
            "high" => Some(AcFanMode::High),
            _ => None,
        }
    }
}

/// Louver position as the vendor encodes it. Only 0..=5 are meaningful,
/// but the device may report anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SwingMode(pub u8);

impl SwingMode {
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetMode {
    #[default]
    None,
    Eco,
    Boost,
    Clean,
}

impl PresetMode {
    pub fn as_miraie_str(&self) -> &'static str {
        match self {
            PresetMode::None => "none",
            PresetMode::Eco => "eco",
            PresetMode::Boost => "boost",
            PresetMode::Clean => "clean",
        }
    }

    pub fn from_miraie_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(PresetMode::None),
            "eco" => Some(PresetMode::Eco),
            "boost" => Some(PresetMode::Boost),
            "clean" => Some(PresetMode::Clean),
            _ => None,
        }
    }
}

/// Secondary "converti" capacity preset. `Off` and `NotSet` both mean the
/// axis is inactive and the primary preset is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvertiMode {
    Off,
    #[default]
    NotSet,
    Level(u8),
}

impl ConvertiMode {
    /// Levels the units advertise, highest first.
    pub const LEVELS: [u8; 7] = [110, 100, 90, 80, 70, 55, 40];

    /// Build from a level number. Level 0 is the vendor's "off".
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => ConvertiMode::Off,
            n => ConvertiMode::Level(n),
        }
    }

    pub fn from_miraie_value(value: Option<u8>) -> Self {
        match value {
            None => ConvertiMode::NotSet,
            Some(n) => ConvertiMode::from_level(n),
        }
    }

    pub fn to_miraie_value(&self) -> Option<u8> {
        match self {
            ConvertiMode::Off => Some(0),
            ConvertiMode::NotSet => None,
            ConvertiMode::Level(n) => Some(*n),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ConvertiMode::Level(_))
    }
}

impl Serialize for ConvertiMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_miraie_value().serialize(serializer)
    }
}

impl fmt::Display for ConvertiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertiMode::Off => write!(f, "off"),
            ConvertiMode::NotSet => write!(f, "not set"),
            ConvertiMode::Level(n) => write!(f, "{n}"),
        }
    }
}

/// Live status snapshot as last pushed by the device.
#[derive(Debug, Clone, Default)]
pub struct DeviceStatus {
    pub is_online: bool,
    pub power_mode: PowerMode,
    pub hvac_mode: AcMode,
    /// Target temperature in Celsius.
    pub temperature: Option<f64>,
    pub room_temperature: Option<f64>,
    pub fan_mode: AcFanMode,
    pub v_swing_mode: SwingMode,
    pub h_swing_mode: SwingMode,
    pub preset_mode: PresetMode,
    pub converti_mode: ConvertiMode,
}

#[derive(Debug, Clone, Default)]
pub struct DeviceDetails {
    pub brand: String,
    pub model_number: String,
    pub firmware_version: String,
}
