//! Platform-side vocabulary: what the hosting home-automation platform shows
//! and sends, plus the entity's static capability declaration.

use std::fmt;
use std::ops::BitOr;

use serde::{Serialize, Serializer};

use crate::types::{ConvertiMode, PresetMode};
use crate::{Error, Result};

pub const DOMAIN: &str = "miraie";
pub const ICON: &str = "mdi:air-conditioner";

pub const MIN_TEMP: f64 = 16.0;
pub const MAX_TEMP: f64 = 30.0;
pub const TEMP_STEP: f64 = 0.5;
pub const PRECISION_HALVES: f64 = 0.5;

/// Prefix of converti presets in the combined preset vocabulary.
pub const CONVERTI_PREFIX: &str = "cv ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Auto,
    Cool,
    Dry,
    FanOnly,
}

impl HvacMode {
    pub const ALL: [HvacMode; 5] = [
        HvacMode::Auto,
        HvacMode::Cool,
        HvacMode::Off,
        HvacMode::Dry,
        HvacMode::FanOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Auto => "auto",
            HvacMode::Cool => "cool",
            HvacMode::Dry => "dry",
            HvacMode::FanOnly => "fan_only",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "off" => Ok(HvacMode::Off),
            "auto" => Ok(HvacMode::Auto),
            "cool" => Ok(HvacMode::Cool),
            "dry" => Ok(HvacMode::Dry),
            "fan_only" => Ok(HvacMode::FanOnly),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    Auto,
    Low,
    Medium,
    High,
    Off,
}

impl FanMode {
    pub const ALL: [FanMode; 5] = [
        FanMode::Auto,
        FanMode::Low,
        FanMode::Medium,
        FanMode::High,
        FanMode::Off,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FanMode::Auto => "auto",
            FanMode::Low => "low",
            FanMode::Medium => "medium",
            FanMode::High => "high",
            FanMode::Off => "off",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(FanMode::Auto),
            "low" => Ok(FanMode::Low),
            "medium" => Ok(FanMode::Medium),
            "high" => Ok(FanMode::High),
            "off" => Ok(FanMode::Off),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combined preset vocabulary: the primary preset axis and the converti
/// axis shown through one list of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Primary(PresetMode),
    Converti(u8),
}

impl Preset {
    pub fn all() -> Vec<Preset> {
        let mut presets = vec![
            Preset::Primary(PresetMode::None),
            Preset::Primary(PresetMode::Eco),
            Preset::Primary(PresetMode::Boost),
            Preset::Primary(PresetMode::Clean),
        ];
        presets.extend(ConvertiMode::LEVELS.iter().map(|&l| Preset::Converti(l)));
        presets
    }

    /// Parse a preset name. Anything starting with `cv` must carry a level.
    pub fn parse(s: &str) -> Result<Self> {
        if s.starts_with(CONVERTI_PREFIX.trim_end()) {
            let level = s
                .strip_prefix(CONVERTI_PREFIX)
                .and_then(|rest| rest.trim().parse::<u8>().ok())
                .ok_or_else(|| Error::InvalidPreset(s.to_string()))?;
            return Ok(Preset::Converti(level));
        }
        PresetMode::from_miraie_str(s)
            .map(Preset::Primary)
            .ok_or_else(|| Error::InvalidPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Primary(mode) => f.write_str(mode.as_miraie_str()),
            Preset::Converti(level) => write!(f, "{CONVERTI_PREFIX}{level}"),
        }
    }
}

impl Serialize for Preset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwingAxis {
    Vertical,
    Horizontal,
}

impl SwingAxis {
    fn prefix(&self) -> char {
        match self {
            SwingAxis::Vertical => 'v',
            SwingAxis::Horizontal => 'h',
        }
    }
}

/// Louver position token, `v0`..`v5` or `h0`..`h5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwingPosition {
    axis: SwingAxis,
    level: u8,
}

impl SwingPosition {
    /// Levels above 5 collapse to 0.
    pub fn new(axis: SwingAxis, level: u8) -> Self {
        let level = if level <= crate::types::SwingMode::MAX { level } else { 0 };
        Self { axis, level }
    }

    /// Unrecognised tokens read as position 0.
    pub fn parse(axis: SwingAxis, token: &str) -> Self {
        let mut chars = token.chars();
        let level = match (chars.next(), chars.next(), chars.next()) {
            (Some(p), Some(d), None) if p == axis.prefix() => d.to_digit(10).unwrap_or(0) as u8,
            _ => 0,
        };
        Self::new(axis, level)
    }

    pub fn all(axis: SwingAxis) -> Vec<SwingPosition> {
        (0..=crate::types::SwingMode::MAX)
            .map(|l| SwingPosition::new(axis, l))
            .collect()
    }

    pub fn axis(&self) -> SwingAxis {
        self.axis
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl fmt::Display for SwingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.axis.prefix(), self.level)
    }
}

impl Serialize for SwingPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Climate feature flags, bit-compatible with the platform's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct EntityFeature(u32);

impl EntityFeature {
    pub const TARGET_TEMPERATURE: EntityFeature = EntityFeature(1);
    pub const FAN_MODE: EntityFeature = EntityFeature(8);
    pub const PRESET_MODE: EntityFeature = EntityFeature(16);
    pub const SWING_MODE: EntityFeature = EntityFeature(32);
    pub const TURN_OFF: EntityFeature = EntityFeature(128);
    pub const TURN_ON: EntityFeature = EntityFeature(256);
    pub const SWING_HORIZONTAL_MODE: EntityFeature = EntityFeature(512);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: EntityFeature) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for EntityFeature {
    type Output = EntityFeature;

    fn bitor(self, rhs: Self) -> Self::Output {
        EntityFeature(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureUnit {
    #[serde(rename = "°C")]
    Celsius,
}

/// Static capability declaration of a MirAIe climate entity.
#[derive(Debug, Clone, Serialize)]
pub struct ClimateCapabilities {
    pub hvac_modes: Vec<HvacMode>,
    pub fan_modes: Vec<FanMode>,
    pub swing_modes: Vec<SwingPosition>,
    pub swing_horizontal_modes: Vec<SwingPosition>,
    pub preset_modes: Vec<Preset>,
    pub min_temp: f64,
    pub max_temp: f64,
    pub target_temperature_step: f64,
    pub precision: f64,
    pub temperature_unit: TemperatureUnit,
    pub supported_features: EntityFeature,
}

impl Default for ClimateCapabilities {
    fn default() -> Self {
        Self {
            hvac_modes: HvacMode::ALL.to_vec(),
            fan_modes: FanMode::ALL.to_vec(),
            swing_modes: SwingPosition::all(SwingAxis::Vertical),
            swing_horizontal_modes: SwingPosition::all(SwingAxis::Horizontal),
            preset_modes: Preset::all(),
            min_temp: MIN_TEMP,
            max_temp: MAX_TEMP,
            target_temperature_step: TEMP_STEP,
            precision: PRECISION_HALVES,
            temperature_unit: TemperatureUnit::Celsius,
            supported_features: EntityFeature::TARGET_TEMPERATURE
                | EntityFeature::FAN_MODE
                | EntityFeature::PRESET_MODE
                | EntityFeature::SWING_MODE
                | EntityFeature::TURN_OFF
                | EntityFeature::TURN_ON
                | EntityFeature::SWING_HORIZONTAL_MODE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swing_token_roundtrip() {
        for axis in [SwingAxis::Vertical, SwingAxis::Horizontal] {
            for pos in SwingPosition::all(axis) {
                assert_eq!(SwingPosition::parse(axis, &pos.to_string()), pos);
            }
        }
    }

    #[test]
    fn swing_token_wrong_axis_reads_zero() {
        let pos = SwingPosition::parse(SwingAxis::Vertical, "h3");
        assert_eq!(pos.level(), 0);
        assert_eq!(pos.to_string(), "v0");
    }

    #[test]
    fn swing_token_out_of_range_reads_zero() {
        assert_eq!(SwingPosition::parse(SwingAxis::Horizontal, "h9").level(), 0);
        assert_eq!(SwingPosition::parse(SwingAxis::Horizontal, "h").level(), 0);
        assert_eq!(SwingPosition::parse(SwingAxis::Horizontal, "h12").level(), 0);
    }

    #[test]
    fn preset_parse_converti() {
        assert_eq!(Preset::parse("cv 80").unwrap(), Preset::Converti(80));
        assert_eq!(Preset::parse("cv 110").unwrap().to_string(), "cv 110");
    }

    #[test]
    fn preset_parse_rejects_malformed_converti() {
        assert!(matches!(Preset::parse("cv"), Err(Error::InvalidPreset(_))));
        assert!(matches!(Preset::parse("cv eighty"), Err(Error::InvalidPreset(_))));
    }

    #[test]
    fn preset_parse_unknown_name() {
        assert!(matches!(Preset::parse("turbo"), Err(Error::InvalidPreset(_))));
    }

    #[test]
    fn capabilities_list_every_preset() {
        let caps = ClimateCapabilities::default();
        let names: Vec<String> = caps.preset_modes.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "none", "eco", "boost", "clean", "cv 110", "cv 100", "cv 90", "cv 80", "cv 70",
                "cv 55", "cv 40"
            ]
        );
        assert_eq!(caps.supported_features.bits(), 1 | 8 | 16 | 32 | 128 | 256 | 512);
    }

    #[test]
    fn capabilities_serialize_as_platform_strings() {
        let value = serde_json::to_value(ClimateCapabilities::default()).unwrap();
        assert_eq!(value["hvac_modes"][4], "fan_only");
        assert_eq!(value["swing_modes"][0], "v0");
        assert_eq!(value["swing_horizontal_modes"][5], "h5");
        assert_eq!(value["temperature_unit"], "°C");
    }
}
