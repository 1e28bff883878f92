#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use miraie_climate::*;

/// In-memory device that records every call, applies it to its status and
/// pushes an update, the way the real broker reflects commands back.
pub struct FakeDevice {
    id: String,
    name: String,
    pub status: Mutex<DeviceStatus>,
    pub calls: Mutex<Vec<String>>,
    pub fail_on: Mutex<Option<&'static str>>,
    callbacks: Mutex<HashMap<u64, UpdateCallback>>,
    next_id: AtomicU64,
}

impl FakeDevice {
    pub fn new(id: &str, status: DeviceStatus) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            name: format!("{id} AC"),
            status: Mutex::new(status),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
            callbacks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn online(id: &str) -> Arc<Self> {
        Self::new(
            id,
            DeviceStatus {
                is_online: true,
                power_mode: PowerMode::On,
                hvac_mode: AcMode::Cool,
                temperature: Some(24.0),
                room_temperature: Some(27.5),
                ..Default::default()
            },
        )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }

    /// Callbacks ever registered, including removed ones.
    pub fn registrations(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }

    /// Replace the status and fire push callbacks.
    pub fn push(&self, f: impl FnOnce(&mut DeviceStatus)) {
        {
            let mut status = self.status.lock().unwrap();
            f(&mut *status);
        }
        for cb in self.callbacks.lock().unwrap().values() {
            cb();
        }
    }

    fn record(&self, name: &'static str, arg: String, apply: impl FnOnce(&mut DeviceStatus)) -> Result<()> {
        self.calls.lock().unwrap().push(if arg.is_empty() {
            name.to_string()
        } else {
            format!("{name}({arg})")
        });
        if *self.fail_on.lock().unwrap() == Some(name) {
            return Err(Error::device(format!("{name} rejected by broker")));
        }
        let mut status = self.status.lock().unwrap();
        apply(&mut *status);
        Ok(())
    }
}

#[async_trait]
impl Device for FakeDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn friendly_name(&self) -> &str {
        &self.name
    }

    fn details(&self) -> DeviceDetails {
        DeviceDetails {
            brand: "Panasonic".to_string(),
            model_number: "CS-NU12YKY5W".to_string(),
            firmware_version: "1.2.3".to_string(),
        }
    }

    fn status(&self) -> DeviceStatus {
        self.status.lock().unwrap().clone()
    }

    async fn turn_on(&self) -> Result<()> {
        self.record("turn_on", String::new(), |s| s.power_mode = PowerMode::On)
    }

    async fn turn_off(&self) -> Result<()> {
        self.record("turn_off", String::new(), |s| s.power_mode = PowerMode::Off)
    }

    async fn set_temperature(&self, temperature: f64) -> Result<()> {
        self.record("set_temperature", temperature.to_string(), |s| {
            s.temperature = Some(temperature)
        })
    }

    async fn set_hvac_mode(&self, mode: AcMode) -> Result<()> {
        self.record("set_hvac_mode", mode.as_miraie_str().to_string(), |s| s.hvac_mode = mode)
    }

    async fn set_fan_mode(&self, mode: AcFanMode) -> Result<()> {
        self.record("set_fan_mode", mode.as_miraie_str().to_string(), |s| s.fan_mode = mode)
    }

    async fn set_v_swing_mode(&self, mode: SwingMode) -> Result<()> {
        self.record("set_v_swing_mode", mode.value().to_string(), |s| s.v_swing_mode = mode)
    }

    async fn set_h_swing_mode(&self, mode: SwingMode) -> Result<()> {
        self.record("set_h_swing_mode", mode.value().to_string(), |s| s.h_swing_mode = mode)
    }

    async fn set_preset_mode(&self, mode: PresetMode) -> Result<()> {
        self.record("set_preset_mode", mode.as_miraie_str().to_string(), |s| {
            s.preset_mode = mode;
            s.converti_mode = ConvertiMode::Off;
        })
    }

    async fn set_converti_mode(&self, mode: ConvertiMode) -> Result<()> {
        self.record("set_converti_mode", mode.to_string(), |s| s.converti_mode = mode)
    }

    fn register_callback(&self, callback: UpdateCallback) -> CallbackId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.lock().unwrap().insert(id, callback);
        CallbackId(id)
    }

    fn remove_callback(&self, id: CallbackId) {
        self.callbacks.lock().unwrap().remove(&id.0);
    }
}

pub struct FakeHub {
    pub devices: Vec<Arc<FakeDevice>>,
}

impl Hub for FakeHub {
    fn devices(&self) -> Vec<Arc<dyn Device>> {
        self.devices
            .iter()
            .map(|d| Arc::clone(d) as Arc<dyn Device>)
            .collect()
    }
}

pub struct FakeConnector {
    pub password: String,
    pub devices: Vec<Arc<FakeDevice>>,
    pub logins: Mutex<Vec<String>>,
}

#[async_trait]
impl HubConnector for FakeConnector {
    async fn connect(&self, username: &str, password: &str) -> Result<Arc<dyn Hub>> {
        self.logins.lock().unwrap().push(username.to_string());
        if password != self.password {
            return Err(Error::device("invalid credentials"));
        }
        Ok(Arc::new(FakeHub {
            devices: self.devices.clone(),
        }))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
