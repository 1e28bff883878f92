use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::diff::state_changes;
use crate::translate::DeviceCall;

pub enum JournalMode {
    Full,
    Diffed,
}

/// NDJSON record of device calls and emitted states.
pub struct Journal {
    mode: JournalMode,
    file: File,
    previous_state: HashMap<String, Value>,
}

impl Journal {
    pub fn open(mode: JournalMode, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            mode,
            file,
            previous_state: HashMap::new(),
        })
    }

    /// Records a call about to be issued and returns its correlation id.
    pub fn log_call(&mut self, device_id: &str, action: &str, call: &DeviceCall) -> Uuid {
        let id = Uuid::new_v4();
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "call",
            "id": id.to_string(),
            "device": device_id,
            "action": action,
            "body": call,
        });
        self.write_line(&entry);
        id
    }

    pub fn log_failure(&mut self, device_id: &str, id: Uuid, error: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "error",
            "id": id.to_string(),
            "device": device_id,
            "error": error,
        });
        self.write_line(&entry);
    }

    pub fn log_state(&mut self, device_id: &str, state: &Value) {
        match self.mode {
            JournalMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "state",
                    "device": device_id,
                    "body": state,
                });
                self.write_line(&entry);
            }
            JournalMode::Diffed => {
                let entry = match self.previous_state.get(device_id) {
                    None => json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "state",
                        "device": device_id,
                        "full": true,
                        "body": state,
                    }),
                    Some(prev) => json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "state",
                        "device": device_id,
                        "changes": state_changes(Some(prev), state),
                    }),
                };
                self.write_line(&entry);
                self.previous_state
                    .insert(device_id.to_string(), state.clone());
            }
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write journal entry: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AcMode;
    use tempfile::NamedTempFile;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn log_call_writes_ndjson() {
        let tmp = NamedTempFile::new().unwrap();
        let mut journal = Journal::open(JournalMode::Full, tmp.path()).unwrap();
        let id = journal.log_call("ac-1", "set_hvac_mode", &DeviceCall::SetHvacMode(AcMode::Fan));

        let lines = read_lines(tmp.path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["dir"], "call");
        assert_eq!(lines[0]["device"], "ac-1");
        assert_eq!(lines[0]["id"], id.to_string());
        assert_eq!(lines[0]["body"]["value"], "fan");
        assert!(lines[0]["ts"].as_str().is_some());
    }

    #[test]
    fn log_failure_shares_call_id() {
        let tmp = NamedTempFile::new().unwrap();
        let mut journal = Journal::open(JournalMode::Full, tmp.path()).unwrap();
        let id = journal.log_call("ac-1", "turn_on", &DeviceCall::TurnOn);
        journal.log_failure("ac-1", id, "broker offline");

        let lines = read_lines(tmp.path());
        assert_eq!(lines[1]["dir"], "error");
        assert_eq!(lines[0]["id"], lines[1]["id"]);
        assert_eq!(lines[1]["error"], "broker offline");
    }

    #[test]
    fn diffed_mode_logs_full_first_then_changes() {
        let tmp = NamedTempFile::new().unwrap();
        let mut journal = Journal::open(JournalMode::Diffed, tmp.path()).unwrap();

        journal.log_state("ac-1", &json!({"hvac_mode": "cool", "fan_mode": "auto"}));
        journal.log_state("ac-1", &json!({"hvac_mode": "off", "fan_mode": "auto"}));

        let lines = read_lines(tmp.path());
        assert_eq!(lines[0]["full"], true);
        assert!(lines[0]["body"].is_object());
        let changes = lines[1]["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0]["attribute"], "hvac_mode");
        assert_eq!(changes[0]["new"], "off");
    }

    #[test]
    fn diffed_mode_tracks_devices_separately() {
        let tmp = NamedTempFile::new().unwrap();
        let mut journal = Journal::open(JournalMode::Diffed, tmp.path()).unwrap();

        journal.log_state("ac-1", &json!({"hvac_mode": "cool"}));
        journal.log_state("ac-2", &json!({"hvac_mode": "dry"}));

        let lines = read_lines(tmp.path());
        assert_eq!(lines[0]["full"], true);
        assert_eq!(lines[1]["full"], true);
    }

    #[test]
    fn diffed_mode_no_changes_logs_empty_array() {
        let tmp = NamedTempFile::new().unwrap();
        let mut journal = Journal::open(JournalMode::Diffed, tmp.path()).unwrap();

        let state = json!({"hvac_mode": "cool"});
        journal.log_state("ac-1", &state);
        journal.log_state("ac-1", &state);

        let lines = read_lines(tmp.path());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["changes"].as_array().unwrap().len(), 0);
    }
}
