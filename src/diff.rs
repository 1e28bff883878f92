use serde::Serialize;
use serde_json::Value;

/// One attribute of the projected state that differs from the last emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub attribute: String,
    pub old: Value,
    pub new: Value,
}

pub(crate) fn diff_json(
    previous: &Value,
    current: &Value,
    path_prefix: &str,
    changes: &mut Vec<(String, Value, Value)>,
) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            for (key, curr_val) in curr_map {
                let path = if path_prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{path_prefix}.{key}")
                };
                match prev_map.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None => {
                        if curr_val.is_object() {
                            diff_json(&Value::Object(serde_json::Map::new()), curr_val, &path, changes);
                        } else {
                            changes.push((path, Value::Null, curr_val.clone()));
                        }
                    }
                }
            }
        }
        (prev, curr) if prev != curr => {
            changes.push((path_prefix.to_string(), prev.clone(), curr.clone()));
        }
        _ => {}
    }
}

/// Attribute-level changes between two serialized projections. With no
/// previous emission every attribute counts as changed from null.
pub(crate) fn state_changes(previous: Option<&Value>, current: &Value) -> Vec<StateChange> {
    let empty = Value::Object(serde_json::Map::new());
    let mut changes = Vec::new();
    diff_json(previous.unwrap_or(&empty), current, "", &mut changes);
    changes
        .into_iter()
        .map(|(attribute, old, new)| StateChange { attribute, old, new })
        .collect()
}
