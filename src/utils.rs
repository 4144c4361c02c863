use std::collections::HashMap;

use crate::{errors::ModelError, validator::Validator};

pub fn read_string(qs: &HashMap<String, String>, key: &str, default: &str) -> String {
    match qs.get(key) {
        Some(val) => val.clone(),
        None => default.to_string(),
    }
}

pub fn read_csv(qs: &HashMap<String, String>, key: &str, default: Vec<String>) -> Vec<String> {
    match qs.get(key) {
        Some(csv) if !csv.is_empty() => csv.split(',').map(String::from).collect(),
        _ => default,
    }
}

/// Parses an integer parameter. A bad value is recorded on `v` and the
/// default is returned in its place.
pub fn read_int(qs: &HashMap<String, String>, key: &str, default: i64, v: &mut Validator) -> i64 {
    let Some(raw) = qs.get(key) else {
        return default;
    };

    match raw.parse::<i64>() {
        Ok(val) => val,
        Err(_) => {
            v.add_error(key, "must be an integer value");
            default
        }
    }
}

pub fn read_id_param(raw: &str) -> Result<i64, ModelError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ModelError::RecordNotFound),
    }
}
