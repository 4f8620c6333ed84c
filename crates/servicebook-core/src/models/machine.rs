use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserRef;

/// A registered machine with its components, delivery and ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub serial_number: String,

    pub model_technique: Option<i64>,
    pub model_engine: Option<i64>,
    pub model_transmission: Option<i64>,
    pub model_steer_bridge: Option<i64>,
    pub model_drive_bridge: Option<i64>,

    #[serde(default)]
    pub model_technique_name: Option<String>,
    #[serde(default)]
    pub model_engine_name: Option<String>,
    #[serde(default)]
    pub model_transmission_name: Option<String>,
    #[serde(default)]
    pub model_steer_bridge_name: Option<String>,
    #[serde(default)]
    pub model_drive_bridge_name: Option<String>,

    #[serde(default)]
    pub serial_engine: String,
    #[serde(default)]
    pub serial_transmission: String,
    #[serde(default)]
    pub serial_drive_bridge: String,
    #[serde(default)]
    pub serial_steer_bridge: String,

    #[serde(default)]
    pub contract_number: String,
    pub shipment_date: Option<NaiveDate>,
    #[serde(default)]
    pub consignee: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub equipment: String,

    pub client: Option<UserRef>,
    pub service_company: Option<UserRef>,
}

/// The fields anyone may see through the public serial-number lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicMachine {
    pub serial_number: String,
    #[serde(default)]
    pub model_technique_name: Option<String>,
    #[serde(default)]
    pub model_engine_name: Option<String>,
    #[serde(default)]
    pub serial_engine: String,
    #[serde(default)]
    pub model_transmission_name: Option<String>,
    #[serde(default)]
    pub serial_transmission: String,
    #[serde(default)]
    pub model_drive_bridge_name: Option<String>,
    #[serde(default)]
    pub serial_drive_bridge: String,
    #[serde(default)]
    pub model_steer_bridge_name: Option<String>,
    #[serde(default)]
    pub serial_steer_bridge: String,
}

/// Exact-match filters on the machine list, by reference id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineFilter {
    pub model_technique: Option<i64>,
    pub model_engine: Option<i64>,
    pub model_transmission: Option<i64>,
    pub model_steer_bridge: Option<i64>,
    pub model_drive_bridge: Option<i64>,
}

impl MachineFilter {
    /// Query parameters for the filters that are set
    pub fn params(&self) -> Vec<(&'static str, String)> {
        [
            ("model_technique", self.model_technique),
            ("model_engine", self.model_engine),
            ("model_transmission", self.model_transmission),
            ("model_steer_bridge", self.model_steer_bridge),
            ("model_drive_bridge", self.model_drive_bridge),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v.to_string())))
        .collect()
    }
}
