use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserRef;

/// A maintenance (ТО) record for one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maintenance {
    pub id: i64,
    pub machine: i64,
    #[serde(default)]
    pub machine_serial: Option<String>,
    pub kind: Option<i64>,
    #[serde(default)]
    pub kind_name: Option<String>,
    pub performed_date: Option<NaiveDate>,
    #[serde(default)]
    pub operating_hours: u32,
    #[serde(default)]
    pub work_order_number: String,
    pub work_order_date: Option<NaiveDate>,
    pub organization: Option<i64>,
    pub service_company: Option<UserRef>,
}

/// Body for creating a maintenance record. Validation is the server's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceDraft {
    pub machine: i64,
    pub kind: i64,
    pub performed_date: NaiveDate,
    pub operating_hours: u32,
    pub work_order_number: String,
    pub work_order_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_company: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceFilter {
    pub kind: Option<i64>,
    pub service_company: Option<i64>,
    /// Machine serial number. The backend matches it as a substring, so
    /// callers needing one machine's records filter on `machine` as well.
    pub machine_serial: Option<String>,
}

impl MaintenanceFilter {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(kind) = self.kind {
            params.push(("kind", kind.to_string()));
        }
        if let Some(company) = self.service_company {
            params.push(("service_company", company.to_string()));
        }
        if let Some(serial) = self.machine_serial.as_deref().filter(|s| !s.is_empty()) {
            params.push(("machine__serial_number", serial.to_string()));
        }
        params
    }
}
