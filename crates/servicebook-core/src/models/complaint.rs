use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserRef;

/// A complaint (рекламация): a failure of a machine and its recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: i64,
    pub machine: i64,
    #[serde(default)]
    pub machine_serial: Option<String>,
    pub failure_date: Option<NaiveDate>,
    #[serde(default)]
    pub operating_hours: u32,
    pub failure_node: Option<i64>,
    #[serde(default)]
    pub failure_node_name: Option<String>,
    #[serde(default)]
    pub failure_description: String,
    pub recovery_method: Option<i64>,
    #[serde(default)]
    pub recovery_method_name: Option<String>,
    #[serde(default)]
    pub parts_used: String,
    pub recovery_date: Option<NaiveDate>,
    #[serde(default)]
    pub downtime_days: Option<u32>,
    pub service_company: Option<UserRef>,
}

impl Complaint {
    /// Days between failure and recovery. Unknown until the machine is
    /// recovered, whatever the server reports for `downtime_days`.
    pub fn downtime(&self) -> Option<i64> {
        let recovered = self.recovery_date?;
        match (self.downtime_days, self.failure_date) {
            (Some(days), _) => Some(days as i64),
            (None, Some(failed)) => Some((recovered - failed).num_days()),
            (None, None) => None,
        }
    }
}

/// Body for creating a complaint. Validation is the server's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintDraft {
    pub machine: i64,
    pub failure_date: NaiveDate,
    pub operating_hours: u32,
    pub failure_node: i64,
    pub failure_description: String,
    pub recovery_method: i64,
    pub parts_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_company: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    pub failure_node: Option<i64>,
    pub recovery_method: Option<i64>,
    pub service_company: Option<i64>,
    /// Sent as `machine__serial_number`; backends that don't filter on it
    /// return every visible complaint.
    pub machine_serial: Option<String>,
}

impl ComplaintFilter {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(node) = self.failure_node {
            params.push(("failure_node", node.to_string()));
        }
        if let Some(method) = self.recovery_method {
            params.push(("recovery_method", method.to_string()));
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
